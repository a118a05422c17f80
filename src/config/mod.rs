use anyhow::{ Context, Result };
use dotenv::dotenv;
use serde::{ Deserialize, Serialize };
use std::env;
use std::path::PathBuf;
use tracing::Level;
use crate::utils::serde_helpers::{ serialize_level, deserialize_level };

/// Default suffix-recognition list, in match-priority order.
const DEFAULT_MARKET_COINS: &str = "ETH,USDT,BTC,BUSD,BNB,ADA,SOL,LINK,LTC,UNI,XTZ";

/// Default cycle start/end anchors, in search order.
const DEFAULT_ANCHOR_COINS: &str = "USDT,BUSD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub debug: bool,

    /// Exchange API credentials. The public book-ticker endpoint works
    /// without them; they are forwarded when present.
    pub api_key: Option<String>,

    // Never echoed by the startup config dump.
    #[serde(skip_serializing)]
    pub api_secret: Option<String>,

    /// Coins recognized as pair-symbol suffixes when building the graph.
    /// Order matters: the first matching suffix claims a quote.
    pub market_coins: Vec<String>,

    /// Coins cycles must start and end at, searched in this order.
    pub anchor_coins: Vec<String>,

    /// Uniform per-hop taker fee. Known simplification: the real schedule
    /// varies by account level and maker/taker status.
    pub fee: f64,

    /// Cycle length in hops.
    pub depth: usize,

    /// Polling passes to run; 0 means run until interrupted.
    pub iterations: u64,

    pub results_file: PathBuf,
    pub stats_file: PathBuf,

    #[serde(serialize_with = "serialize_level", deserialize_with = "deserialize_level")]
    pub log_level: Level,
    pub log_config: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub filename_prefix: String,
    pub rotation: LogRotation,
    pub max_files: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

fn parse_coin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine; plain environment variables still apply.
        if let Err(e) = dotenv() {
            println!("No .env file loaded: {}", e);
        }

        let debug = env
            ::var("TRI_DEBUG")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("Failed to parse TRI_DEBUG environment variable")?;

        let api_key = env::var("TRI_API_KEY").ok();
        let api_secret = env::var("TRI_API_SECRET").ok();

        let market_coins = parse_coin_list(
            &env::var("TRI_MARKET_COINS").unwrap_or_else(|_| DEFAULT_MARKET_COINS.to_string())
        );

        let anchor_coins = parse_coin_list(
            &env::var("TRI_ANCHOR_COINS").unwrap_or_else(|_| DEFAULT_ANCHOR_COINS.to_string())
        );

        if market_coins.is_empty() {
            anyhow::bail!("TRI_MARKET_COINS must contain at least one coin");
        }
        if anchor_coins.is_empty() {
            anyhow::bail!("TRI_ANCHOR_COINS must contain at least one coin");
        }

        // Binance VIP0 spot taker fee by default.
        let fee = env
            ::var("TRI_FEE")
            .unwrap_or_else(|_| "0.00075".to_string())
            .parse::<f64>()
            .context("Failed to parse TRI_FEE environment variable")?;

        let depth = env
            ::var("TRI_DEPTH")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<usize>()
            .context("Failed to parse TRI_DEPTH environment variable")?;

        if depth < 3 {
            anyhow::bail!("TRI_DEPTH must be at least 3, got {}", depth);
        }

        let iterations = env
            ::var("TRI_ITERATIONS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()
            .context("Failed to parse TRI_ITERATIONS environment variable")?;

        let results_file = PathBuf::from(
            env::var("TRI_RESULTS_FILE").unwrap_or_else(|_| "arbitrage.csv".to_string())
        );

        let stats_file = PathBuf::from(
            env::var("TRI_STATS_FILE").unwrap_or_else(|_| "iterations.csv".to_string())
        );

        let log_level_str = env::var("TRI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_level = match log_level_str.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let log_dir = env::var("TRI_LOG_DIRECTORY").unwrap_or_else(|_| "logs".to_string());

        let log_prefix = env
            ::var("TRI_LOG_FILENAME_PREFIX")
            .unwrap_or_else(|_| "tri_scanner".to_string());

        let log_rotation_str = env::var("TRI_LOG_ROTATION").unwrap_or_else(|_| "daily".to_string());

        let log_rotation = match log_rotation_str.to_lowercase().as_str() {
            "hourly" => LogRotation::Hourly,
            "never" => LogRotation::Never,
            _ => LogRotation::Daily,
        };

        let max_files = env
            ::var("TRI_LOG_MAX_FILES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok());

        let log_config = LogConfig {
            directory: PathBuf::from(log_dir),
            filename_prefix: log_prefix,
            rotation: log_rotation,
            max_files,
        };

        Ok(Config {
            debug,
            api_key,
            api_secret,
            market_coins,
            anchor_coins,
            fee,
            depth,
            iterations,
            results_file,
            stats_file,
            log_level,
            log_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_list_parsing_trims_and_uppercases() {
        let coins = parse_coin_list(" usdt, Busd ,BTC,");
        assert_eq!(coins, vec!["USDT", "BUSD", "BTC"]);
    }
}
