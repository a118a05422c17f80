mod app;
mod arbitrage;
mod config;
mod exchange;
mod graph;
mod models;
mod report;
mod utils;

use std::time::Duration;

use config::Config;
use anyhow::{ Context, Result };

use utils::logging;

const API_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    // Load configuration with helpful error messages
    let config = Config::from_env().context(
        "Failed to load configuration from environment. Make sure you have a .env file with required variables."
    )?;

    // Initialize logging system
    logging
        ::init_logging(config.log_level, config.debug, &config.log_config)
        .context("Failed to initialize logging system")?;

    app::poll_mode::run_poll_mode(config)?;

    Ok(())
}
