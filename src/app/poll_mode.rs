use std::{
    sync::{ atomic::{ AtomicBool, Ordering }, Arc },
    time::Instant,
};

use crate::{
    arbitrage::{ self, find_cycles },
    config::Config,
    exchange::{ binance::BinanceClient, client::MarketDataClient },
    graph::build_graph,
    report::{ describe_opportunity, CsvSink },
    utils::console::{ print_app_starting, print_config },
    API_TIMEOUT,
};
use anyhow::{ anyhow, Context, Result };
use colored::Colorize;
use tracing::{ error, info, warn };

/// Run the polling loop: one fresh graph snapshot per iteration, searched to
/// exhaustion before the next snapshot is taken. `iterations == 0` runs until
/// Ctrl+C. No state survives from one tick to the next; a failed fetch fails
/// only that iteration.
pub fn run_poll_mode(config: Config) -> Result<()> {
    // Display startup information
    print_app_starting();
    print_config(&config);

    let client = Arc::new(
        BinanceClient::new(config.api_key.clone(), config.debug).context(
            "Failed to create Binance client"
        )?
    );

    info!("Connected to exchange: {}", client.name());

    if config.api_key.is_some() || config.api_secret.is_some() {
        info!("Using API credentials from environment");
    }

    // Create a runtime for async operations
    let rt = tokio::runtime::Builder
        ::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    // Verify exchange connectivity with timeout
    let is_operational = rt.block_on(async {
        tokio::time::timeout(API_TIMEOUT, client.is_operational()).await
    });

    match is_operational {
        Ok(Ok(true)) => {
            info!("Exchange is operational");
        }
        _ => {
            error!("Exchange is not operational or timed out");
            return Err(anyhow!("Exchange is not operational"));
        }
    }

    let mut sink = CsvSink::create(&config.results_file, &config.stats_file).context(
        "Failed to open result sink"
    )?;

    // Set up Ctrl+C handler
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc
        ::set_handler(move || {
            info!("Received Ctrl+C, shutting down...");
            shutdown_clone.store(true, Ordering::Relaxed);
        })
        .context("Error setting Ctrl-C handler")?;

    info!(
        "Scanning for {}-hop cycles from anchors [{}] with fee {} ({} iterations)",
        config.depth,
        config.anchor_coins.join(", "),
        config.fee,
        if config.iterations == 0 { "unbounded".to_string() } else { config.iterations.to_string() }
    );

    let mut iteration: u64 = 0;

    while !shutdown.load(Ordering::Relaxed) {
        if config.iterations > 0 && iteration >= config.iterations {
            break;
        }
        iteration += 1;

        // Take a fresh snapshot. A collaborator failure costs this tick only.
        let tickers = rt.block_on(async {
            tokio::time::timeout(API_TIMEOUT, client.get_book_tickers()).await
        });

        let tickers = match tickers {
            Ok(Ok(tickers)) => tickers,
            Ok(Err(e)) => {
                warn!("Iteration {}: failed to fetch tickers: {}", iteration, e);
                continue;
            }
            Err(_) => {
                warn!("Iteration {}: timed out fetching tickers", iteration);
                continue;
            }
        };

        let started = Instant::now();
        let graph = build_graph(&tickers, &config.market_coins);

        let mut found: Vec<_> = find_cycles(
            &graph,
            &config.anchor_coins,
            config.depth,
            config.fee
        ).collect();

        let duration = started.elapsed();

        arbitrage::rank(&mut found);

        if !found.is_empty() {
            println!("\n{}", "=== ARBITRAGE OPPORTUNITIES ===".bright_purple().bold());
            for opportunity in &found {
                describe_opportunity(&graph, opportunity);
                if let Err(e) = sink.record_opportunity(opportunity) {
                    error!("Failed to record opportunity: {}", e);
                }
            }
            println!("{}", "===============================".bright_purple().bold());

            info!(
                "Iteration {}: {} profitable cycles in {:.2?}",
                iteration,
                found.len(),
                duration
            );
        }

        if let Err(e) = sink.record_iteration(iteration, duration.as_secs_f64(), !found.is_empty()) {
            error!("Failed to record iteration stats: {}", e);
        }
    }

    info!("Triangular arbitrage scanner stopped after {} iterations", iteration);
    Ok(())
}
