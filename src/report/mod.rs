use std::fs::File;
use std::path::Path;

use anyhow::{ Context, Result };
use chrono::Local;
use csv::Writer;
use tracing::debug;

use crate::arbitrage::Opportunity;
use crate::graph::PriceGraph;

/// Append-only CSV sink for discovered opportunities and per-iteration stats.
///
/// Rows are flushed as they are written so a Ctrl+C mid-run loses nothing.
pub struct CsvSink {
    results: Writer<File>,
    stats: Writer<File>,
}

impl CsvSink {
    pub fn create(results_path: &Path, stats_path: &Path) -> Result<Self> {
        let mut results = Writer::from_path(results_path).with_context(|| {
            format!("Failed to open results file: {}", results_path.display())
        })?;
        results
            .write_record(["timestamp", "coins", "profit"])
            .context("Failed to write results header")?;
        results.flush().context("Failed to flush results header")?;

        let mut stats = Writer::from_path(stats_path).with_context(|| {
            format!("Failed to open stats file: {}", stats_path.display())
        })?;
        stats
            .write_record(["iteration", "duration_secs", "found"])
            .context("Failed to write stats header")?;
        stats.flush().context("Failed to flush stats header")?;

        Ok(Self { results, stats })
    }

    /// Append one discovered opportunity with the current local timestamp.
    pub fn record_opportunity(&mut self, opportunity: &Opportunity) -> Result<()> {
        self.results
            .write_record([
                Local::now().to_string(),
                opportunity.path_string(),
                opportunity.rounded_percentage().to_string(),
            ])
            .context("Failed to write opportunity row")?;
        self.results.flush().context("Failed to flush opportunity row")?;
        Ok(())
    }

    /// Append one iteration's stats row.
    pub fn record_iteration(
        &mut self,
        iteration: u64,
        duration_secs: f64,
        found_any: bool
    ) -> Result<()> {
        self.stats
            .write_record([
                iteration.to_string(),
                format!("{:.6}", duration_secs),
                found_any.to_string(),
            ])
            .context("Failed to write iteration stats row")?;
        self.stats.flush().context("Failed to flush iteration stats row")?;

        debug!(iteration, duration_secs, found_any, "Recorded iteration stats");
        Ok(())
    }
}

/// Print an opportunity with a per-leg rate breakdown from the snapshot it
/// was found in.
pub fn describe_opportunity(graph: &PriceGraph, opportunity: &Opportunity) {
    println!(
        "{} {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        opportunity.display()
    );

    for legs in opportunity.coins.windows(2) {
        let (from, to) = (&legs[0], &legs[1]);
        if let Some(rate) = graph.rate(from, to) {
            println!("     {:4} / {:4}: {:17.8}", to, from, rate);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn opportunity() -> Opportunity {
        Opportunity {
            coins: vec!["USDT".into(), "BTC".into(), "ETH".into(), "USDT".into()],
            profit: 1.0234,
        }
    }

    #[test]
    fn writes_headers_and_rows() {
        let dir = std::env::temp_dir().join("tri_scanner_sink_test");
        fs::create_dir_all(&dir).unwrap();
        let results_path = dir.join("results.csv");
        let stats_path = dir.join("stats.csv");

        let mut sink = CsvSink::create(&results_path, &stats_path).unwrap();
        sink.record_opportunity(&opportunity()).unwrap();
        sink.record_iteration(1, 0.25, true).unwrap();

        let results = fs::read_to_string(&results_path).unwrap();
        assert!(results.starts_with("timestamp,coins,profit"));
        assert!(results.contains("USDT->BTC->ETH->USDT"));
        assert!(results.contains("2.34"));

        let stats = fs::read_to_string(&stats_path).unwrap();
        assert!(stats.starts_with("iteration,duration_secs,found"));
        assert!(stats.contains("1,0.250000,true"));

        fs::remove_dir_all(&dir).ok();
    }
}
