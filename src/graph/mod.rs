use std::collections::HashMap;

use tracing::debug;

use crate::models::ticker::BookTicker;

/// Directed conversion-rate graph built from one snapshot of order-book tickers.
///
/// Each edge `from -> to` carries the number of units of `to` obtainable per
/// unit of `from`, excluding fees. Outgoing edges keep insertion order so a
/// search over the same snapshot always walks them the same way.
#[derive(Debug, Clone, Default)]
pub struct PriceGraph {
    nodes: HashMap<String, Vec<(String, f64)>>,
}

impl PriceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directed edge, overwriting the rate if the edge already exists.
    pub fn insert_edge(&mut self, from: &str, to: &str, rate: f64) {
        let edges = self.nodes.entry(from.to_string()).or_default();
        match edges.iter_mut().find(|(coin, _)| coin == to) {
            Some(edge) => edge.1 = rate,
            None => edges.push((to.to_string(), rate)),
        }
    }

    /// Outgoing edges of a currency in insertion order. A currency the graph
    /// has never seen simply has no edges.
    pub fn edges(&self, coin: &str) -> &[(String, f64)] {
        self.nodes.get(coin).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.edges(from)
            .iter()
            .find(|(coin, _)| coin == to)
            .map(|(_, rate)| *rate)
    }

    pub fn contains(&self, coin: &str) -> bool {
        self.nodes.contains_key(coin)
    }

    pub fn currency_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }
}

/// Build a fresh price graph from raw ticker quotes.
///
/// A quote is claimed by the first coin in `market_coins` whose code is a
/// suffix of the pair symbol; the rest of the symbol is the secondary coin.
/// Two edges go in per claimed quote:
///
///   coin      -> secondary = 1 / ask   (buy the secondary with the coin)
///   secondary -> coin      = bid       (sell the secondary back)
///
/// Quotes with a zero ask (illiquid or delisted pairs) and symbols matching
/// no coin contribute nothing. The input is not mutated.
pub fn build_graph(tickers: &[BookTicker], market_coins: &[String]) -> PriceGraph {
    let mut graph = PriceGraph::new();
    let mut skipped = 0usize;

    for ticker in tickers {
        if ticker.ask_price == 0.0 {
            skipped += 1;
            continue;
        }

        for coin in market_coins {
            if let Some(secondary) = ticker.symbol.strip_suffix(coin.as_str()) {
                // A symbol that is nothing but the coin code is malformed.
                if !secondary.is_empty() {
                    graph.insert_edge(coin, secondary, 1.0 / ticker.ask_price);
                    graph.insert_edge(secondary, coin, ticker.bid_price);
                }
                // First matching coin claims the quote.
                break;
            }
        }
    }

    debug!(
        "Built price graph: {} currencies, {} edges ({} zero-ask quotes skipped)",
        graph.currency_count(),
        graph.edge_count(),
        skipped
    );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, ask: f64, bid: f64) -> BookTicker {
        BookTicker {
            symbol: symbol.to_string(),
            ask_price: ask,
            bid_price: bid,
        }
    }

    fn coins(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_both_edges_from_a_quote() {
        let graph = build_graph(&[ticker("ETHUSDT", 2000.0, 1999.0)], &coins(&["USDT"]));

        assert_eq!(graph.rate("USDT", "ETH"), Some(1.0 / 2000.0));
        assert_eq!(graph.rate("ETH", "USDT"), Some(1999.0));
        assert_eq!(graph.currency_count(), 2);
    }

    #[test]
    fn zero_ask_quote_contributes_no_edges() {
        let graph = build_graph(&[ticker("ETHUSDT", 0.0, 1999.0)], &coins(&["USDT"]));

        assert_eq!(graph.currency_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn symbol_matching_no_coin_is_excluded() {
        let graph = build_graph(&[ticker("ETHBTC", 0.05, 0.049)], &coins(&["USDT"]));

        assert!(!graph.contains("ETH"));
        assert!(!graph.contains("BTC"));
    }

    #[test]
    fn first_matching_coin_claims_the_quote() {
        // "WBTC" ends with both "BTC" and "TC"; the earlier list entry wins
        // and the later one must not add a second pair of edges.
        let graph = build_graph(&[ticker("WBTC", 10.0, 9.0)], &coins(&["BTC", "TC"]));

        assert_eq!(graph.rate("BTC", "W"), Some(0.1));
        assert_eq!(graph.rate("W", "BTC"), Some(9.0));
        assert!(!graph.contains("TC"));
        assert_eq!(graph.rate("TC", "WB"), None);
    }

    #[test]
    fn symbol_equal_to_coin_code_is_malformed() {
        let graph = build_graph(&[ticker("USDT", 1.0, 1.0)], &coins(&["USDT"]));

        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn later_quote_overwrites_existing_edge() {
        let mut graph = PriceGraph::new();
        graph.insert_edge("USDT", "ETH", 0.0005);
        graph.insert_edge("USDT", "ETH", 0.0004);

        assert_eq!(graph.rate("USDT", "ETH"), Some(0.0004));
        assert_eq!(graph.edges("USDT").len(), 1);
    }

    #[test]
    fn edges_keep_insertion_order() {
        let mut graph = PriceGraph::new();
        graph.insert_edge("USDT", "ETH", 1.0);
        graph.insert_edge("USDT", "BTC", 2.0);
        graph.insert_edge("USDT", "BNB", 3.0);

        let order: Vec<&str> = graph.edges("USDT").iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, vec!["ETH", "BTC", "BNB"]);
    }

    #[test]
    fn unknown_currency_has_no_edges() {
        let graph = PriceGraph::new();
        assert!(graph.edges("DOGE").is_empty());
        assert_eq!(graph.rate("DOGE", "USDT"), None);
    }
}
