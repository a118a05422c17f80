use std::collections::{BTreeSet, HashSet};

use colored::Colorize;

use crate::graph::PriceGraph;

/// A profitable conversion cycle discovered during one search pass.
///
/// `coins` holds the full path in trade order; the first and last entry are
/// the anchor currency. `profit` is the compounded multiplier after fees, and
/// is strictly greater than 1.0 for every emitted cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub coins: Vec<String>,
    pub profit: f64,
}

impl Opportunity {
    /// Profit expressed as a percentage over the starting amount.
    #[inline]
    pub fn profit_percentage(&self) -> f64 {
        (self.profit - 1.0) * 100.0
    }

    /// Profit percentage rounded to four decimal places, the form reported
    /// to the console and the CSV sink.
    pub fn rounded_percentage(&self) -> f64 {
        (self.profit_percentage() * 10_000.0).round() / 10_000.0
    }

    /// The conversion path as `USDT->BTC->ETH->USDT`.
    pub fn path_string(&self) -> String {
        self.coins.join("->")
    }

    /// Format the opportunity for console display.
    pub fn display(&self) -> String {
        format!(
            "{} | {}{} profit",
            self.path_string().green(),
            self.rounded_percentage().to_string().bright_green().bold(),
            "%".bright_green().bold()
        )
    }
}

/// One depth-first stack frame: a currency reached with `amount` units after
/// fees, and a cursor into its outgoing edges.
struct Frame {
    coin: String,
    amount: f64,
    edge_idx: usize,
}

/// Bounded depth-first enumeration of profitable cycles over a price graph.
///
/// For each anchor in order, walks every path of exactly `depth` edges seeded
/// at that anchor and yields those that land back on the anchor with a
/// fee-discounted amount strictly above 1.0. Cycles visiting the same
/// unordered set of currencies as an earlier yield are dropped; the dedup set
/// spans all anchors of the pass, and duplicate detection only gates the
/// yield, the tree is still walked in full.
///
/// The iterator is finite (at most `branching_factor ^ depth` leaves per
/// anchor) and not restartable; build a new one per snapshot. Anchors absent
/// from the graph yield nothing. For a fixed graph and anchor list the output
/// sequence is identical across runs, since edges are walked in the graph's
/// insertion order.
pub struct CycleSearch<'g> {
    graph: &'g PriceGraph,
    anchors: &'g [String],
    depth: usize,
    fee: f64,
    next_anchor: usize,
    current_anchor: Option<&'g str>,
    stack: Vec<Frame>,
    path: Vec<String>,
    seen: HashSet<BTreeSet<String>>,
}

/// Start a search pass over `graph` anchored at each of `anchors` in order.
pub fn find_cycles<'g>(
    graph: &'g PriceGraph,
    anchors: &'g [String],
    depth: usize,
    fee: f64,
) -> CycleSearch<'g> {
    CycleSearch {
        graph,
        anchors,
        depth,
        fee,
        next_anchor: 0,
        current_anchor: None,
        stack: Vec::with_capacity(depth + 1),
        path: Vec::with_capacity(depth + 1),
        seen: HashSet::new(),
    }
}

impl<'g> CycleSearch<'g> {
    /// Seed the stack with the next anchor that exists in the graph.
    /// Returns false when all anchors are exhausted.
    fn seed_next_anchor(&mut self) -> bool {
        while self.next_anchor < self.anchors.len() {
            let anchor = &self.anchors[self.next_anchor];
            self.next_anchor += 1;

            // An anchor the graph has never seen yields zero cycles.
            if !self.graph.contains(anchor) {
                continue;
            }

            self.current_anchor = Some(anchor.as_str());
            self.stack.push(Frame {
                coin: anchor.clone(),
                amount: 1.0,
                edge_idx: 0,
            });
            self.path.push(anchor.clone());
            return true;
        }
        false
    }

    fn pop_frame(&mut self) {
        self.stack.pop();
        self.path.pop();
    }

    /// Check the leaf at the top of the stack, recording and returning it if
    /// it is a profitable, not-yet-seen cycle.
    fn complete_leaf(&mut self) -> Option<Opportunity> {
        let anchor = self.current_anchor?;
        let top = self.stack.last()?;

        if top.coin != anchor || top.amount <= 1.0 {
            return None;
        }

        let key: BTreeSet<String> = self.path.iter().cloned().collect();
        if !self.seen.insert(key) {
            return None;
        }

        Some(Opportunity {
            coins: self.path.clone(),
            profit: top.amount,
        })
    }
}

impl<'g> Iterator for CycleSearch<'g> {
    type Item = Opportunity;

    fn next(&mut self) -> Option<Opportunity> {
        loop {
            if self.stack.is_empty() && !self.seed_next_anchor() {
                return None;
            }

            // Hops still to take from the frame at the top of the stack.
            let depth_left = self.depth + 1 - self.stack.len();

            if depth_left == 0 {
                let found = self.complete_leaf();
                self.pop_frame();
                if found.is_some() {
                    return found;
                }
                continue;
            }

            let Some(top) = self.stack.last_mut() else {
                continue;
            };
            let edges = self.graph.edges(&top.coin);

            if top.edge_idx >= edges.len() {
                self.pop_frame();
                continue;
            }

            let (next_coin, rate) = &edges[top.edge_idx];
            top.edge_idx += 1;

            let amount = top.amount * rate * (1.0 - self.fee);
            self.stack.push(Frame {
                coin: next_coin.clone(),
                amount,
                edge_idx: 0,
            });
            self.path.push(next_coin.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEE: f64 = 0.00075;

    fn coins(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Graph with a single USDT -> BTC -> ETH -> USDT triangle.
    fn triangle_graph(eth_usdt: f64) -> PriceGraph {
        let mut graph = PriceGraph::new();
        graph.insert_edge("USDT", "BTC", 0.00002);
        graph.insert_edge("BTC", "ETH", 15.0);
        graph.insert_edge("ETH", "USDT", eth_usdt);
        graph
    }

    #[test]
    fn fee_is_applied_once_per_hop() {
        let anchors = coins(&["USDT"]);
        let graph = triangle_graph(3400.0);

        let found: Vec<_> = find_cycles(&graph, &anchors, 3, FEE).collect();

        assert_eq!(found.len(), 1);
        let expected = 0.00002 * 15.0 * 3400.0 * (1.0 - FEE).powi(3);
        assert!((found[0].profit - expected).abs() < 1e-12);
        assert_eq!(found[0].coins, coins(&["USDT", "BTC", "ETH", "USDT"]));
    }

    #[test]
    fn unprofitable_triangle_is_not_yielded() {
        let anchors = coins(&["USDT"]);
        // 0.00002 * 15.0 * 2010.0 = 0.603 before fees: a losing round trip.
        let graph = triangle_graph(2010.0);

        assert_eq!(find_cycles(&graph, &anchors, 3, FEE).count(), 0);
    }

    #[test]
    fn fee_only_loop_is_never_profitable() {
        let anchors = coins(&["A"]);
        let mut graph = PriceGraph::new();
        graph.insert_edge("A", "B", 1.0);
        graph.insert_edge("B", "C", 1.0);
        graph.insert_edge("C", "A", 1.0);

        assert_eq!(find_cycles(&graph, &anchors, 3, 0.0001).count(), 0);
    }

    #[test]
    fn break_even_cycle_needs_strictly_more_than_one() {
        let anchors = coins(&["A"]);
        let mut graph = PriceGraph::new();
        // Rates multiply to exactly 1.0 with a zero fee.
        graph.insert_edge("A", "B", 2.0);
        graph.insert_edge("B", "C", 0.25);
        graph.insert_edge("C", "A", 2.0);

        assert_eq!(find_cycles(&graph, &anchors, 3, 0.0).count(), 0);
    }

    #[test]
    fn rotations_of_the_same_coins_are_deduplicated() {
        let anchors = coins(&["A"]);
        // Profitable in both directions: A->B->C->A and A->C->B->A.
        let mut graph = PriceGraph::new();
        graph.insert_edge("A", "B", 2.0);
        graph.insert_edge("A", "C", 2.0);
        graph.insert_edge("B", "C", 2.0);
        graph.insert_edge("B", "A", 2.0);
        graph.insert_edge("C", "A", 2.0);
        graph.insert_edge("C", "B", 2.0);

        let found: Vec<_> = find_cycles(&graph, &anchors, 3, 0.0).collect();

        // {A, B, C} is kept once, and it is the first one discovered under
        // insertion order: A's first edge goes to B.
        let abc: Vec<_> = found
            .iter()
            .filter(|o| o.coins.contains(&"B".to_string()) && o.coins.contains(&"C".to_string()))
            .collect();
        assert_eq!(abc.len(), 1);
        assert_eq!(abc[0].coins, coins(&["A", "B", "C", "A"]));
    }

    #[test]
    fn dedup_spans_all_anchors_of_the_pass() {
        let anchors = coins(&["A", "B"]);
        let mut graph = PriceGraph::new();
        graph.insert_edge("A", "B", 2.0);
        graph.insert_edge("B", "C", 2.0);
        graph.insert_edge("C", "A", 2.0);
        graph.insert_edge("B", "A", 2.0);
        graph.insert_edge("A", "C", 2.0);
        graph.insert_edge("C", "B", 2.0);

        let found: Vec<_> = find_cycles(&graph, &anchors, 3, 0.0).collect();

        // The B-anchored pass rediscovers {A, B, C} and must not re-yield it.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].coins[0], "A");
    }

    #[test]
    fn anchor_absent_from_graph_yields_nothing() {
        let anchors = coins(&["DOGE"]);
        let graph = triangle_graph(3400.0);

        assert_eq!(find_cycles(&graph, &anchors, 3, FEE).count(), 0);
    }

    #[test]
    fn search_is_deterministic() {
        let anchors = coins(&["USDT"]);
        let graph = triangle_graph(3400.0);

        let first: Vec<_> = find_cycles(&graph, &anchors, 3, FEE).collect();
        let second: Vec<_> = find_cycles(&graph, &anchors, 3, FEE).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn rounded_percentage_has_four_decimals() {
        let opp = Opportunity {
            coins: coins(&["USDT", "BTC", "ETH", "USDT"]),
            profit: 1.0198765432,
        };

        assert!((opp.rounded_percentage() - 1.9877).abs() < 1e-12);
        assert_eq!(opp.path_string(), "USDT->BTC->ETH->USDT");
    }

    #[test]
    fn end_to_end_scenario_reports_expected_percentage() {
        let anchors = coins(&["USDT"]);
        let graph = triangle_graph(3400.0);

        let found: Vec<_> = find_cycles(&graph, &anchors, 3, FEE).collect();
        assert_eq!(found.len(), 1);

        let expected = 0.00002 * 15.0 * 3400.0 * (1.0 - FEE).powi(3);
        let expected_pct = ((expected - 1.0) * 100.0 * 10_000.0).round() / 10_000.0;
        assert!((found[0].rounded_percentage() - expected_pct).abs() < 1e-12);
    }
}
