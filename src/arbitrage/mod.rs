pub mod search;

pub use search::{find_cycles, CycleSearch, Opportunity};

/// Sort a pass's opportunities by profit, best first. Ties keep discovery
/// order (the sort is stable).
pub fn rank(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| b.profit.total_cmp(&a.profit));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opportunity(profit: f64) -> Opportunity {
        Opportunity {
            coins: vec!["USDT".into(), "A".into(), "B".into(), "USDT".into()],
            profit,
        }
    }

    #[test]
    fn rank_orders_by_profit_descending() {
        let mut found = vec![opportunity(1.02), opportunity(1.10), opportunity(1.01)];

        rank(&mut found);

        let profits: Vec<f64> = found.iter().map(|o| o.profit).collect();
        assert_eq!(profits, vec![1.10, 1.02, 1.01]);
    }
}
