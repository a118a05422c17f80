use serde::Deserialize;

use crate::utils::serde_helpers::f64_from_str;

/// One order-book ticker row from the exchange: best bid and ask for a pair.
///
/// Binance serializes prices as JSON strings, so both price fields go through
/// a string-to-float helper. An ask of 0.0 marks an illiquid or delisted pair
/// and is filtered out during graph construction.
#[derive(Debug, Clone, Deserialize)]
pub struct BookTicker {
    pub symbol: String,

    #[serde(rename = "askPrice", deserialize_with = "f64_from_str")]
    pub ask_price: f64,

    #[serde(rename = "bidPrice", deserialize_with = "f64_from_str")]
    pub bid_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_binance_book_ticker_json() {
        let json = r#"{
            "symbol": "ETHUSDT",
            "bidPrice": "1999.00000000",
            "bidQty": "12.50000000",
            "askPrice": "2000.00000000",
            "askQty": "4.10000000"
        }"#;

        let ticker: BookTicker = serde_json::from_str(json).unwrap();

        assert_eq!(ticker.symbol, "ETHUSDT");
        assert_eq!(ticker.ask_price, 2000.0);
        assert_eq!(ticker.bid_price, 1999.0);
    }

    #[test]
    fn rejects_non_numeric_price() {
        let json = r#"{"symbol": "ETHUSDT", "bidPrice": "abc", "askPrice": "1.0"}"#;

        assert!(serde_json::from_str::<BookTicker>(json).is_err());
    }
}
