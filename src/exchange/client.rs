use async_trait::async_trait;
use anyhow::Result;
use crate::models::ticker::BookTicker;

/// Market data source trait that defines the operations the scanner needs
/// from an exchange. Retries, pagination and authentication live behind it.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Get the name of the exchange
    fn name(&self) -> &str;

    /// Fetch the current best bid/ask for every tradable pair
    async fn get_book_tickers(&self) -> Result<Vec<BookTicker>>;

    /// Check if the exchange is operational
    async fn is_operational(&self) -> Result<bool>;
}
