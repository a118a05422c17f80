use async_trait::async_trait;
use anyhow::{ Context, Result };
use reqwest::{ Client as HttpClient, Url };
use tracing::{ debug, error, info };
use std::time::{ Duration, Instant };
use std::sync::Arc;

use crate::models::ticker::BookTicker;
use crate::exchange::client::MarketDataClient;

// Shared singleton client for connection pooling
lazy_static::lazy_static! {
    static ref HTTP_CLIENT: HttpClient = HttpClient::builder()
        .timeout(Duration::from_secs(10))
        .tcp_nodelay(true) // Disable Nagle's algorithm for low latency
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to create HTTP client");
}

pub struct BinanceClient {
    /// Base URL for API requests
    base_url: Url,

    /// API key, forwarded when present. The book-ticker endpoint is public.
    api_key: Option<Arc<str>>,

    /// Whether to use the testnet
    testnet: bool,
}

impl BinanceClient {
    /// Create a new Binance client
    pub fn new(api_key: Option<String>, testnet: bool) -> Result<Self> {
        // Set the base URL based on whether testnet is enabled
        let base_url = if testnet {
            Url::parse("https://testnet.binance.vision/api/").context("Invalid testnet URL")?
        } else {
            Url::parse("https://api.binance.com/api/").context("Invalid API URL")?
        };

        Ok(Self {
            base_url,
            api_key: api_key.map(Into::into),
            testnet,
        })
    }
}

#[async_trait]
impl MarketDataClient for BinanceClient {
    fn name(&self) -> &str {
        if self.testnet { "Binance Testnet" } else { "Binance" }
    }

    async fn get_book_tickers(&self) -> Result<Vec<BookTicker>> {
        let start = Instant::now();
        debug!("Fetching order-book tickers from Binance");

        let url = self.base_url.join("v3/ticker/bookTicker").context("Failed to build URL")?;

        let mut request = HTTP_CLIENT.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("X-MBX-APIKEY", key.as_ref());
        }

        let response = request.send().await.context("Failed to send request to Binance")?;

        // Check if the request was successful
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Binance API error: {} - {}", status, text);
            anyhow::bail!("Binance API error: {} - {}", status, text);
        }

        let tickers: Vec<BookTicker> = response
            .json().await
            .context("Failed to parse Binance book-ticker response")?;

        let elapsed = start.elapsed();
        info!("Fetched {} book tickers from Binance in {:.2?}", tickers.len(), elapsed);

        Ok(tickers)
    }

    async fn is_operational(&self) -> Result<bool> {
        let url = self.base_url.join("v3/ping").context("Failed to build URL")?;

        // Make the request with minimal overhead
        let response = HTTP_CLIENT.get(url)
            .timeout(Duration::from_secs(2)) // Short timeout for ping
            .send().await;

        // Check if the request was successful
        match response {
            Ok(res) => Ok(res.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
