pub mod client;
pub mod binance;
