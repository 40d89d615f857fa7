pub mod quote_provider;
pub mod finnhub;
pub mod yahoo;
pub mod multi_provider;
