use crate::external::quote_provider::{http_client, Quote, QuoteProvider, QuoteProviderError};
use async_trait::async_trait;
use serde::Deserialize;

pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self { client: http_client() }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
}

pub(crate) fn parse_chart_body(ticker: &str, body: &str) -> Result<Quote, QuoteProviderError> {
    let body: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

    if body.chart.error.as_ref().is_some_and(|e| !e.is_null()) {
        return Err(QuoteProviderError::NotFound);
    }

    let price = body
        .chart
        .result
        .and_then(|mut r| r.pop())
        .and_then(|r| r.meta.regular_market_price)
        .ok_or_else(|| QuoteProviderError::BadResponse("missing regularMarketPrice".into()))?;

    Ok(Quote::new(ticker, price))
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Quote, QuoteProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{ticker}?range=1d&interval=1d"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(QuoteProviderError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => return Err(QuoteProviderError::NotFound),
            _ => {}
        }

        let body = resp
            .text()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        parse_chart_body(ticker, &body)
    }
}
