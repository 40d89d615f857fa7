use crate::external::quote_provider::{http_client, Quote, QuoteProvider, QuoteProviderError};
use async_trait::async_trait;
use serde::Deserialize;

const FINNHUB_QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";

pub struct FinnhubProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: FINNHUB_QUOTE_URL.to_string(),
        }
    }
}

// Finnhub answers unknown symbols with 200 and every field zeroed:
// { "c": 0, "d": null, "dp": null, "h": 0, "l": 0, "o": 0, "pc": 0, "t": 0 }
#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    #[serde(rename = "c")]
    current: Option<f64>,
    #[serde(rename = "t")]
    timestamp: Option<i64>,
}

pub(crate) fn parse_quote_body(ticker: &str, body: &str) -> Result<Quote, QuoteProviderError> {
    let quote: FinnhubQuote = serde_json::from_str(body)
        .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

    match quote.current {
        Some(price) if price > 0.0 && price.is_finite() => Ok(Quote::new(ticker, price)),
        Some(_) if quote.timestamp.unwrap_or(0) == 0 => Err(QuoteProviderError::NotFound),
        Some(price) => Err(QuoteProviderError::BadResponse(format!("invalid price {}", price))),
        None => Err(QuoteProviderError::BadResponse("missing field c".into())),
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &'static str {
        "finnhub"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Quote, QuoteProviderError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("symbol", ticker), ("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(QuoteProviderError::RateLimited),
            status if !status.is_success() => {
                return Err(QuoteProviderError::BadResponse(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let body = resp
            .text()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        parse_quote_body(ticker, &body)
    }
}
