use std::net::SocketAddr;

/// Which quote backend serves live prices for open positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteProviderKind {
    Finnhub,
    Yahoo,
    Multi,
}

impl QuoteProviderKind {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "finnhub" => Ok(Self::Finnhub),
            "yahoo" => Ok(Self::Yahoo),
            "multi" => Ok(Self::Multi),
            other => Err(format!(
                "Invalid QUOTE_PROVIDER: {}. Must be 'finnhub', 'yahoo', or 'multi'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub quote_provider: QuoteProviderKind,
    pub finnhub_api_key: Option<String>,
    pub quote_requests_per_minute: u32,
    pub quote_max_concurrent: usize,
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: required("JWT_SECRET")?,
            quote_provider: QuoteProviderKind::parse(
                &std::env::var("QUOTE_PROVIDER").unwrap_or_else(|_| "multi".to_string()),
            )?,
            finnhub_api_key: std::env::var("FINNHUB_API_KEY").ok(),
            quote_requests_per_minute: parsed("QUOTE_REQUESTS_PER_MINUTE", 60)?,
            quote_max_concurrent: parsed("QUOTE_MAX_CONCURRENT", 4)?,
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 16 {
            return Err("JWT_SECRET must be at least 16 characters".to_string());
        }
        if self.quote_provider != QuoteProviderKind::Yahoo && self.finnhub_api_key.is_none() {
            return Err("FINNHUB_API_KEY is required unless QUOTE_PROVIDER=yahoo".to_string());
        }
        if self.quote_requests_per_minute == 0 {
            return Err("QUOTE_REQUESTS_PER_MINUTE must be > 0".to_string());
        }
        if self.quote_max_concurrent == 0 {
            return Err("QUOTE_MAX_CONCURRENT must be > 0".to_string());
        }
        Ok(())
    }
}

fn required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("{} is not set", key))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}
