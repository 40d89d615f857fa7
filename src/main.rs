use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use tradejournal_backend::app;
use tradejournal_backend::config::{AppConfig, QuoteProviderKind};
use tradejournal_backend::external::finnhub::FinnhubProvider;
use tradejournal_backend::external::multi_provider::MultiProvider;
use tradejournal_backend::external::quote_provider::QuoteProvider;
use tradejournal_backend::external::yahoo::YahooProvider;
use tradejournal_backend::logging::{init_logging, LoggingConfig};
use tradejournal_backend::services::auth_service::TokenVerifier;
use tradejournal_backend::services::failure_cache::FailureCache;
use tradejournal_backend::services::pnl_engine::WeightedAverageCalculator;
use tradejournal_backend::services::quote_service::QuoteService;
use tradejournal_backend::services::rate_limiter::RateLimiter;
use tradejournal_backend::state::AppState;

fn build_quote_provider(config: &AppConfig) -> Result<Arc<dyn QuoteProvider>, String> {
    let finnhub = || {
        config
            .finnhub_api_key
            .clone()
            .map(FinnhubProvider::new)
            .ok_or_else(|| "FINNHUB_API_KEY is not set".to_string())
    };

    let provider: Arc<dyn QuoteProvider> = match config.quote_provider {
        QuoteProviderKind::Finnhub => {
            tracing::info!("📊 Using quote provider: Finnhub only");
            Arc::new(finnhub()?)
        }
        QuoteProviderKind::Yahoo => {
            tracing::info!("📊 Using quote provider: Yahoo Finance only");
            Arc::new(YahooProvider::new())
        }
        QuoteProviderKind::Multi => {
            tracing::info!("📊 Using quote provider: Finnhub with Yahoo Finance fallback");
            Arc::new(MultiProvider::new(Box::new(finnhub()?), Box::new(YahooProvider::new())))
        }
    };
    Ok(provider)
}

// Expired failure-cache and revocation entries are otherwise only dropped on access
fn spawn_housekeeping(quotes: QuoteService, tokens: TokenVerifier) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            ticker.tick().await;
            quotes.failure_cache().cleanup_expired();
            tokens.purge_expired();
            tracing::debug!(
                "Housekeeping: {} failed tickers cached, {} revoked sessions",
                quotes.failure_cache().len(),
                tokens.revoked_count()
            );
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let quotes = QuoteService::new(
        build_quote_provider(&config)?,
        RateLimiter::new(config.quote_max_concurrent, config.quote_requests_per_minute),
        FailureCache::new(),
    );

    let tokens = TokenVerifier::new(&config.jwt_secret);
    spawn_housekeeping(quotes.clone(), tokens.clone());

    let state = AppState {
        pool,
        quotes,
        tokens,
        calculator: Arc::new(WeightedAverageCalculator),
    };
    let app = app::create_app(state, config.cors_allow_origin.as_deref());

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Trade journal backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
