use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreateTrade, ImportResult, ImportRowError, Trade, TradeSide};
use crate::services::trade_service;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    ticker: String,
    side: String,
    shares: String,
    price: String,
}

fn parse_number(s: &str) -> Result<f64> {
    let cleaned = s.replace(['$', ','], "");
    cleaned
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Failed to parse number: {}", s))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date: {}", s))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow!("Invalid date: {}", s))
}

fn row_to_trade(user_id: Uuid, row: CsvRow) -> Result<Trade> {
    let trade_type = TradeSide::parse(&row.side)
        .ok_or_else(|| anyhow!("Unknown side: {}", row.side))?;

    let input = CreateTrade {
        ticker: row.ticker,
        shares: parse_number(&row.shares)?,
        price: parse_number(&row.price)?,
        trade_type,
        created_at: Some(parse_date(&row.date)?),
    };

    trade_service::build_trade(user_id, input).map_err(|e| anyhow!(e.to_string()))
}

/// Parses a `date,ticker,side,shares,price` CSV. Bad rows are reported with
/// the physical line they start on and do not stop the rest of the file.
pub fn parse_trades(user_id: Uuid, csv_text: &str) -> (Vec<Trade>, Vec<ImportRowError>) {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(csv_text.as_bytes());

    let mut trades = Vec::new();
    let mut errors = Vec::new();

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            errors.push(ImportRowError { line: 1, error: e.to_string() });
            return (trades, errors);
        }
    };

    for result in reader.records() {
        let (line, parsed) = match result {
            Ok(record) => (
                record.position().map(|p| p.line()),
                record
                    .deserialize::<CsvRow>(Some(&headers))
                    .map_err(anyhow::Error::from)
                    .and_then(|row| row_to_trade(user_id, row)),
            ),
            Err(e) => (e.position().map(|p| p.line()), Err(anyhow::Error::from(e))),
        };

        match parsed {
            Ok(trade) => trades.push(trade),
            Err(e) => errors.push(ImportRowError {
                line: line.unwrap_or_default() as usize,
                error: e.to_string(),
            }),
        }
    }

    (trades, errors)
}

pub async fn import_csv(pool: &PgPool, user_id: Uuid, csv_text: &str) -> Result<ImportResult, AppError> {
    if csv_text.trim().is_empty() {
        return Err(AppError::Validation("CSV body is empty".into()));
    }

    let (trades, errors) = parse_trades(user_id, csv_text);
    let imported = if trades.is_empty() {
        0
    } else {
        db::trade_queries::insert_many(pool, &trades).await.map_err(|e| {
            error!("Failed to import {} trades for user {}: {}", trades.len(), user_id, e);
            AppError::Db(e)
        })? as usize
    };

    info!("Imported {} trades for user {} ({} rows rejected)", imported, user_id, errors.len());
    Ok(ImportResult { imported, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_valid_rows() {
        let csv = "date,ticker,side,shares,price\n\
                   2026-01-15,aapl,BUY,10,\"$1,000.50\"\n\
                   2026-02-01T14:30:00-05:00,AAPL,sell,4,150\n";

        let (trades, errors) = parse_trades(Uuid::nil(), csv);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(trades.len(), 2);

        assert_eq!(trades[0].ticker, "AAPL");
        assert_eq!(trades[0].price, 1000.50);
        assert_eq!(trades[0].created_at.day(), 15);

        assert_eq!(trades[1].trade_type, TradeSide::Sell);
        assert_eq!(trades[1].created_at.hour(), 19);
    }

    #[test]
    fn test_bad_rows_are_reported_by_line() {
        let csv = "date,ticker,side,shares,price\n\
                   2026-01-15,AAPL,BUY,10,100\n\
                   2026-13-01,AAPL,BUY,10,100\n\
                   2026-01-16,AAPL,HOLD,10,100\n\
                   2026-01-17,AAPL,BUY,-3,100\n\
                   2026-01-18,MSFT,SELL,1,300\n";

        let (trades, errors) = parse_trades(Uuid::nil(), csv);
        assert_eq!(trades.len(), 2);
        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(errors[1].error.contains("HOLD"));
    }

    #[test]
    fn test_line_numbers_follow_blank_lines_and_multiline_fields() {
        let csv = concat!(
            "date,ticker,side,shares,price\n",
            "2026-01-15,AAPL,BUY,10,100\n",
            "\n",
            "2026-01-16,AAPL,HOLD,10,100\n",
            "2026-01-17,\"AA\nPL\",BUY,1,100\n",
            "2026-01-18,AAPL,BUY,-3,100\n",
        );

        let (trades, errors) = parse_trades(Uuid::nil(), csv);
        assert_eq!(trades.len(), 1);
        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 5, 7]);
    }

    #[test]
    fn test_missing_column_is_a_row_error() {
        let csv = "date,ticker,side,shares\n2026-01-15,AAPL,BUY,10\n";
        let (trades, errors) = parse_trades(Uuid::nil(), csv);
        assert!(trades.is_empty());
        assert_eq!(errors.len(), 1);
    }
}
