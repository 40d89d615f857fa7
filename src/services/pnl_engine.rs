//! Position and realized P/L calculations over a user's trade history.
//!
//! Both calculations are pure and recompute everything from the full trade
//! set. They never validate their input; non-positive quantities or prices
//! flow through arithmetically and the functions never divide by zero.
//!
//! The two figures use different cost models. Open positions carry one
//! continuous weighted-average cost per ticker, while realized P/L matches
//! this year's average buy price against this year's average sell price.
//! They will not reconcile for tickers traded across a year boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};

use crate::models::{Position, Trade, TradeSide};

/// Share counts at or below this are treated as zero.
pub const SHARE_EPSILON: f64 = 1e-6;

/// Seam for swapping the recompute-from-scratch reducer for an incremental one.
pub trait PositionCalculator: Send + Sync {
    fn positions(&self, trades: &[Trade]) -> Vec<Position>;

    fn realized_pl(&self, trades: &[Trade], as_of: &DateTime<FixedOffset>) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedAverageCalculator;

impl PositionCalculator for WeightedAverageCalculator {
    fn positions(&self, trades: &[Trade]) -> Vec<Position> {
        compute_positions(trades)
    }

    fn realized_pl(&self, trades: &[Trade], as_of: &DateTime<FixedOffset>) -> f64 {
        compute_realized_pl(trades, as_of)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Holding {
    shares: f64,
    total_cost: f64,
}

impl Holding {
    fn buy(&mut self, shares: f64, price: f64) {
        self.total_cost += shares * price;
        self.shares += shares;
    }

    // Sells against an empty holding are ignored and sells larger than the
    // holding close it out; short positions are not modelled.
    fn sell(&mut self, shares: f64) {
        if self.shares <= SHARE_EPSILON {
            return;
        }
        let avg_cost_before_sale = self.total_cost / self.shares;
        let sold = shares.min(self.shares);
        self.shares -= sold;
        self.total_cost -= sold * avg_cost_before_sale;

        if self.shares <= SHARE_EPSILON {
            self.shares = 0.0;
            self.total_cost = 0.0;
        }
    }
}

/// Folds trades in timestamp order into one weighted-average holding per
/// ticker and returns the still-open ones, sorted by ticker.
pub fn compute_positions(trades: &[Trade]) -> Vec<Position> {
    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.created_at);

    let mut holdings: BTreeMap<&str, Holding> = BTreeMap::new();
    for trade in sorted {
        let holding = holdings.entry(trade.ticker.as_str()).or_default();
        match trade.trade_type {
            TradeSide::Buy => holding.buy(trade.shares, trade.price),
            TradeSide::Sell => holding.sell(trade.shares),
        }
    }

    holdings
        .into_iter()
        .filter(|(_, h)| h.shares > SHARE_EPSILON)
        .map(|(ticker, h)| Position::new(ticker.to_string(), h.shares, h.total_cost / h.shares))
        .collect()
}

#[derive(Debug, Default)]
struct SideTotals {
    quantity: f64,
    value: f64,
    count: usize,
}

impl SideTotals {
    fn add(&mut self, trade: &Trade) {
        self.quantity += trade.shares;
        self.value += trade.shares * trade.price;
        self.count += 1;
    }

    fn average_price(&self) -> Option<f64> {
        if self.quantity == 0.0 { None } else { Some(self.value / self.quantity) }
    }
}

/// Realized P/L for the calendar year containing `as_of`, evaluated in
/// `as_of`'s time zone.
///
/// Per ticker, the smaller of the bought and sold quantities is matched at the
/// year's average buy and average sell prices. Tickers traded on only one
/// side this year contribute nothing.
pub fn compute_realized_pl<Tz: TimeZone>(trades: &[Trade], as_of: &DateTime<Tz>) -> f64 {
    let tz = as_of.timezone();
    let year = as_of.year();

    let mut by_ticker: BTreeMap<&str, (SideTotals, SideTotals)> = BTreeMap::new();
    for trade in trades
        .iter()
        .filter(|t| t.created_at.with_timezone(&tz).year() == year)
    {
        let (buys, sells) = by_ticker.entry(trade.ticker.as_str()).or_default();
        match trade.trade_type {
            TradeSide::Buy => buys.add(trade),
            TradeSide::Sell => sells.add(trade),
        }
    }

    by_ticker
        .values()
        .filter(|(buys, sells)| buys.count > 0 && sells.count > 0)
        .filter_map(|(buys, sells)| {
            let avg_buy = buys.average_price()?;
            let avg_sell = sells.average_price()?;
            let matched = buys.quantity.min(sells.quantity);
            Some((avg_sell - avg_buy) * matched)
        })
        .sum()
}
