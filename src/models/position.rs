use serde::{Deserialize, Serialize};

/// Net open holding in one ticker. Derived from trades on every request and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub shares: f64,
    pub average_cost: f64,
    pub current_price: Option<f64>,
}

impl Position {
    pub(crate) fn new(ticker: String, shares: f64, average_cost: f64) -> Self {
        Self {
            ticker,
            shares,
            average_cost,
            current_price: None,
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares * self.average_cost
    }
}

/// A position with the quote-derived figures shown in the performance table.
/// Every quote-derived field is `None` when no quote could be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub ticker: String,
    pub shares: f64,
    pub average_cost: f64,
    pub cost_basis: f64,
    pub current_price: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_gain_loss: Option<f64>,
    pub unrealized_gain_loss_pct: Option<f64>,
}

impl From<Position> for PositionView {
    fn from(position: Position) -> Self {
        let cost_basis = position.cost_basis();
        let market_value = position.current_price.map(|price| position.shares * price);
        let unrealized_gain_loss = market_value.map(|value| value - cost_basis);
        let unrealized_gain_loss_pct = unrealized_gain_loss.map(|gain| {
            if cost_basis == 0.0 { 0.0 } else { gain / cost_basis * 100.0 }
        });

        Self {
            ticker: position.ticker,
            shares: position.shares,
            average_cost: position.average_cost,
            cost_basis,
            current_price: position.current_price,
            market_value,
            unrealized_gain_loss,
            unrealized_gain_loss_pct,
        }
    }
}
