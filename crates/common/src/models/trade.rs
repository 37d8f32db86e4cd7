use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown trade side: {0:?}")]
pub struct ParseSideError(pub String);

impl FromStr for TradeSide {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// An order the bot actually sent to the exchange, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub side: TradeSide,
    pub price: f64,
    pub amount: f64,
    pub total_value: f64,
    pub fee: f64,
    pub order_id: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TradeInsert {
    /// `None` records the trade at insertion time.
    pub timestamp: Option<NaiveDateTime>,
    pub side: TradeSide,
    pub price: f64,
    pub amount: f64,
    pub total_value: f64,
    pub fee: f64,
    pub order_id: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl TradeInsert {
    pub fn new(side: TradeSide, price: f64, amount: f64, total_value: f64) -> Self {
        Self {
            timestamp: None,
            side,
            price,
            amount,
            total_value,
            fee: 0.0,
            order_id: None,
            success: true,
            error_message: None,
        }
    }

    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_fee(mut self, fee: f64) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn failed(mut self, error_message: impl Into<String>) -> Self {
        self.success = false;
        self.error_message = Some(error_message.into());
        self
    }
}
