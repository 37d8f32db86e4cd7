use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the market looked like at the most recent analysis before a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub technical_indicators: Value,
    pub fear_greed: Value,
}
