use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ANALYSIS_TYPE: &str = "enhanced";

/// One analysis pass of the trading bot, kept alongside the raw inputs and
/// outputs it was produced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisLog {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub current_price: f64,
    pub quote_balance: f64,
    pub base_balance: f64,
    pub total_portfolio_value: f64,
    pub decision: String,
    pub reason: String,
    pub confidence: String,
    pub analysis_type: String,
    pub investment_status: Value,
    pub analysis: Value,
    pub market_data: Value,
}

#[derive(Debug, Clone)]
pub struct AnalysisLogInsert {
    pub timestamp: NaiveDateTime,
    pub current_price: f64,
    pub quote_balance: f64,
    pub base_balance: f64,
    pub total_portfolio_value: f64,
    pub decision: String,
    pub reason: String,
    pub confidence: String,
    pub analysis_type: String,
    pub investment_status: Value,
    pub analysis: Value,
    pub market_data: Value,
}

impl AnalysisLogInsert {
    /// Flattens the bot's market snapshot and AI answer into a log row.
    /// Missing fields fall back to zero or the empty string.
    pub fn from_payloads(
        market_data: Value,
        analysis: Value,
        timestamp: NaiveDateTime,
        analysis_type: &str,
    ) -> Self {
        let investment_status = market_data
            .get("investment_status")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        Self {
            timestamp,
            current_price: number_field(&market_data, "current_price"),
            quote_balance: number_field(&investment_status, "krw_balance"),
            base_balance: number_field(&investment_status, "btc_balance"),
            total_portfolio_value: number_field(&investment_status, "total_portfolio_value"),
            decision: text_field(&analysis, "decision"),
            reason: text_field(&analysis, "reason"),
            confidence: text_field(&analysis, "confidence"),
            analysis_type: analysis_type.to_string(),
            investment_status,
            analysis,
            market_data,
        }
    }
}

fn number_field(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
