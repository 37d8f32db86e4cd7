use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A retrospective the bot writes about its own recent trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: i64,
    pub reflection_date: NaiveDateTime,
    pub analysis_period_start: String,
    pub analysis_period_end: String,
    pub total_trades_analyzed: i64,
    pub successful_trades: i64,
    pub failed_trades: i64,
    pub total_profit_loss: f64,
    pub win_rate: f64,
    pub market_conditions_then: String,
    pub market_conditions_now: String,
    pub reflection_content: String,
    pub lessons_learned: String,
    pub improvement_suggestions: String,
    pub confidence_adjustment: f64,
    pub strategy_modifications: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionInsert {
    pub reflection_date: Option<NaiveDateTime>,
    pub analysis_period_start: String,
    pub analysis_period_end: String,
    pub total_trades_analyzed: i64,
    pub successful_trades: i64,
    pub failed_trades: i64,
    pub total_profit_loss: f64,
    pub win_rate: f64,
    pub market_conditions_then: String,
    pub market_conditions_now: String,
    pub reflection_content: String,
    pub lessons_learned: String,
    pub improvement_suggestions: String,
    pub confidence_adjustment: f64,
    pub strategy_modifications: String,
}
