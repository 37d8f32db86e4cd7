use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingStats {
    pub total_trades: i64,
    pub buy_count: i64,
    pub sell_count: i64,
    pub total_fee: f64,
    pub ai_decisions: BTreeMap<String, i64>,
}

/// Realised results of a replay over a window of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    pub total_trades: usize,
    pub successful_trades: usize,
    pub failed_trades: usize,
    pub total_profit_loss: f64,
    pub win_rate: f64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Headline numbers for the performance overview panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_buy_value: f64,
    pub total_sell_value: f64,
    pub total_fees: f64,
    pub net_profit: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPerformance {
    pub month: String,
    pub trade_count: usize,
    pub total_value: f64,
    pub total_fees: f64,
}
