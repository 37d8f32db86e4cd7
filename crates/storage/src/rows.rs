//! Raw journal rows as SQLite hands them back, and their conversion into
//! domain models. Columns written by older bot versions may be NULL.

use chrono::{NaiveDate, NaiveDateTime};
use common::models::{AnalysisLog, PortfolioSnapshot, Reflection, Trade};
use common::time::parse_timestamp;
use serde_json::Value;
use sqlx::FromRow;

use crate::error::StorageError;

/// SQL for a row's wall-clock time: drops fractions and any UTC offset, as
/// `parse_timestamp` does, so SQLite never shifts a row to another day.
pub(crate) const WALL_CLOCK: &str = "substr(timestamp, 1, 19)";

pub(crate) const TRADE_COLUMNS: &str = "id, timestamp, trade_type, price, amount, total_value, \
     fee, order_id, success, error_message";

pub(crate) const LOG_COLUMNS: &str = "id, timestamp, current_price, krw_balance, btc_balance, \
     total_portfolio_value, investment_status_json, ai_decision, ai_reason, ai_confidence, \
     ai_analysis_full_json, market_data_json, analysis_type";

pub(crate) const SNAPSHOT_COLUMNS: &str = "date, krw_balance, btc_balance, btc_avg_price, \
     total_value, profit_loss, profit_loss_percent";

pub(crate) const REFLECTION_COLUMNS: &str = "id, reflection_date, analysis_period_start, \
     analysis_period_end, total_trades_analyzed, successful_trades, failed_trades, \
     total_profit_loss, win_rate, market_conditions_then, market_conditions_now, \
     reflection_content, lessons_learned, improvement_suggestions, confidence_adjustment, \
     strategy_modifications";

fn timestamp(table: &'static str, raw: &str) -> Result<NaiveDateTime, StorageError> {
    parse_timestamp(raw)
        .ok_or_else(|| StorageError::invalid_row(table, format!("unreadable timestamp {raw:?}")))
}

fn json(raw: Option<String>) -> Value {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(Value::Null)
}

#[derive(FromRow)]
pub(crate) struct TradeRow {
    id: i64,
    timestamp: String,
    trade_type: String,
    price: f64,
    amount: f64,
    total_value: f64,
    fee: Option<f64>,
    order_id: Option<String>,
    success: Option<bool>,
    error_message: Option<String>,
}

impl TryFrom<TradeRow> for Trade {
    type Error = StorageError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        Ok(Trade {
            id: row.id,
            timestamp: timestamp("actual_trades", &row.timestamp)?,
            side: row
                .trade_type
                .parse()
                .map_err(|e| StorageError::invalid_row("actual_trades", format!("{e}")))?,
            price: row.price,
            amount: row.amount,
            total_value: row.total_value,
            fee: row.fee.unwrap_or(0.0),
            order_id: row.order_id,
            success: row.success.unwrap_or(true),
            error_message: row.error_message,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct LogRow {
    id: i64,
    timestamp: String,
    current_price: f64,
    krw_balance: Option<f64>,
    btc_balance: Option<f64>,
    total_portfolio_value: Option<f64>,
    investment_status_json: Option<String>,
    ai_decision: String,
    ai_reason: Option<String>,
    ai_confidence: Option<String>,
    ai_analysis_full_json: Option<String>,
    market_data_json: Option<String>,
    analysis_type: Option<String>,
}

impl LogRow {
    pub(crate) fn timestamp(&self) -> Result<NaiveDateTime, StorageError> {
        timestamp("trading_logs", &self.timestamp)
    }

    pub(crate) fn current_price(&self) -> f64 {
        self.current_price
    }

    pub(crate) fn market_data_raw(&self) -> Option<&str> {
        self.market_data_json.as_deref()
    }
}

impl TryFrom<LogRow> for AnalysisLog {
    type Error = StorageError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        Ok(AnalysisLog {
            id: row.id,
            timestamp: row.timestamp()?,
            current_price: row.current_price,
            quote_balance: row.krw_balance.unwrap_or(0.0),
            base_balance: row.btc_balance.unwrap_or(0.0),
            total_portfolio_value: row.total_portfolio_value.unwrap_or(0.0),
            decision: row.ai_decision,
            reason: row.ai_reason.unwrap_or_default(),
            confidence: row.ai_confidence.unwrap_or_default(),
            analysis_type: row.analysis_type.unwrap_or_default(),
            investment_status: json(row.investment_status_json),
            analysis: json(row.ai_analysis_full_json),
            market_data: json(row.market_data_json),
        })
    }
}

#[derive(FromRow)]
pub(crate) struct SnapshotRow {
    date: String,
    krw_balance: f64,
    btc_balance: f64,
    btc_avg_price: Option<f64>,
    total_value: f64,
    profit_loss: Option<f64>,
    profit_loss_percent: Option<f64>,
}

impl TryFrom<SnapshotRow> for PortfolioSnapshot {
    type Error = StorageError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .or_else(|_| timestamp("portfolio_snapshots", &row.date).map(|ts| ts.date()))?;

        Ok(PortfolioSnapshot {
            date,
            quote_balance: row.krw_balance,
            base_balance: row.btc_balance,
            base_avg_price: row.btc_avg_price.unwrap_or(0.0),
            total_value: row.total_value,
            profit_loss: row.profit_loss.unwrap_or(0.0),
            profit_loss_percent: row.profit_loss_percent.unwrap_or(0.0),
        })
    }
}

#[derive(FromRow)]
pub(crate) struct ReflectionRow {
    id: i64,
    reflection_date: String,
    analysis_period_start: String,
    analysis_period_end: String,
    total_trades_analyzed: Option<i64>,
    successful_trades: Option<i64>,
    failed_trades: Option<i64>,
    total_profit_loss: Option<f64>,
    win_rate: Option<f64>,
    market_conditions_then: Option<String>,
    market_conditions_now: Option<String>,
    reflection_content: String,
    lessons_learned: Option<String>,
    improvement_suggestions: Option<String>,
    confidence_adjustment: Option<f64>,
    strategy_modifications: Option<String>,
}

impl TryFrom<ReflectionRow> for Reflection {
    type Error = StorageError;

    fn try_from(row: ReflectionRow) -> Result<Self, Self::Error> {
        Ok(Reflection {
            id: row.id,
            reflection_date: timestamp("self_reflections", &row.reflection_date)?,
            analysis_period_start: row.analysis_period_start,
            analysis_period_end: row.analysis_period_end,
            total_trades_analyzed: row.total_trades_analyzed.unwrap_or(0),
            successful_trades: row.successful_trades.unwrap_or(0),
            failed_trades: row.failed_trades.unwrap_or(0),
            total_profit_loss: row.total_profit_loss.unwrap_or(0.0),
            win_rate: row.win_rate.unwrap_or(0.0),
            market_conditions_then: row.market_conditions_then.unwrap_or_default(),
            market_conditions_now: row.market_conditions_now.unwrap_or_default(),
            reflection_content: row.reflection_content,
            lessons_learned: row.lessons_learned.unwrap_or_default(),
            improvement_suggestions: row.improvement_suggestions.unwrap_or_default(),
            confidence_adjustment: row.confidence_adjustment.unwrap_or(0.0),
            strategy_modifications: row.strategy_modifications.unwrap_or_default(),
        })
    }
}

pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StorageError>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}
