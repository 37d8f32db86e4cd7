use chrono::NaiveDateTime;
use common::models::{AnalysisLog, AnalysisLogInsert, MarketContext};
use common::time;
use serde_json::Value;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::rows::{LOG_COLUMNS, LogRow, WALL_CLOCK, convert_all};

pub struct AnalysisLogRepository;

impl AnalysisLogRepository {
    pub async fn insert<'e, E>(executor: E, log: &AnalysisLogInsert) -> Result<i64, StorageError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = sqlx::query(
            r#"
                INSERT INTO trading_logs (
                    timestamp, current_price, krw_balance, btc_balance,
                    total_portfolio_value, investment_status_json,
                    ai_decision, ai_reason, ai_confidence,
                    ai_analysis_full_json, market_data_json, analysis_type
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(time::to_storage(&log.timestamp))
        .bind(log.current_price)
        .bind(log.quote_balance)
        .bind(log.base_balance)
        .bind(log.total_portfolio_value)
        .bind(serde_json::to_string(&log.investment_status)?)
        .bind(&log.decision)
        .bind(&log.reason)
        .bind(&log.confidence)
        .bind(serde_json::to_string(&log.analysis)?)
        .bind(serde_json::to_string(&log.market_data)?)
        .bind(&log.analysis_type)
        .execute(executor)
        .await?
        .last_insert_rowid();

        debug!("Saved analysis log {} (decision: {})", id, log.decision);
        Ok(id)
    }

    /// Most recently recorded logs first.
    pub async fn get_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<AnalysisLog>, StorageError> {
        let sql = format!("SELECT {LOG_COLUMNS} FROM trading_logs ORDER BY id DESC LIMIT ?");
        let rows = sqlx::query_as::<_, LogRow>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        convert_all(rows)
    }

    /// Logs with a timestamp in `[start, end]`, oldest first.
    pub async fn get_by_date_range(
        pool: &SqlitePool,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AnalysisLog>, StorageError> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM trading_logs \
             WHERE julianday({WALL_CLOCK}) BETWEEN julianday(substr(?, 1, 19)) AND julianday(substr(?, 1, 19)) \
             ORDER BY julianday({WALL_CLOCK}) ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, LogRow>(&sql)
            .bind(time::to_storage(&start))
            .bind(time::to_storage(&end))
            .fetch_all(pool)
            .await?;
        convert_all(rows)
    }

    /// Market conditions as of the latest analysis at or before `at`.
    pub async fn get_market_context(
        pool: &SqlitePool,
        at: NaiveDateTime,
    ) -> Result<Option<MarketContext>, StorageError> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM trading_logs \
             WHERE julianday({WALL_CLOCK}) <= julianday(substr(?, 1, 19)) \
             ORDER BY julianday({WALL_CLOCK}) DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, LogRow>(&sql)
            .bind(time::to_storage(&at))
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let market: Value = match row.market_data_raw().map(serde_json::from_str::<Value>) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                warn!("Unreadable market data in analysis log: {}", e);
                Value::Null
            }
            None => Value::Null,
        };

        Ok(Some(MarketContext {
            timestamp: row.timestamp()?,
            price: row.current_price(),
            technical_indicators: market
                .get("technical_indicators")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
            fear_greed: market
                .get("fear_greed_index")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
        }))
    }
}
