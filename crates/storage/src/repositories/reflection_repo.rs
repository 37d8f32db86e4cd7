use common::models::{Reflection, ReflectionInsert};
use common::time;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageError;
use crate::rows::{REFLECTION_COLUMNS, ReflectionRow, convert_all};

pub struct ReflectionRepository;

impl ReflectionRepository {
    pub async fn insert(pool: &SqlitePool, r: &ReflectionInsert) -> Result<i64, StorageError> {
        let reflection_date = r.reflection_date.unwrap_or_else(time::now);

        let id = sqlx::query(
            r#"
                INSERT INTO self_reflections (
                    reflection_date, analysis_period_start, analysis_period_end,
                    total_trades_analyzed, successful_trades, failed_trades,
                    total_profit_loss, win_rate, market_conditions_then,
                    market_conditions_now, reflection_content, lessons_learned,
                    improvement_suggestions, confidence_adjustment, strategy_modifications
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(time::to_storage(&reflection_date))
        .bind(&r.analysis_period_start)
        .bind(&r.analysis_period_end)
        .bind(r.total_trades_analyzed)
        .bind(r.successful_trades)
        .bind(r.failed_trades)
        .bind(r.total_profit_loss)
        .bind(r.win_rate)
        .bind(&r.market_conditions_then)
        .bind(&r.market_conditions_now)
        .bind(&r.reflection_content)
        .bind(&r.lessons_learned)
        .bind(&r.improvement_suggestions)
        .bind(r.confidence_adjustment)
        .bind(&r.strategy_modifications)
        .execute(pool)
        .await?
        .last_insert_rowid();

        debug!("Saved reflection {}", id);
        Ok(id)
    }

    pub async fn get_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Reflection>, StorageError> {
        let sql = format!("SELECT {REFLECTION_COLUMNS} FROM self_reflections ORDER BY id DESC LIMIT ?");
        let rows = sqlx::query_as::<_, ReflectionRow>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        convert_all(rows)
    }
}
