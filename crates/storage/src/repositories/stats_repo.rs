use common::models::TradingStats;
use sqlx::SqlitePool;

use crate::error::StorageError;

pub struct StatsRepository;

impl StatsRepository {
    /// Trade counts and fees over executed trades, plus how often each
    /// decision was reached across all analysis logs.
    pub async fn get_trading_stats(pool: &SqlitePool) -> Result<TradingStats, StorageError> {
        let mut conn = pool.acquire().await?;

        let total_trades =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM actual_trades WHERE success = 1")
                .fetch_one(&mut *conn)
                .await?;

        let per_side = sqlx::query_as::<_, (String, i64)>(
            "SELECT lower(trade_type), COUNT(*) FROM actual_trades \
             WHERE success = 1 GROUP BY lower(trade_type)",
        )
        .fetch_all(&mut *conn)
        .await?;

        let total_fee = sqlx::query_scalar::<_, f64>(
            "SELECT CAST(COALESCE(SUM(fee), 0) AS REAL) FROM actual_trades WHERE success = 1",
        )
        .fetch_one(&mut *conn)
        .await?;

        let decisions = sqlx::query_as::<_, (String, i64)>(
            "SELECT ai_decision, COUNT(*) FROM trading_logs GROUP BY ai_decision",
        )
        .fetch_all(&mut *conn)
        .await?;

        let count_of = |side: &str| {
            per_side
                .iter()
                .find(|(s, _)| s == side)
                .map(|(_, c)| *c)
                .unwrap_or(0)
        };

        Ok(TradingStats {
            total_trades,
            buy_count: count_of("buy"),
            sell_count: count_of("sell"),
            total_fee,
            ai_decisions: decisions.into_iter().collect(),
        })
    }
}
