use common::models::PortfolioSnapshot;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageError;
use crate::rows::{SNAPSHOT_COLUMNS, SnapshotRow, convert_all};

pub struct PortfolioRepository;

impl PortfolioRepository {
    /// Stores the snapshot for its date, replacing any earlier one for the same day.
    pub async fn upsert(pool: &SqlitePool, snapshot: &PortfolioSnapshot) -> Result<(), StorageError> {
        sqlx::query(
            r#"
                INSERT INTO portfolio_snapshots (
                    date, krw_balance, btc_balance, btc_avg_price,
                    total_value, profit_loss, profit_loss_percent
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(date) DO UPDATE SET
                    krw_balance = excluded.krw_balance,
                    btc_balance = excluded.btc_balance,
                    btc_avg_price = excluded.btc_avg_price,
                    total_value = excluded.total_value,
                    profit_loss = excluded.profit_loss,
                    profit_loss_percent = excluded.profit_loss_percent,
                    created_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(snapshot.date.format("%Y-%m-%d").to_string())
        .bind(snapshot.quote_balance)
        .bind(snapshot.base_balance)
        .bind(snapshot.base_avg_price)
        .bind(snapshot.total_value)
        .bind(snapshot.profit_loss)
        .bind(snapshot.profit_loss_percent)
        .execute(pool)
        .await?;

        debug!("Saved portfolio snapshot for {}", snapshot.date);
        Ok(())
    }

    /// The most recent `limit` daily snapshots, newest first.
    pub async fn get_history(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<PortfolioSnapshot>, StorageError> {
        let sql = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM portfolio_snapshots ORDER BY date DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, SnapshotRow>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        convert_all(rows)
    }

    pub async fn get_latest(pool: &SqlitePool) -> Result<Option<PortfolioSnapshot>, StorageError> {
        Ok(Self::get_history(pool, 1).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Journal;
    use chrono::NaiveDate;

    fn snapshot(date: &str, total: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            quote_balance: total / 2.0,
            base_balance: 0.01,
            base_avg_price: 50.0 * total,
            total_value: total,
            profit_loss: 0.0,
            profit_loss_percent: 0.0,
        }
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let journal = Journal::in_memory().await.unwrap();
        for (date, total) in [("2025-01-01", 100.0), ("2025-01-03", 300.0), ("2025-01-02", 200.0)] {
            PortfolioRepository::upsert(journal.pool(), &snapshot(date, total))
                .await
                .unwrap();
        }

        let history = PortfolioRepository::get_history(journal.pool(), 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].total_value, 300.0);
        assert_eq!(history[1].total_value, 200.0);

        let latest = PortfolioRepository::get_latest(journal.pool()).await.unwrap().unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    }

    #[tokio::test]
    async fn same_date_replaces_snapshot() {
        let journal = Journal::in_memory().await.unwrap();
        PortfolioRepository::upsert(journal.pool(), &snapshot("2025-01-01", 100.0))
            .await
            .unwrap();
        PortfolioRepository::upsert(journal.pool(), &snapshot("2025-01-01", 150.0))
            .await
            .unwrap();

        let history = PortfolioRepository::get_history(journal.pool(), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_value, 150.0);
    }

    #[tokio::test]
    async fn empty_journal_has_no_latest() {
        let journal = Journal::in_memory().await.unwrap();
        assert!(PortfolioRepository::get_latest(journal.pool()).await.unwrap().is_none());
    }
}
