use chrono::{NaiveDate, NaiveDateTime};
use common::models::{Trade, TradeInsert};
use common::time;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageError;
use crate::rows::{TRADE_COLUMNS, TradeRow, WALL_CLOCK, convert_all};

pub struct TradeRepository;

impl TradeRepository {
    pub async fn insert(pool: &SqlitePool, trade: &TradeInsert) -> Result<i64, StorageError> {
        let timestamp = trade.timestamp.unwrap_or_else(time::now);

        let id = sqlx::query(
            r#"
                INSERT INTO actual_trades (
                    timestamp, trade_type, price, amount, total_value,
                    fee, order_id, success, error_message
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(time::to_storage(&timestamp))
        .bind(trade.side.as_str())
        .bind(trade.price)
        .bind(trade.amount)
        .bind(trade.total_value)
        .bind(trade.fee)
        .bind(&trade.order_id)
        .bind(trade.success)
        .bind(&trade.error_message)
        .execute(pool)
        .await?
        .last_insert_rowid();

        debug!(
            "Recorded trade {} ({} {} @ {})",
            id, trade.side, trade.amount, trade.price
        );
        Ok(id)
    }

    /// Trades whose timestamp falls on `start` (or between `start` and `end`
    /// inclusive), newest first.
    pub async fn get_trades_by_date(
        pool: &SqlitePool,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Trade>, StorageError> {
        let end = end.unwrap_or(start);
        let sql = format!(
            "SELECT {TRADE_COLUMNS} FROM actual_trades \
             WHERE date({WALL_CLOCK}) BETWEEN ? AND ? \
             ORDER BY julianday({WALL_CLOCK}) DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(start.format("%Y-%m-%d").to_string())
            .bind(end.format("%Y-%m-%d").to_string())
            .fetch_all(pool)
            .await?;

        convert_all(rows)
    }

    /// Executed trades in `[start, end]`, oldest first.
    pub async fn get_successful_between(
        pool: &SqlitePool,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Trade>, StorageError> {
        let sql = format!(
            "SELECT {TRADE_COLUMNS} FROM actual_trades \
             WHERE success = 1 AND julianday({WALL_CLOCK}) BETWEEN julianday(substr(?, 1, 19)) AND julianday(substr(?, 1, 19)) \
             ORDER BY julianday({WALL_CLOCK}) ASC, id ASC"
        );

        let rows = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(time::to_storage(&start))
            .bind(time::to_storage(&end))
            .fetch_all(pool)
            .await?;

        convert_all(rows)
    }

    /// Every executed trade, oldest first.
    pub async fn get_all_successful(pool: &SqlitePool) -> Result<Vec<Trade>, StorageError> {
        let sql = format!(
            "SELECT {TRADE_COLUMNS} FROM actual_trades \
             WHERE success = 1 \
             ORDER BY julianday({WALL_CLOCK}) ASC, id ASC"
        );

        let rows = sqlx::query_as::<_, TradeRow>(&sql).fetch_all(pool).await?;
        convert_all(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Journal;
    use common::models::TradeSide;

    fn at(date: &str) -> NaiveDateTime {
        time::parse_timestamp(date).unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    async fn seeded() -> Journal {
        let journal = Journal::in_memory().await.unwrap();
        let trades = [
            TradeInsert::new(TradeSide::Buy, 100.0, 1.0, 100.0).at(at("2025-01-01T09:00:00")),
            TradeInsert::new(TradeSide::Buy, 110.0, 1.0, 110.0)
                .at(at("2025-01-02T09:00:00"))
                .failed("rejected"),
            TradeInsert::new(TradeSide::Sell, 120.0, 1.0, 120.0)
                .with_fee(0.5)
                .with_order_id("abc-1")
                .at(at("2025-01-02T15:30:00")),
            TradeInsert::new(TradeSide::Buy, 90.0, 2.0, 180.0).at(at("2025-01-05T00:00:01")),
        ];
        for t in &trades {
            TradeRepository::insert(journal.pool(), t).await.unwrap();
        }
        journal
    }

    #[tokio::test]
    async fn insert_round_trips_fields() {
        let journal = seeded().await;
        let trades = TradeRepository::get_trades_by_date(journal.pool(), day("2025-01-02"), None)
            .await
            .unwrap();

        assert_eq!(trades.len(), 2);
        let sell = &trades[0];
        assert_eq!(sell.side, TradeSide::Sell);
        assert_eq!(sell.fee, 0.5);
        assert_eq!(sell.order_id.as_deref(), Some("abc-1"));
        assert!(sell.success);
        assert_eq!(sell.timestamp, at("2025-01-02T15:30:00"));

        let failed = &trades[1];
        assert!(!failed.success);
        assert_eq!(failed.error_message.as_deref(), Some("rejected"));
    }

    #[tokio::test]
    async fn date_range_is_inclusive_and_newest_first() {
        let journal = seeded().await;
        let trades = TradeRepository::get_trades_by_date(
            journal.pool(),
            day("2025-01-01"),
            Some(day("2025-01-02")),
        )
        .await
        .unwrap();

        let times: Vec<_> = trades.iter().map(|t| t.timestamp).collect();
        assert_eq!(
            times,
            vec![
                at("2025-01-02T15:30:00"),
                at("2025-01-02T09:00:00"),
                at("2025-01-01T09:00:00"),
            ]
        );
    }

    #[tokio::test]
    async fn successful_between_skips_failures() {
        let journal = seeded().await;
        let trades = TradeRepository::get_successful_between(
            journal.pool(),
            at("2025-01-01T00:00:00"),
            at("2025-01-05T00:00:00"),
        )
        .await
        .unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, TradeSide::Buy);
        assert_eq!(trades[1].side, TradeSide::Sell);

        let all = TradeRepository::get_all_successful(journal.pool()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn reads_rows_written_with_space_separated_timestamps() {
        let journal = Journal::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO actual_trades (timestamp, trade_type, price, amount, total_value) \
             VALUES ('2025-02-01 12:00:00', 'BUY', 10.0, 1.0, 10.0)",
        )
        .execute(journal.pool())
        .await
        .unwrap();

        let trades = TradeRepository::get_trades_by_date(journal.pool(), day("2025-02-01"), None)
            .await
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, TradeSide::Buy);
        assert_eq!(trades[0].fee, 0.0);
        assert!(trades[0].success);
    }

    #[tokio::test]
    async fn offset_timestamps_stay_on_their_wall_clock_day() {
        let journal = Journal::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO actual_trades (timestamp, trade_type, price, amount, total_value) \
             VALUES ('2025-03-02T01:30:00+09:00', 'SELL', 10.0, 1.0, 10.0)",
        )
        .execute(journal.pool())
        .await
        .unwrap();

        let trades = TradeRepository::get_trades_by_date(journal.pool(), day("2025-03-02"), None)
            .await
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].timestamp, at("2025-03-02T01:30:00"));

        let earlier = TradeRepository::get_trades_by_date(journal.pool(), day("2025-03-01"), None)
            .await
            .unwrap();
        assert!(earlier.is_empty());

        let window = TradeRepository::get_successful_between(
            journal.pool(),
            at("2025-03-02T01:00:00"),
            at("2025-03-02T02:00:00"),
        )
        .await
        .unwrap();
        assert_eq!(window.len(), 1);
    }
}
