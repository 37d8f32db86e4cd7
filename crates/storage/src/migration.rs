use std::path::Path;

use common::models::AnalysisLogInsert;
use common::models::analysis_log::DEFAULT_ANALYSIS_TYPE;
use common::time;
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::repositories::AnalysisLogRepository;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub imported: usize,
    pub skipped: usize,
}

/// One line of the bot's legacy JSON-lines analysis log.
#[derive(Deserialize)]
struct LegacyLogLine {
    #[serde(default)]
    market_data: Value,
    #[serde(default)]
    ai_analysis: Value,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Imports a JSON-lines analysis log into `trading_logs`. Blank lines are
/// ignored; lines that do not parse are skipped and counted.
pub async fn migrate_from_json(
    pool: &SqlitePool,
    path: impl AsRef<Path>,
) -> Result<MigrationReport, StorageError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await?;

    let mut report = MigrationReport::default();
    let mut tx = pool.begin().await?;

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry = match serde_json::from_str::<LegacyLogLine>(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping line {} of {}: {}", line_no + 1, path.display(), e);
                report.skipped += 1;
                continue;
            }
        };

        let timestamp = match entry.timestamp.as_deref() {
            None => time::now(),
            Some(raw) => match time::parse_timestamp(raw) {
                Some(ts) => ts,
                None => {
                    warn!(
                        "Skipping line {} of {}: unreadable timestamp {:?}",
                        line_no + 1,
                        path.display(),
                        raw
                    );
                    report.skipped += 1;
                    continue;
                }
            },
        };

        let insert = AnalysisLogInsert::from_payloads(
            entry.market_data,
            entry.ai_analysis,
            timestamp,
            DEFAULT_ANALYSIS_TYPE,
        );
        AnalysisLogRepository::insert(&mut *tx, &insert).await?;
        report.imported += 1;
    }

    tx.commit().await?;
    info!(
        "Migrated {}: {} imported, {} skipped",
        path.display(),
        report.imported,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Journal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn imports_valid_lines_and_counts_bad_ones() {
        let journal = Journal::in_memory().await.unwrap();
        let file = temp_file(concat!(
            r#"{"timestamp": "2025-01-01T09:00:00.123456", "market_data": {"current_price": 100}, "ai_analysis": {"decision": "buy"}}"#,
            "\n\n",
            "this is not json\n",
            r#"{"timestamp": "someday", "ai_analysis": {"decision": "sell"}}"#,
            "\n",
            r#"{"market_data": {"current_price": 101}, "ai_analysis": {"decision": "hold", "reason": "flat"}}"#,
            "\n",
        ));

        let report = migrate_from_json(journal.pool(), file.path()).await.unwrap();

        assert_eq!(report, MigrationReport { imported: 2, skipped: 2 });

        let logs = AnalysisLogRepository::get_recent(journal.pool(), 10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].decision, "hold");
        assert_eq!(logs[0].reason, "flat");
        assert_eq!(logs[1].decision, "buy");
        assert_eq!(logs[1].current_price, 100.0);
        assert_eq!(logs[1].analysis_type, "enhanced");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let journal = Journal::in_memory().await.unwrap();
        let err = migrate_from_json(journal.pool(), "/definitely/not/here.jsonl")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
