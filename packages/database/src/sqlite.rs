//! `SQLite`-backed report store.
//!
//! One row per report in the `reports` table. Counters are stored as
//! `INTEGER` columns and the drug mass as whole milligrams, so a stored
//! record reads back exactly as it was written.

use std::path::Path;

use async_trait::async_trait;
use moosicbox_json_utils::database::ToValue as _;
use patrol_report_models::{Category, CategoryCounts, Grams, ReportRecord};
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{DbError, ReportStore, StoredReport, now_rfc3339};

/// Column name of each counter, in [`Category::all`] order.
const fn count_column(category: Category) -> &'static str {
    match category {
        Category::Pedestrians => "pedestrians",
        Category::Motorcycles => "motorcycles",
        Category::Cars => "cars",
        Category::Bicycles => "bicycles",
        Category::Arrests => "arrests",
        Category::SeizedMotorcycles => "seized_motorcycles",
        Category::Fugitives => "fugitives",
        Category::BladedWeapons => "bladed_weapons",
        Category::Firearms => "firearms",
    }
}

/// A [`ReportStore`] persisted in a `SQLite` file.
pub struct SqliteReportStore {
    db: Box<dyn Database>,
}

impl SqliteReportStore {
    /// Opens (or creates) the reports database at `path` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database file cannot be created or the
    /// schema DDL fails.
    pub async fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Database(e.to_string()))?;

        ensure_schema(db.as_ref()).await?;
        log::debug!("Opened report store at {}", path.display());

        Ok(Self { db })
    }
}

/// Creates the `reports` table if it doesn't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            location TEXT NOT NULL,
            report_date TEXT,
            shift TEXT NOT NULL,
            pedestrians INTEGER NOT NULL DEFAULT 0,
            motorcycles INTEGER NOT NULL DEFAULT 0,
            cars INTEGER NOT NULL DEFAULT 0,
            bicycles INTEGER NOT NULL DEFAULT 0,
            arrests INTEGER NOT NULL DEFAULT 0,
            seized_motorcycles INTEGER NOT NULL DEFAULT 0,
            fugitives INTEGER NOT NULL DEFAULT 0,
            bladed_weapons INTEGER NOT NULL DEFAULT 0,
            firearms INTEGER NOT NULL DEFAULT 0,
            drugs_seized_mg INTEGER NOT NULL DEFAULT 0,
            occurrence TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_reports_location
         ON reports (location)",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Converts an unsigned counter to an `INTEGER` value.
///
/// Per-report values never exceed
/// [`MAX_COUNT`](patrol_report_models::MAX_COUNT), which fits `i64`; the
/// saturation only guards against records built by hand.
fn int(value: u64) -> DatabaseValue {
    DatabaseValue::Int64(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Reads a non-negative `INTEGER` column, treating missing or negative
/// values as zero.
fn row_u64(row: &switchy_database::Row, col: &str) -> u64 {
    let value: i64 = row.to_value(col).unwrap_or(0);
    u64::try_from(value).unwrap_or(0)
}

/// Converts a database row into a [`StoredReport`].
fn row_to_report(row: &switchy_database::Row) -> StoredReport {
    let mut counts = CategoryCounts::default();
    for category in Category::all() {
        *counts.get_mut(*category) = row_u64(row, count_column(*category));
    }

    StoredReport {
        id: row.to_value("id").unwrap_or(0),
        created_at: row.to_value("created_at").unwrap_or_default(),
        record: ReportRecord {
            location: row
                .to_value::<String>("location")
                .unwrap_or_default()
                .parse()
                .unwrap_or_default(),
            date: row.to_value("report_date").unwrap_or(None),
            shift: row
                .to_value::<String>("shift")
                .unwrap_or_default()
                .parse()
                .unwrap_or_default(),
            counts,
            drugs_seized: Grams::from_milligrams(row_u64(row, "drugs_seized_mg")),
            occurrence: row.to_value("occurrence").unwrap_or_default(),
        },
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn insert(&self, record: &ReportRecord) -> Result<StoredReport, DbError> {
        let created_at = now_rfc3339();
        let counts = &record.counts;

        let rows = self
            .db
            .query_raw_params(
                "INSERT INTO reports (location, report_date, shift,
                     pedestrians, motorcycles, cars, bicycles, arrests,
                     seized_motorcycles, fugitives, bladed_weapons, firearms,
                     drugs_seized_mg, occurrence, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING id",
                &[
                    DatabaseValue::String(record.location.as_ref().to_string()),
                    record
                        .date
                        .clone()
                        .map_or(DatabaseValue::Null, DatabaseValue::String),
                    DatabaseValue::String(record.shift.as_ref().to_string()),
                    int(counts.pedestrians),
                    int(counts.motorcycles),
                    int(counts.cars),
                    int(counts.bicycles),
                    int(counts.arrests),
                    int(counts.seized_motorcycles),
                    int(counts.fugitives),
                    int(counts.bladed_weapons),
                    int(counts.firearms),
                    int(record.drugs_seized.milligrams()),
                    DatabaseValue::String(record.occurrence.clone()),
                    DatabaseValue::String(created_at.clone()),
                ],
            )
            .await
            .map_err(|e| DbError::Database(e.to_string()))?;

        let id = rows
            .first()
            .and_then(|r| r.to_value("id").ok())
            .ok_or_else(|| DbError::Database("Insert returned no report id".to_string()))?;

        Ok(StoredReport {
            id,
            created_at,
            record: record.clone(),
        })
    }

    async fn all(&self) -> Result<Vec<StoredReport>, DbError> {
        let rows = self
            .db
            .query_raw_params("SELECT * FROM reports ORDER BY id", &[])
            .await
            .map_err(|e| DbError::Database(e.to_string()))?;

        Ok(rows.iter().map(row_to_report).collect())
    }

    async fn clear(&self) -> Result<u64, DbError> {
        let removed = self
            .db
            .exec_raw_params("DELETE FROM reports", &[])
            .await
            .map_err(|e| DbError::Database(e.to_string()))?;

        log::info!("Cleared {removed} stored report(s)");

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use patrol_report_models::{Location, MAX_COUNT, Shift};

    use super::*;

    fn temp_db_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "patrol_report_{name}_{}_{nanos}.db",
            std::process::id()
        ))
    }

    fn sample() -> ReportRecord {
        ReportRecord {
            location: Location::PontaDePedras,
            date: Some("02/03/2025".to_string()),
            shift: Shift::Night,
            counts: CategoryCounts {
                pedestrians: 4,
                cars: 2,
                arrests: 1,
                firearms: 1,
                ..CategoryCounts::default()
            },
            drugs_seized: Grams::from_milligrams(12_500),
            occurrence: "Abordagem com apreensão".to_string(),
        }
    }

    #[tokio::test]
    async fn stored_records_read_back_unchanged() {
        let path = temp_db_path("round_trip");
        let store = SqliteReportStore::open(&path).await.unwrap();

        let first = store.insert(&sample()).await.unwrap();
        let second = store.insert(&ReportRecord::default()).await.unwrap();
        assert!(second.id > first.id);

        let all = store.all().await.unwrap();
        assert_eq!(all, vec![first, second]);
        assert_eq!(all[0].record, sample());
        assert_eq!(all[1].record.date, None);

        drop(store);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn oversized_values_read_back_as_extracted() {
        let path = temp_db_path("oversized");
        let record = patrol_report_extract::extract(
            "CARROS: 99999999999999999999\nMOTOS: 3\nDROGAS: 99999999999999999999,5",
        );
        assert_eq!(record.counts.cars, MAX_COUNT);
        assert_eq!(record.drugs_seized.milligrams(), MAX_COUNT);

        {
            let store = SqliteReportStore::open(&path).await.unwrap();
            store.insert(&record).await.unwrap();
        }

        let store = SqliteReportStore::open(&path).await.unwrap();
        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record, record);

        drop(store);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn reports_survive_reopen_and_clear_removes_them() {
        let path = temp_db_path("reopen");
        {
            let store = SqliteReportStore::open(&path).await.unwrap();
            store.insert(&sample()).await.unwrap();
            store.insert(&sample()).await.unwrap();
        }

        let store = SqliteReportStore::open(&path).await.unwrap();
        assert_eq!(store.all().await.unwrap().len(), 2);
        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.clear().await.unwrap(), 0);
        assert!(store.all().await.unwrap().is_empty());

        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
