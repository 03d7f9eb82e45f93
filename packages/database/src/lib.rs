#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Storage for parsed patrol reports.
//!
//! The store is the durable record of every submission. Running totals are
//! never persisted; they are rebuilt by folding [`ReportStore::all`] on
//! start-up.
//!
//! Two implementations are provided: [`sqlite::SqliteReportStore`] backed
//! by `switchy_database`, and [`memory::MemoryReportStore`] for tests and
//! throwaway servers.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use patrol_report_models::ReportRecord;

/// Default path for the reports database.
pub const DEFAULT_DB_PATH: &str = "data/patrol_reports.db";

/// Errors that can occur during report storage operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed (e.g., creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    /// Store-assigned identifier, increasing in insertion order.
    pub id: i64,
    /// When the report was stored (RFC 3339, UTC).
    pub created_at: String,
    /// The extracted record.
    pub record: ReportRecord,
}

/// Durable store of submitted reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persists `record` and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record could not be written.
    async fn insert(&self, record: &ReportRecord) -> Result<StoredReport, DbError>;

    /// Returns every stored report in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store could not be read.
    async fn all(&self) -> Result<Vec<StoredReport>, DbError>;

    /// Deletes every stored report and returns how many were removed.
    ///
    /// Clearing an empty store succeeds and returns `0`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the delete failed. Nothing is removed in
    /// that case.
    async fn clear(&self) -> Result<u64, DbError>;
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
