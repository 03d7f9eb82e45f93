//! In-memory report store.

use async_trait::async_trait;
use patrol_report_models::ReportRecord;
use tokio::sync::Mutex;

use crate::{DbError, ReportStore, StoredReport, now_rfc3339};

/// A [`ReportStore`] that keeps reports in process memory.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<StoredReport>>,
}

impl MemoryReportStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, record: &ReportRecord) -> Result<StoredReport, DbError> {
        let mut reports = self.reports.lock().await;
        let id = reports.last().map_or(1, |last| last.id + 1);

        let stored = StoredReport {
            id,
            created_at: now_rfc3339(),
            record: record.clone(),
        };
        reports.push(stored.clone());

        Ok(stored)
    }

    async fn all(&self) -> Result<Vec<StoredReport>, DbError> {
        Ok(self.reports.lock().await.clone())
    }

    async fn clear(&self) -> Result<u64, DbError> {
        let mut reports = self.reports.lock().await;
        let removed = reports.len() as u64;
        reports.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use patrol_report_models::Location;

    use super::*;

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryReportStore::new();
        let record = ReportRecord {
            location: Location::Muana,
            ..ReportRecord::default()
        };

        let first = store.insert(&record).await.unwrap();
        let second = store.insert(&record).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let all = store.all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = MemoryReportStore::new();
        store.insert(&ReportRecord::default()).await.unwrap();
        store.insert(&ReportRecord::default()).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.clear().await.unwrap(), 0);
        assert!(store.all().await.unwrap().is_empty());
    }
}
