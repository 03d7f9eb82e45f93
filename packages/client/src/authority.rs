//! The remote authority the controller submits reports to.

use std::collections::BTreeMap;

use async_trait::async_trait;
use patrol_report_models::{AccumulatedTotals, ReportRecord};

use crate::ClientError;

/// Reply to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReply {
    /// The authoritative record.
    pub record: ReportRecord,
    /// Global totals after the record was folded in.
    pub totals: AccumulatedTotals,
}

/// The single source of truth for extraction and aggregation.
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// Submits raw report text. Not idempotent: every call adds a report.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status,
    /// a `success: false` reply, or a malformed body.
    async fn submit(&self, text: &str) -> Result<SubmitReply, ClientError>;

    /// Clears every stored report and the totals, returning how many
    /// reports were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the reset could not be confirmed.
    async fn reset(&self) -> Result<u64, ClientError>;

    /// Current global totals.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the totals could not be fetched.
    async fn totals(&self) -> Result<AccumulatedTotals, ClientError>;

    /// Current totals keyed by location display name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the totals could not be fetched.
    async fn locations(&self) -> Result<BTreeMap<String, AccumulatedTotals>, ClientError>;
}
