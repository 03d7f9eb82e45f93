#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the patrol report server.
//!
//! These types are serialized to JSON for the REST API and shared with the
//! HTTP client. Every response envelope carries a `success` flag; a
//! response with `success: false` is an [`ApiError`].

use std::collections::BTreeMap;

use patrol_report_models::{AccumulatedTotals, ReportRecord};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw report text as pasted by the operator.
    pub text: String,
}

/// A report as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Store-assigned id, absent for reports that were never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// When the report was stored (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// The extracted fields.
    #[serde(flatten)]
    pub record: ReportRecord,
    /// People and vehicles stopped.
    pub total_inspections: u64,
}

impl From<ReportRecord> for ApiReport {
    fn from(record: ReportRecord) -> Self {
        Self {
            id: None,
            created_at: None,
            total_inspections: record.total_inspections(),
            record,
        }
    }
}

/// Running totals as returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTotals {
    /// Summed counters, drug mass and report count.
    #[serde(flatten)]
    pub totals: AccumulatedTotals,
    /// Summed inspections.
    pub total_inspections: u64,
}

impl From<AccumulatedTotals> for ApiTotals {
    fn from(totals: AccumulatedTotals) -> Self {
        Self {
            total_inspections: totals.total_inspections(),
            totals,
        }
    }
}

/// Response of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    /// The authoritative record.
    pub data: ApiReport,
    /// Global totals after folding `data` in.
    pub totals: ApiTotals,
}

/// Response of `POST /api/reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    /// Number of stored reports deleted.
    pub removed: u64,
}

/// Response of `GET /api/totals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub success: bool,
    pub totals: ApiTotals,
}

/// Response of `GET /api/reports/by-location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub success: bool,
    /// Totals keyed by location display name.
    pub locations: BTreeMap<String, ApiTotals>,
}

/// Error body returned with every non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
}
