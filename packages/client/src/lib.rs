#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Client side of the patrol report flow.
//!
//! A submission is extracted locally first so the operator sees a result
//! immediately, then sent to the remote authority whose record and totals
//! replace the local ones. When the remote call fails the local record
//! stays on screen and the totals are left as they were.
//!
//! - [`authority`]: the [`RemoteAuthority`](authority::RemoteAuthority)
//!   seam the controller talks to
//! - [`http`]: the reqwest implementation against the server's `/api`
//! - [`controller`]: the reconciliation state machine

pub mod authority;
pub mod controller;
pub mod http;
mod retry;

/// Errors from client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The report text was empty or whitespace only.
    #[error("Report text is empty")]
    EmptyReport,

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// The server answered `success: false`.
    #[error("Server rejected the request: {0}")]
    Rejected(String),

    /// The response body was not the expected JSON shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The background remote call was cancelled or panicked.
    #[error("Remote task failed: {0}")]
    Task(String),
}
