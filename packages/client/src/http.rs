//! [`RemoteAuthority`] over the server's JSON API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use patrol_report_models::AccumulatedTotals;
use patrol_report_server_models::{
    AnalyzeRequest, AnalyzeResponse, ApiError, LocationsResponse, ResetResponse, TotalsResponse,
};
use serde::de::DeserializeOwned;

use crate::authority::{RemoteAuthority, SubmitReply};
use crate::{ClientError, retry};

/// Default server URL when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to a patrol report server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    /// Creates a client for the server at `base_url`
    /// (e.g. `http://127.0.0.1:8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }
}

/// Reads a response body and decodes the `success` envelope.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    parse_envelope(status, &body)
}

/// Decodes a response body given its status code.
///
/// Non-2xx statuses become [`ClientError::Status`] carrying the server's
/// error message when the body has one. A 2xx body with `success: false`
/// becomes [`ClientError::Rejected`].
fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ClientError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiError>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        return Err(ClientError::Status { status, message });
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    if value.get("success").and_then(serde_json::Value::as_bool) != Some(true) {
        let message = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("success flag missing or false")
            .to_string();
        return Err(ClientError::Rejected(message));
    }

    serde_json::from_value(value).map_err(|e| ClientError::Malformed(e.to_string()))
}

#[async_trait]
impl RemoteAuthority for HttpAuthority {
    async fn submit(&self, text: &str) -> Result<SubmitReply, ClientError> {
        let response = self
            .client
            .post(self.url("/analyze"))
            .json(&AnalyzeRequest {
                text: text.to_string(),
            })
            .send()
            .await?;

        let reply: AnalyzeResponse = decode(response).await?;

        Ok(SubmitReply {
            record: reply.data.record,
            totals: reply.totals.totals,
        })
    }

    async fn reset(&self) -> Result<u64, ClientError> {
        let url = self.url("/reset");
        let response = retry::send(|| self.client.post(&url)).await?;
        let reply: ResetResponse = decode(response).await?;
        Ok(reply.removed)
    }

    async fn totals(&self) -> Result<AccumulatedTotals, ClientError> {
        let url = self.url("/totals");
        let response = retry::send(|| self.client.get(&url)).await?;
        let reply: TotalsResponse = decode(response).await?;
        Ok(reply.totals.totals)
    }

    async fn locations(&self) -> Result<BTreeMap<String, AccumulatedTotals>, ClientError> {
        let url = self.url("/reports/by-location");
        let response = retry::send(|| self.client.get(&url)).await?;
        let reply: LocationsResponse = decode(response).await?;
        Ok(reply
            .locations
            .into_iter()
            .map(|(location, totals)| (location, totals.totals))
            .collect())
    }
}
