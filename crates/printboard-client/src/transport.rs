//! HTTP transport to the gateway

use printboard_core::{
    DebugResponse, ErrorBody, Fingerprint, ListResponse, RegisterResponse, TransportError,
    DEBUG_PATH, FINGERPRINTS_PATH,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Every request carries the same bounded timeout.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl SyncClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_millis() as u64)
        } else {
            TransportError::Request(e.to_string())
        }
    }

    pub async fn register(&self, fingerprint: &Fingerprint) -> Result<RegisterResponse, TransportError> {
        debug!(id = %fingerprint.short_id(), "registering");
        let response = self
            .http
            .post(self.url(FINGERPRINTS_PATH))
            .json(fingerprint)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        self.decode(response).await
    }

    pub async fn list(&self) -> Result<ListResponse, TransportError> {
        let response = self
            .http
            .get(self.url(FINGERPRINTS_PATH))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        self.decode(response).await
    }

    pub async fn debug(&self) -> Result<DebugResponse, TransportError> {
        let response = self
            .http
            .get(self.url(DEBUG_PATH))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .map(|body| body.details)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                details,
            });
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout.as_millis() as u64)
            } else {
                TransportError::Decode(e.to_string())
            }
        })
    }
}
