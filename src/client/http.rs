//! reqwest-backed scan service client

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::models::{QueryRequest, ScanRequest};
use super::{ApiResult, ScanServiceApi};
use crate::error::ApiError;

/// HTTP client for the scan service.
///
/// Built without a request timeout: a hung service hangs the command rather
/// than failing it, matching the fire-and-forget contract of the actions.
pub struct ScanServiceClient {
    http: HttpClient,
    base_url: String,
}

impl ScanServiceClient {
    /// Create a client against the given base URL, e.g. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// POST a JSON body and decode the response body as JSON.
    ///
    /// Every response body is parsed, success or not: an unparseable body is
    /// a transport failure, a non-2xx status surfaces the body's `error`
    /// field as a server failure.
    async fn post_json(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> ApiResult<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Transport(format!("Failed to parse response body: {}", e)))?;

        if status.is_success() {
            Ok(value)
        } else {
            let message = value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unexpected status code: {}", status));
            Err(ApiError::Server(message))
        }
    }
}

#[async_trait]
impl ScanServiceApi for ScanServiceClient {
    async fn scan(&self, request: &ScanRequest) -> ApiResult<()> {
        self.post_json("/scan", request).await.map(|_| ())
    }

    async fn query(&self, request: &QueryRequest) -> ApiResult<serde_json::Value> {
        self.post_json("/query", request).await
    }
}
