//! HTTP client for the vulnerability scan service

use async_trait::async_trait;

use crate::error::ApiError;

pub mod http;
pub mod models;

pub use http::ScanServiceClient;
pub use models::{QueryFilter, QueryRequest, ScanRequest, VulnRecord};

/// Result type for the request flows; the three spec'd failure kinds are the
/// `ApiError` variants, so callers match on them rather than catching broadly.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Scan service API surface
#[async_trait]
pub trait ScanServiceApi: Send + Sync {
    /// Submit a repository scan. Success is the service's 2xx acknowledgment;
    /// the body beyond that is not interpreted.
    async fn scan(&self, request: &ScanRequest) -> ApiResult<()>;

    /// Query stored vulnerabilities. Returns the raw response body so the
    /// caller can render it verbatim.
    async fn query(&self, request: &QueryRequest) -> ApiResult<serde_json::Value>;
}
