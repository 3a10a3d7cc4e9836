//! Wire models shared between the CLI client and the scan service

use serde::{Deserialize, Serialize};

/// Request body for `POST /scan`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Repository URL to clone and scan
    pub repo: String,

    /// Basenames of the report files to ingest, in the order the user gave
    /// them. An empty list means "every JSON file in the repository".
    pub files: Vec<String>,
}

/// Request body for `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub filters: QueryFilter,
}

/// Filter block inside a query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFilter {
    pub severity: String,
}

/// Error body returned by the service on any non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Acknowledgement body returned by `POST /scan` on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAck {
    pub status: String,
}

/// One stored vulnerability, as returned by `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnRecord {
    pub id: String,
    pub severity: String,
    pub cvss: f64,
    pub status: String,
    pub package_name: String,
    pub current_version: String,
    pub fixed_version: String,
    pub description: String,
    pub published_date: String,
    pub link: String,
    /// Concatenated risk factor list, e.g. `[Exploit Available, In The Wild]`
    pub risk_factors: String,
}
