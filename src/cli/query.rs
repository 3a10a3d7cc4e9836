//! Query command: fetch stored vulnerabilities by severity.

use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::client::{QueryFilter, QueryRequest, ScanServiceApi, ScanServiceClient, VulnRecord};
use crate::error::{ApiError, Result};
use crate::output::{format_json, table};

/// Generic text rendered on transport failures; the detail is only logged
const QUERY_TRANSPORT_FAILURE: &str = "An error occurred while querying.";

/// Validation prompt when the severity is missing
const QUERY_VALIDATION_PROMPT: &str = "Please enter a severity level.";

/// Vulnerability record for table display
#[derive(Tabled)]
struct VulnDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SEVERITY")]
    severity: String,
    #[tabled(rename = "CVSS")]
    cvss: f64,
    #[tabled(rename = "PACKAGE")]
    package: String,
    #[tabled(rename = "CURRENT")]
    current_version: String,
    #[tabled(rename = "FIXED")]
    fixed_version: String,
    #[tabled(rename = "RISK FACTORS")]
    risk_factors: String,
}

impl From<VulnRecord> for VulnDisplay {
    fn from(record: VulnRecord) -> Self {
        Self {
            id: record.id,
            severity: record.severity,
            cvss: record.cvss,
            package: record.package_name,
            current_version: record.current_version,
            fixed_version: record.fixed_version,
            risk_factors: record.risk_factors,
        }
    }
}

/// Build the query request, or a validation error when the severity trims
/// to nothing.
pub fn build_request(severity: &str) -> std::result::Result<QueryRequest, ApiError> {
    let severity = severity.trim();
    if severity.is_empty() {
        return Err(ApiError::Validation(QUERY_VALIDATION_PROMPT.to_string()));
    }

    Ok(QueryRequest {
        filters: QueryFilter {
            severity: severity.to_string(),
        },
    })
}

/// Render the outcome of a query as the text shown to the user.
///
/// A successful body is pretty-printed exactly as the service returned it;
/// only the table format reinterprets it.
pub fn render_outcome(
    outcome: std::result::Result<serde_json::Value, ApiError>,
    format: OutputFormat,
) -> Result<String> {
    match outcome {
        Ok(body) => match format {
            OutputFormat::Json => Ok(format_json(&body)?),
            OutputFormat::Table => {
                let records: Vec<VulnRecord> = serde_json::from_value(body).map_err(|e| {
                    ApiError::InvalidResponse(format!("Unexpected query response shape: {}", e))
                })?;
                let rows: Vec<VulnDisplay> = records.into_iter().map(VulnDisplay::from).collect();
                Ok(table::format_table(&rows))
            }
        },
        Err(ApiError::Server(message)) => Ok(format!("Error: {}", message)),
        Err(ApiError::Transport(detail)) => {
            log::error!("Error calling /query: {}", detail);
            Ok(QUERY_TRANSPORT_FAILURE.to_string())
        }
        Err(other) => Err(other.into()),
    }
}

/// Run the query command
pub async fn run(
    severity: &str,
    format: OutputFormat,
    server: Option<&str>,
    config_path: Option<&str>,
) -> Result<()> {
    let request = build_request(severity)?;

    let server_url = crate::cli::resolve_server(server, config_path)?;
    let client = ScanServiceClient::new(server_url)?;

    let outcome = client.query(&request).await;
    println!("{}", render_outcome(outcome, format)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_request_trims_severity() {
        let request = build_request("  high  ").unwrap();
        assert_eq!(request.filters.severity, "high");
    }

    #[test]
    fn test_build_request_blank_severity_is_validation_error() {
        for input in ["", "   ", "\t"] {
            let result = build_request(input);
            assert!(matches!(result, Err(ApiError::Validation(_))), "{:?}", input);
        }
    }

    #[test]
    fn test_render_json_outcome_pretty_prints_body() {
        let body = json!({"items": [{"severity": "high"}]});
        let out = render_outcome(Ok(body), OutputFormat::Json).unwrap();

        assert_eq!(
            out,
            "{\n  \"items\": [\n    {\n      \"severity\": \"high\"\n    }\n  ]\n}"
        );
    }

    #[test]
    fn test_render_table_outcome_parses_records() {
        let body = json!([{
            "id": "CVE-9",
            "severity": "high",
            "cvss": 8.0,
            "status": "active",
            "package_name": "curl",
            "current_version": "7.0",
            "fixed_version": "8.0",
            "description": "d",
            "published_date": "2024-01-01",
            "link": "",
            "risk_factors": ""
        }]);

        let out = render_outcome(Ok(body), OutputFormat::Table).unwrap();
        assert!(out.contains("CVE-9"));
        assert!(out.contains("curl"));
    }

    #[test]
    fn test_render_table_outcome_rejects_non_record_body() {
        let body = json!({"not": "records"});
        let result = render_outcome(Ok(body), OutputFormat::Table);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_server_error_carries_message() {
        let out = render_outcome(
            Err(ApiError::Server("Error querying database".to_string())),
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(out, "Error: Error querying database");
    }

    #[test]
    fn test_render_transport_error_is_generic() {
        let out = render_outcome(
            Err(ApiError::Transport("dns failure".to_string())),
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(out, "An error occurred while querying.");
    }
}
