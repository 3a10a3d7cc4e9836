//! Scan command: submit a repository to the scan service.
//!
//! The flow is validate, one POST, render. Validation failures abort before
//! any network call; a failed request renders a message and is not retried.

use crate::client::{ScanRequest, ScanServiceApi, ScanServiceClient};
use crate::error::{ApiError, Result};

/// Fixed success text rendered on any 2xx response
const SCAN_SUCCESS: &str = "Scan completed successfully.";

/// Generic text rendered on transport failures; the detail is only logged
const SCAN_TRANSPORT_FAILURE: &str = "An error occurred while scanning.";

/// Validation prompt when the repo or file list is missing
const SCAN_VALIDATION_PROMPT: &str = "Please enter a valid repo URL and at least one file.";

/// Split a comma-delimited file list, trimming each entry and dropping
/// entries that trim to nothing. Order is preserved.
pub fn parse_file_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the scan request, or a validation error when the repo is empty or
/// no file names survive trimming.
pub fn build_request(repo: &str, files_raw: &str) -> std::result::Result<ScanRequest, ApiError> {
    let repo = repo.trim();
    let files = parse_file_list(files_raw);

    if repo.is_empty() || files.is_empty() {
        return Err(ApiError::Validation(SCAN_VALIDATION_PROMPT.to_string()));
    }

    Ok(ScanRequest {
        repo: repo.to_string(),
        files,
    })
}

/// Render the outcome of a scan request as the line shown to the user
pub fn render_outcome(outcome: &std::result::Result<(), ApiError>) -> String {
    match outcome {
        Ok(()) => SCAN_SUCCESS.to_string(),
        Err(ApiError::Server(message)) => format!("Error: {}", message),
        Err(other) => {
            log::error!("Error calling /scan: {}", other);
            SCAN_TRANSPORT_FAILURE.to_string()
        }
    }
}

/// Run the scan command
pub async fn run(
    repo: &str,
    files: Option<&str>,
    server: Option<&str>,
    config_path: Option<&str>,
) -> Result<()> {
    // Local guard first: no config, no client, no request on bad input
    let request = build_request(repo, files.unwrap_or(""))?;

    let server_url = crate::cli::resolve_server(server, config_path)?;
    let client = ScanServiceClient::new(server_url)?;

    let outcome = client.scan(&request).await;
    println!("{}", render_outcome(&outcome));

    Ok(())
}
