//! Route handlers for the scan service

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::client::models::{ErrorBody, ScanAck, ScanRequest, VulnRecord};
use crate::error::StoreError;
use crate::server::AppState;
use crate::server::ingest::{load_scan_documents, select_files};

type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, message: &str) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Query body. The filter block is an open map so older clients sending
/// extra filter keys still parse; only `severity` is honored.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

/// Handler: POST /scan
///
/// Wipes previously stored data, clones the requested repository, parses the
/// selected JSON report files and persists them.
pub async fn scan_repo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanAck>, ErrorResponse> {
    let Json(request) = payload.map_err(|e| {
        log::warn!("Invalid scan payload: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Invalid JSON payload")
    })?;

    with_store(&state, |store| store.clear_scans())
        .await
        .map_err(|e| {
            log::error!("Failed to clear scan data: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to clean up existing scan data",
            )
        })?;

    state.workspace.reset().await.map_err(|e| {
        log::error!("Failed to reset clone workspace: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to delete old repository",
        )
    })?;

    state.workspace.clone_repo(&request.repo).await.map_err(|e| {
        log::error!("Failed to clone {}: {}", request.repo, e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to clone repository",
        )
    })?;

    let files = select_files(state.workspace.json_files(), &request.files);
    if files.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "No valid files to scan",
        ));
    }

    let started = std::time::Instant::now();
    let documents = load_scan_documents(files).await;
    log::info!(
        "Parsed {} scan documents in {:?}",
        documents.len(),
        started.elapsed()
    );

    let stats = with_store(&state, move |store| store.save_scan_documents(&documents))
        .await
        .map_err(|e| {
            log::error!("Failed to save scan data: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save scan data",
            )
        })?;
    log::info!(
        "Stored {} scans, {} vulnerabilities ({} skipped)",
        stats.scans_inserted,
        stats.vulnerabilities_inserted,
        stats.scans_skipped
    );

    Ok(Json(ScanAck {
        status: "Scan completed".to_string(),
    }))
}

/// Handler: POST /query
pub async fn query_data(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryBody>, JsonRejection>,
) -> Result<Json<Vec<VulnRecord>>, ErrorResponse> {
    let Json(body) = payload.map_err(|e| {
        log::warn!("Invalid query payload: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Invalid JSON payload")
    })?;

    let severity = body.filters.get("severity").cloned().unwrap_or_default();
    log::info!("Received query for severity: {}", severity);

    let records = with_store(&state, move |store| store.query_by_severity(&severity))
        .await
        .map_err(|e| {
            log::error!("Error querying database: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error querying database",
            )
        })?;

    Ok(Json(records))
}

/// Run a store operation on the blocking pool; rusqlite is synchronous.
async fn with_store<T, F>(state: &Arc<AppState>, op: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&crate::store::VulnStore) -> Result<T, StoreError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let store = state
            .store
            .lock()
            .map_err(|_| StoreError::Io("store lock poisoned".to_string()))?;
        op(&store)
    })
    .await
    .map_err(|e| StoreError::Io(format!("store task failed: {}", e)))?
}
