//! Repository ingest: clone, locate report files, parse them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

/// Clone attempts before giving up
const MAX_CLONE_ATTEMPTS: usize = 2;

/// Pause between clone attempts
const CLONE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Report files parsed at a time
const MAX_CONCURRENT_FILES: usize = 3;

/// Ingest failures
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to clone repository after {attempts} attempts")]
    Clone { attempts: usize },

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),
}

/// The directory a repository is cloned into before scanning.
///
/// One workspace serves one scan at a time; `reset` wipes whatever the
/// previous scan left behind.
pub struct RepoWorkspace {
    root: PathBuf,
}

impl RepoWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Delete and recreate the workspace directory
    pub async fn reset(&self) -> Result<(), IngestError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.root).await?;
        log::info!("Reset clone workspace at {}", self.root.display());
        Ok(())
    }

    /// Clone the repository into the workspace, retrying once on failure
    pub async fn clone_repo(&self, repo_url: &str) -> Result<(), IngestError> {
        for attempt in 1..=MAX_CLONE_ATTEMPTS {
            log::info!("Attempt {}: cloning {}", attempt, repo_url);
            let status = tokio::process::Command::new("git")
                .arg("clone")
                .arg(repo_url)
                .arg(&self.root)
                .status()
                .await;

            match status {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => log::warn!("Clone attempt {} exited with {}", attempt, status),
                Err(e) => log::warn!("Clone attempt {} failed to start git: {}", attempt, e),
            }

            if attempt < MAX_CLONE_ATTEMPTS {
                tokio::time::sleep(CLONE_RETRY_DELAY).await;
            }
        }

        Err(IngestError::Clone {
            attempts: MAX_CLONE_ATTEMPTS,
        })
    }

    /// All `*.json` files under the workspace
    pub fn json_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
            .map(|entry| entry.into_path())
            .collect()
    }
}

/// Pick the report files to ingest. An empty request means every JSON file
/// found; otherwise files are matched by basename, in the requested order.
pub fn select_files(found: Vec<PathBuf>, requested: &[String]) -> Vec<PathBuf> {
    if requested.is_empty() {
        return found;
    }

    let by_basename: HashMap<String, PathBuf> = found
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some((name, path))
        })
        .collect();

    requested
        .iter()
        .filter_map(|name| by_basename.get(name).cloned())
        .collect()
}

/// Read and parse the selected report files, a few at a time.
///
/// Each file holds a JSON array of scan report documents. Unreadable or
/// unparsable files are logged and dropped; the rest of the batch proceeds.
pub async fn load_scan_documents(paths: Vec<PathBuf>) -> Vec<Value> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FILES));
    let mut tasks: JoinSet<Vec<Value>> = JoinSet::new();

    for path in paths {
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                // Semaphore is never closed while tasks run
                Err(_) => return Vec::new(),
            };

            let started = std::time::Instant::now();
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Failed to read {}: {}", path.display(), e);
                    return Vec::new();
                }
            };

            match serde_json::from_slice::<Vec<Value>>(&bytes) {
                Ok(documents) => {
                    log::info!(
                        "Parsed {} ({} documents) in {:?}",
                        path.display(),
                        documents.len(),
                        started.elapsed()
                    );
                    documents
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    Vec::new()
                }
            }
        });
    }

    let mut documents = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(mut parsed) => documents.append(&mut parsed),
            Err(e) => log::warn!("Report parse task panicked: {}", e),
        }
    }
    documents
}
