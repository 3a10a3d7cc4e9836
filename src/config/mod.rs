//! Configuration management for vulnop

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default port the embedded service listens on
pub const DEFAULT_PORT: u16 = 8080;

/// Default SQLite database path for the embedded service
pub const DEFAULT_DATABASE_PATH: &str = "./data.db";

/// Default working directory scanned repositories are cloned into
pub const DEFAULT_CLONE_DIR: &str = "./cloned_repo";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the scan service, e.g. `http://localhost:8080`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Settings for the embedded service (`vulnop serve`)
    #[serde(default)]
    pub serve: ServeConfig,
}

/// Settings for the embedded scan service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory repositories are cloned into before scanning
    #[serde(default = "default_clone_dir")]
    pub clone_dir: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_clone_dir() -> String {
    DEFAULT_CLONE_DIR.to_string()
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_path: default_database_path(),
            clone_dir: default_clone_dir(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".vulnop").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path_override: Option<&str>) -> Result<PathBuf> {
        match path_override {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, honoring an optional path override
    pub fn load_at(path_override: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path_override)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration, honoring an optional path override
    pub fn save_at(&self, path_override: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path_override)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Config may hold private server URLs; keep it owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Resolve the scan service URL from an override, the config, or fail
    pub fn resolve_server_url(&self, url_override: Option<&str>) -> Result<String> {
        if let Some(url) = url_override {
            return Ok(url.trim_end_matches('/').to_string());
        }
        self.server_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .ok_or_else(|| ConfigError::MissingServerUrl.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.server_url.is_none());
        assert_eq!(config.serve.port, DEFAULT_PORT);
        assert_eq!(config.serve.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.serve.clone_dir, DEFAULT_CLONE_DIR);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = Config {
            server_url: Some("http://localhost:9999".to_string()),
            serve: ServeConfig {
                port: 9999,
                database_path: "/tmp/scans.db".to_string(),
                clone_dir: "/tmp/clones".to_string(),
            },
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(loaded.serve.port, 9999);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("nope.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_yaml_uses_serve_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server_url: http://example.test\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://example.test"));
        assert_eq!(config.serve.port, DEFAULT_PORT);
    }

    #[test]
    fn test_resolve_server_url_override_wins() {
        let config = Config {
            server_url: Some("http://from-config".to_string()),
            ..Default::default()
        };

        let url = config
            .resolve_server_url(Some("http://from-flag/"))
            .unwrap();
        assert_eq!(url, "http://from-flag");
    }

    #[test]
    fn test_resolve_server_url_missing() {
        let config = Config::default();
        assert!(config.resolve_server_url(None).is_err());
    }
}
