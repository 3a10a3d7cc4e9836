//! Error types for the vulnop CLI and embedded server

use thiserror::Error;

/// Result type alias for vulnop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Request-flow errors for the scan and query actions.
///
/// `Validation` is raised before any network call is attempted; `Server`
/// carries the service's own `error` message from a non-2xx response;
/// `Transport` covers everything between sending the request and getting a
/// parseable body back.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ApiError::Transport("Failed to connect to scan service".to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `vulnop init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Scan service URL not configured. Run `vulnop init` or pass --server.")]
    MissingServerUrl,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Scan data storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_validation_message() {
        let err = ApiError::Validation(
            "Please enter a valid repo URL and at least one file.".to_string(),
        );
        assert!(err.to_string().contains("at least one file"));
    }

    #[test]
    fn test_api_error_server_prefixes_error() {
        let err = ApiError::Server("bad repo".to_string());
        assert_eq!(err.to_string(), "Error: bad repo");
    }

    #[test]
    fn test_api_error_transport() {
        let err = ApiError::Transport("Connection refused".to_string());
        assert!(err.to_string().contains("Connection refused"));
    }

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound;
        assert!(err.to_string().contains("vulnop init"));
    }

    #[test]
    fn test_config_error_missing_server_url() {
        let err = ConfigError::MissingServerUrl;
        assert!(err.to_string().contains("--server"));
    }

    #[test]
    fn test_error_from_api_error() {
        let api_err = ApiError::Server("boom".to_string());
        let err: Error = api_err.into();

        match err {
            Error::Api(ApiError::Server(_)) => (),
            _ => panic!("Expected Error::Api(ApiError::Server)"),
        }
    }

    #[test]
    fn test_error_from_store_error() {
        let store_err = StoreError::Io("disk full".to_string());
        let err: Error = store_err.into();

        match err {
            Error::Store(StoreError::Io(_)) => (),
            _ => panic!("Expected Error::Store(StoreError::Io)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
