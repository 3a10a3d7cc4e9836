//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};
pub use clap_complete::Shell;

pub mod completions;
pub mod init;
pub mod query;
pub mod scan;
pub mod serve;
pub mod status;

use crate::config::Config;
use crate::error::Result;

/// vulnop - companion CLI for a repository vulnerability scan service
#[derive(Parser, Debug)]
#[command(name = "vulnop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Scan service base URL, e.g. http://localhost:8080
    #[arg(long, global = true, env = "VULNOP_SERVER", hide_env = true)]
    pub server: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "VULNOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "VULNOP_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize vulnop configuration
    Init,

    /// Show configuration status
    Status,

    /// Display version information
    Version,

    /// Submit a repository for scanning
    #[command(after_help = "EXAMPLES:\n  \
        vulnop scan https://github.com/org/reports --files scan1.json\n  \
        vulnop scan https://github.com/org/reports --files \"scan1.json, scan2.json\"")]
    Scan {
        /// Repository URL to scan
        repo: String,

        /// Comma-delimited list of report file names inside the repository
        #[arg(long, short = 'f')]
        files: Option<String>,
    },

    /// Query stored vulnerabilities by severity
    #[command(after_help = "EXAMPLES:\n  \
        vulnop query --severity high\n  \
        vulnop query --severity critical --format table")]
    Query {
        /// Severity level to filter on (e.g. low, medium, high, critical)
        #[arg(long, short = 's', default_value = "")]
        severity: String,

        /// Output format: json (verbatim response) or table
        #[arg(long, short = 'o', default_value = "json")]
        format: OutputFormat,
    },

    /// Run the scan service
    Serve {
        /// Port to listen on
        #[arg(long, short = 'p', env = "VULNOP_PORT", hide_env = true)]
        port: Option<u16>,

        /// SQLite database path
        #[arg(long, env = "VULNOP_DATABASE_PATH", hide_env = true)]
        database: Option<String>,

        /// Directory repositories are cloned into
        #[arg(long, env = "VULNOP_CLONE_DIR", hide_env = true)]
        clone_dir: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The response body, pretty-printed verbatim
    Json,
    /// Parsed vulnerability records as a table
    Table,
}

/// Resolve the scan service URL from the --server flag or the config file.
///
/// The config file is only touched when no override is given, so `--server`
/// works without any configuration present.
pub fn resolve_server(server: Option<&str>, config_path: Option<&str>) -> Result<String> {
    match server {
        Some(url) => Ok(url.trim_end_matches('/').to_string()),
        None => Config::load_at(config_path)?.resolve_server_url(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_server_flag_wins_without_config() {
        // A config path that does not exist must not matter when --server is set
        let url = resolve_server(Some("http://localhost:9/"), Some("/nonexistent/config.yaml"))
            .unwrap();
        assert_eq!(url, "http://localhost:9");
    }

    #[test]
    fn test_resolve_server_missing_config_errors() {
        let result = resolve_server(None, Some("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
