//! Serve command: run the embedded scan service

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::server;

/// Run the serve command. Flags override the config file; a missing config
/// file just means defaults.
pub async fn run(
    port: Option<u16>,
    database: Option<&str>,
    clone_dir: Option<&str>,
    config_path: Option<&str>,
) -> Result<()> {
    let mut serve_config = Config::load_at(config_path)
        .map(|c| c.serve)
        .unwrap_or_default();

    if let Some(port) = port {
        serve_config.port = port;
    }
    if let Some(database) = database {
        serve_config.database_path = database.to_string();
    }
    if let Some(clone_dir) = clone_dir {
        serve_config.clone_dir = clone_dir.to_string();
    }

    println!(
        "{} Starting scan service on port {} (db: {})",
        "✓".green(),
        serve_config.port.to_string().bold(),
        serve_config.database_path
    );

    server::run(&serve_config).await
}
