//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Run the init command
pub async fn run(server: Option<&str>, config_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to vulnop!".bold().green());
    println!("Let's set up your scan service configuration.\n");

    // --server skips the prompt entirely
    let server_url: String = match server {
        Some(url) => url.to_string(),
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Scan service URL")
            .default("http://localhost:8080".to_string())
            .interact_text()?,
    };

    let server_url = server_url.trim().trim_end_matches('/').to_string();
    if server_url.is_empty() {
        return Err(ConfigError::Invalid("Server URL cannot be empty".to_string()).into());
    }

    // Preserve serve settings if a config already exists
    let mut config = Config::load_at(config_path).unwrap_or_default();
    config.server_url = Some(server_url.clone());
    config.save_at(config_path)?;

    let path = Config::resolve_path(config_path)?;
    println!(
        "\n{} Configuration saved to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    println!("Scan service: {}", server_url.bold());

    Ok(())
}
