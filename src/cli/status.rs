//! Status command implementation

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(server: Option<&str>, config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "vulnop Configuration Status".bold());

    let config_result = Config::load_at(config_path);

    match config_result {
        Ok(config) => {
            let path = Config::resolve_path(config_path)?;
            println!("Config file: {}", path.display().to_string().cyan());

            match config.server_url {
                Some(ref url) => println!("{} Scan service: {}", "✓".green(), url),
                None => {
                    println!("{} Scan service URL not configured", "✗".red());
                    println!("  → Run 'vulnop init' to configure");
                }
            }

            // Runtime override wins over whatever the file says
            if let Some(url) = server {
                println!("{} Override in effect: {}", "○".dimmed(), url.cyan());
            }

            println!();
            println!("Serve settings:");
            println!("  Port:      {}", config.serve.port);
            println!("  Database:  {}", config.serve.database_path);
            println!("  Clone dir: {}", config.serve.clone_dir);
        }
        Err(_) => {
            println!("{} No configuration found", "✗".red());
            println!("  → Run 'vulnop init' to set up");
            if let Some(url) = server {
                println!(
                    "{} Using scan service from flags/env: {}",
                    "○".dimmed(),
                    url.cyan()
                );
            }
        }
    }

    Ok(())
}
