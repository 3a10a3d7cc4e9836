//! vulnop CLI - companion for a repository vulnerability scan service

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod output;
mod server;
mod store;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let server = cli.server.as_deref();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => cli::init::run(server, config).await,
        Commands::Status => cli::status::run(server, config),
        Commands::Version => {
            println!("vulnop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Scan { repo, files } => {
            cli::scan::run(&repo, files.as_deref(), server, config).await
        }
        Commands::Query { severity, format } => {
            cli::query::run(&severity, format, server, config).await
        }
        Commands::Serve {
            port,
            database,
            clone_dir,
        } => cli::serve::run(port, database.as_deref(), clone_dir.as_deref(), config).await,
        Commands::Completion { shell } => cli::completions::run(shell),
    }
}
