//! GXA Fetcher CLI application
//!
//! Command-line interface for searching the Gene Expression Atlas and
//! fetching per-experiment differential analytics.

use std::process;

use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use gxa_fetcher::cli::{
    handle_config, handle_fetch, handle_search, Cli, Commands, ConfigAction, ConfigArgs,
};
use gxa_fetcher::config::AppConfig;
use gxa_fetcher::errors::{AppError, Result};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // `config init` may target a file that does not exist yet
    let initializing = matches!(
        cli.command,
        Commands::Config(ConfigArgs {
            action: ConfigAction::Init { .. }
        })
    );
    let config = match AppConfig::load(cli.global.config.clone()).await {
        Ok(config) => config,
        Err(_) if initializing => AppConfig::default(),
        Err(e) => return Err(e.into()),
    };
    if !initializing {
        config.validate()?;
    }

    init_logging(&cli, &config)?;

    info!("GXA Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Search(args) => {
            info!("Executing search command");
            handle_search(args, &config).await
        }
        Commands::Fetch(args) => {
            info!("Executing fetch command");
            handle_fetch(args, &config, cli.global.quiet).await
        }
        Commands::Config(args) => handle_config(args, &config, cli.global.config).await,
    }
}

/// Initialize logging from CLI verbosity flags, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let log_level = cli
        .log_level()
        .unwrap_or_else(|| config.logging.level.parse().unwrap_or(Level::WARN));

    let directive = format!("gxa_fetcher={}", log_level)
        .parse()
        .map_err(|e| AppError::generic(format!("Invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
    Ok(())
}
