//! Command-line argument parsing for GXA Fetcher
//!
//! This module defines the CLI structure using clap derive macros: searching
//! the Atlas, fetching experiment analytics, and managing the configuration
//! file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::Accession;

/// GXA Fetcher - Query the Gene Expression Atlas
#[derive(Parser, Debug)]
#[command(
    name = "gxa_fetcher",
    version,
    about = "Search the EMBL-EBI Gene Expression Atlas and fetch differential analytics",
    long_about = "Searches Gene Expression Atlas experiments by keyword and species, and fetches
each experiment's metadata and differential-expression analytics as structured records."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for experiment accessions
    Search(SearchArgs),

    /// Fetch metadata and analytics for experiments
    Fetch(FetchArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Output rendering for search and fetch results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

/// Arguments for the search command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search terms, combined with OR
    #[arg(required = true, value_name = "TERMS")]
    pub terms: Vec<String>,

    /// Restrict results to a species (e.g. "homo sapiens")
    #[arg(short, long)]
    pub species: Option<String>,

    /// Show species, experiment type and title for each hit
    #[arg(long)]
    pub summary: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Experiment accessions (e.g. E-GEOD-10315)
    #[arg(required = true, value_name = "ACCESSIONS")]
    pub accessions: Vec<String>,

    /// Write one `<accession>.json` per experiment into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the default configuration file location
    Path,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level requested by flags, if any
    ///
    /// `None` means no flag was given and the configured level applies.
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl SearchArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.terms.iter().all(|t| t.trim().is_empty()) {
            return Err("At least one non-blank search term is required".to_string());
        }
        Ok(())
    }
}

impl FetchArgs {
    /// Parse every accession up front so a typo fails before any request
    pub fn validate(&self) -> Result<Vec<Accession>, String> {
        self.accessions
            .iter()
            .map(|value| {
                Accession::parse(value).map_err(|_| {
                    format!(
                        "'{}' is not an experiment accession (expected e.g. E-GEOD-10315)",
                        value
                    )
                })
            })
            .collect()
    }
}
