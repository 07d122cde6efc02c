//! Command-line interface components
//!
//! This module contains CLI-specific code for the GXA Fetcher application:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, ConfigAction, ConfigArgs, FetchArgs, GlobalArgs, OutputFormat, SearchArgs,
};
pub use commands::{handle_config, handle_fetch, handle_search};
