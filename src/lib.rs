//! GXA Fetcher Library
//!
//! A Rust client for the EMBL-EBI Gene Expression Atlas: search experiments
//! by keyword and species, then fetch each experiment's metadata and
//! differential-expression analytics as structured records.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
