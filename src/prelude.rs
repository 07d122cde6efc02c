//! Prelude module for GXA Fetcher Library
//!
//! Re-exports the items most callers need, so a single
//! `use gxa_fetcher::prelude::*;` covers typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gxa_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = AtlasClient::new()?;
//!     let accessions = client
//!         .search_atlas_experiments(&["diabetes"], Some("homo sapiens"))
//!         .await?;
//!     let records = client.get_atlas_experiments(&accessions).await?;
//!     println!("fetched {} experiments", records.len());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, FetchError, Result, SearchError};

// Client and transports
pub use crate::app::{
    get_atlas_experiments, search_atlas_experiments, AtlasClient, AtlasEndpoints, ClientConfig,
    HttpTransport, Transport,
};

// Data types
pub use crate::app::{
    Accession, AnalyticsRow, AnalyticsTable, Contrast, ContrastStatistics, ExperimentMetadata,
    ExperimentRecord, ExperimentSummary,
};

pub use crate::config::AppConfig;
