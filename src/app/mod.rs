//! Core library logic for GXA Fetcher
//!
//! This module contains the Atlas client, the data models it returns, and
//! the parsers for the three document types the Atlas serves: search JSON,
//! analytics TSV and configuration XML.
//!
//! # Examples
//!
//! ```rust,no_run
//! use gxa_fetcher::app::AtlasClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AtlasClient::new()?;
//!
//! let accessions = client
//!     .search_atlas_experiments(&["diabetes"], Some("homo sapiens"))
//!     .await?;
//!
//! for record in client.get_atlas_experiments(&accessions).await? {
//!     println!(
//!         "{}: {} genes, comparisons {:?}",
//!         record.accession(),
//!         record.analytics.len(),
//!         record.analytics.comparison_names()
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod client;
pub mod configuration;
pub mod models;
pub mod search;

// Re-export main public API
pub use analytics::{parse_analytics, ContrastNames};
pub use client::{
    get_atlas_experiments, search_atlas_experiments, AtlasClient, AtlasEndpoints, ClientConfig,
    FixtureResponse, FixtureTransport, HttpTransport, Transport,
};
pub use configuration::parse_contrast_names;
pub use models::{
    Accession, AnalyticsRow, AnalyticsTable, Contrast, ContrastStatistics, ExperimentMetadata,
    ExperimentRecord, ExperimentSummary,
};
pub use search::{build_search_url, parse_search_response};
