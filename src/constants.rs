//! Application constants for GXA Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable naming an explicit configuration file
    pub const CONFIG_FILE: &str = "GXA_FETCHER_CONFIG";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("GXA-Fetcher/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 4;
}

/// Request pacing
pub mod limits {
    /// Default request pacing for EBI services (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
}

/// EBI service URLs
pub mod atlas {
    /// ArrayExpress experiment search resource (JSON, v3)
    pub const SEARCH_URL: &str = "https://www.ebi.ac.uk/arrayexpress/json/v3/experiments";

    /// Per-experiment metadata resource; the accession is appended as a path segment
    pub const METADATA_URL: &str = "https://www.ebi.ac.uk/arrayexpress/json/v3/experiments";

    /// Atlas experiment file archive; files live under `<accession>/`
    pub const FILES_URL: &str =
        "https://ftp.ebi.ac.uk/pub/databases/microarray/data/atlas/experiments";
}

/// Atlas file naming
pub mod files {
    /// Suffix of the per-experiment differential statistics file
    pub const ANALYTICS_SUFFIX: &str = "-analytics.tsv";

    /// Suffix of the per-experiment configuration file
    pub const CONFIGURATION_SUFFIX: &str = "-configuration.xml";

    /// Cell value used by the Atlas for missing statistics
    pub const MISSING_VALUE: &str = "NA";
}

/// Analytics TSV column layout
pub mod columns {
    /// Gene identifier column
    pub const GENE_ID: &str = "Gene ID";

    /// Gene symbol column
    pub const GENE_NAME: &str = "Gene Name";

    /// Probe/design element column, microarray experiments only
    pub const DESIGN_ELEMENT: &str = "Design Element";

    /// Statistic suffix for adjusted p-values
    pub const P_VALUE: &str = "p-value";

    /// Statistic suffix for log2 fold change
    pub const LOG2_FOLD_CHANGE: &str = "log2foldchange";

    /// Statistic suffix for moderated t-statistics
    pub const T_STATISTIC: &str = "t-statistic";
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file name
    pub const LOCAL_FILE_NAME: &str = "gxa-fetcher.toml";

    /// Directory under the user configuration directory
    pub const APP_DIR_NAME: &str = "gxa-fetcher";

    /// File name inside the application configuration directory
    pub const FILE_NAME: &str = "config.toml";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use http::USER_AGENT;
pub use limits::DEFAULT_RATE_LIMIT_RPS;
