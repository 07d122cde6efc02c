//! Error types for GXA Fetcher
//!
//! Errors are layered by stage: the transport that moves bytes, the parsers
//! that turn those bytes into models, and the two public operations (search
//! and fetch) that wrap both with enough context to tell the caller which
//! stage failed and, for fetches, which accession.

use std::path::PathBuf;

use thiserror::Error;

/// HTTP transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network-level failure (unreachable host, timeout, broken body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status other than 404
    #[error("Server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Server answered 404
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// A URL could not be built from the configured endpoints
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Request pacing quota must be non-zero
    #[error("Rate limit must be greater than zero requests per second")]
    InvalidRateLimit,
}

impl TransportError {
    /// True when the server reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound { .. })
    }
}

/// Response body parsing errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// JSON body did not match the expected shape
    #[error("Malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// TSV could not be tokenised
    #[error("Malformed analytics TSV: {0}")]
    Tsv(#[from] csv::Error),

    /// A required column is absent from the analytics header
    #[error("Analytics TSV is missing required column '{column}'")]
    MissingColumn { column: String },

    /// A statistic cell is neither a number nor NA
    #[error("Invalid number '{value}' in column '{column}' at line {line}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    /// A data row has a different number of cells than the header
    #[error("Row at line {line} has {found} fields, header has {expected}")]
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Analytics file has no header row
    #[error("Analytics TSV is empty")]
    EmptyAnalytics,

    /// A CSS selector used to read the configuration XML is invalid
    #[error("Invalid selector: {selector}")]
    InvalidSelector { selector: String },

    /// Accession string does not have the E-XXXX-nnn shape
    #[error("Invalid experiment accession: {value}")]
    Accession { value: String },
}

/// Search operation errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// At least one search term is required
    #[error("At least one search term is required")]
    EmptyTerms,

    /// The search request failed
    #[error("Search request failed: {0}")]
    Transport(#[from] TransportError),

    /// The search response could not be parsed
    #[error("Search response could not be parsed: {0}")]
    Parse(#[from] ParseError),
}

/// Stage of a fetch at which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Validation,
    Metadata,
    Analytics,
    Configuration,
    Parse,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchStage::Validation => "validation",
            FetchStage::Metadata => "metadata",
            FetchStage::Analytics => "analytics",
            FetchStage::Configuration => "configuration",
            FetchStage::Parse => "parse",
        };
        write!(f, "{}", name)
    }
}

/// Experiment fetch errors
///
/// Every variant carries the accession being processed when the batch stopped.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Accession failed validation; nothing was requested
    #[error("Invalid experiment accession: {accession}")]
    InvalidAccession { accession: String },

    /// Metadata endpoint knows no experiment with this accession
    #[error("Experiment {accession} not found in the Atlas")]
    ExperimentNotFound { accession: String },

    /// No analytics TSV exists (baseline studies have none)
    #[error("No analytics file available for {accession} (tried: {tried:?})")]
    MissingAnalytics {
        accession: String,
        tried: Vec<String>,
    },

    /// Metadata request failed
    #[error("Failed to fetch metadata for {accession}: {source}")]
    Metadata {
        accession: String,
        #[source]
        source: TransportError,
    },

    /// Analytics TSV request failed
    #[error("Failed to fetch analytics for {accession}: {source}")]
    Analytics {
        accession: String,
        #[source]
        source: TransportError,
    },

    /// The experiment has no configuration XML to name its contrasts
    #[error("No configuration file {file_name} for {accession}")]
    MissingConfiguration {
        accession: String,
        file_name: String,
    },

    /// Configuration XML request failed
    #[error("Failed to fetch configuration for {accession}: {source}")]
    Configuration {
        accession: String,
        #[source]
        source: TransportError,
    },

    /// Metadata or analytics body could not be parsed
    #[error("Failed to parse data for {accession}: {source}")]
    Parse {
        accession: String,
        #[source]
        source: ParseError,
    },
}

impl FetchError {
    /// Accession that was being processed
    pub fn accession(&self) -> &str {
        match self {
            FetchError::InvalidAccession { accession }
            | FetchError::ExperimentNotFound { accession }
            | FetchError::MissingAnalytics { accession, .. }
            | FetchError::Metadata { accession, .. }
            | FetchError::Analytics { accession, .. }
            | FetchError::MissingConfiguration { accession, .. }
            | FetchError::Configuration { accession, .. }
            | FetchError::Parse { accession, .. } => accession,
        }
    }

    /// Stage at which the fetch stopped
    pub fn stage(&self) -> FetchStage {
        match self {
            FetchError::InvalidAccession { .. } => FetchStage::Validation,
            FetchError::ExperimentNotFound { .. } | FetchError::Metadata { .. } => {
                FetchStage::Metadata
            }
            FetchError::MissingAnalytics { .. } | FetchError::Analytics { .. } => {
                FetchStage::Analytics
            }
            FetchError::MissingConfiguration { .. } | FetchError::Configuration { .. } => {
                FetchStage::Configuration
            }
            FetchError::Parse { .. } => FetchStage::Parse,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}: {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Could not determine the user configuration directory
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// I/O error while reading or writing a configuration file
    #[error("Configuration file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Search error
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Transport error outside of search or fetch (client construction)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output serialization error
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Search(_) => "search",
            AppError::Fetch(_) => "fetch",
            AppError::Transport(_) => "transport",
            AppError::Config(_) => "config",
            AppError::Serialize(_) => "serialize",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Transport result type alias
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Parse result type alias
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Search result type alias
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Config result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
