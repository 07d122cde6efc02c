//! HTTP client configuration and Atlas endpoint layout
//!
//! `ClientConfig` controls the reqwest client; `AtlasEndpoints` holds the
//! base URLs requests are built from so that mirrors or local test servers
//! can stand in for the EBI services.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::models::Accession;
use crate::app::search;
use crate::constants::{atlas, http, limits};
use crate::errors::{SearchResult, TransportError, TransportResult};

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// TCP keep-alive interval
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Request pacing (requests per second)
    pub rate_limit_rps: u32,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> TransportResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(TransportError::Http)
    }
}

/// Base URLs of the services the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasEndpoints {
    /// Experiment search resource
    pub search_url: Url,
    /// Experiment metadata resource; accessions are appended as a path segment
    pub metadata_url: Url,
    /// Experiment file archive; files live under `<accession>/`
    pub files_url: Url,
}

impl Default for AtlasEndpoints {
    fn default() -> Self {
        Self {
            search_url: Url::parse(atlas::SEARCH_URL).expect("Search URL should be valid"),
            metadata_url: Url::parse(atlas::METADATA_URL).expect("Metadata URL should be valid"),
            files_url: Url::parse(atlas::FILES_URL).expect("Files URL should be valid"),
        }
    }
}

impl AtlasEndpoints {
    /// Build endpoints from URL strings
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidUrl` for any string that is not an
    /// absolute URL that can carry path segments
    pub fn parse(search_url: &str, metadata_url: &str, files_url: &str) -> TransportResult<Self> {
        Ok(Self {
            search_url: parse_base_url(search_url)?,
            metadata_url: parse_base_url(metadata_url)?,
            files_url: parse_base_url(files_url)?,
        })
    }

    /// Endpoints rooted at a single server, laid out like the EBI services
    ///
    /// Used to point the client at a mirror or a local test server.
    pub fn with_root(root: &str) -> TransportResult<Self> {
        let root = root.trim_end_matches('/');
        Self::parse(
            &format!("{}/arrayexpress/json/v3/experiments", root),
            &format!("{}/arrayexpress/json/v3/experiments", root),
            &format!("{}/pub/databases/microarray/data/atlas/experiments", root),
        )
    }

    /// Search URL for OR-combined terms and an optional species
    pub fn search<S: AsRef<str>>(&self, terms: &[S], species: Option<&str>) -> SearchResult<Url> {
        search::build_search_url(&self.search_url, terms, species)
    }

    /// Metadata URL for one experiment
    pub fn metadata(&self, accession: &Accession) -> TransportResult<Url> {
        with_segments(&self.metadata_url, &[accession.as_str()])
    }

    /// URL of a file in an experiment's archive directory
    pub fn experiment_file(&self, accession: &Accession, file_name: &str) -> TransportResult<Url> {
        with_segments(&self.files_url, &[accession.as_str(), file_name])
    }
}

/// Parse a base URL that path segments can be appended to
pub fn parse_base_url(value: &str) -> TransportResult<Url> {
    let url = Url::parse(value).map_err(|e| TransportError::InvalidUrl {
        url: value.to_string(),
        error: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(TransportError::InvalidUrl {
            url: value.to_string(),
            error: "URL cannot carry path segments".to_string(),
        });
    }

    Ok(url)
}

fn with_segments(base: &Url, segments: &[&str]) -> TransportResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidUrl {
            url: base.to_string(),
            error: "URL cannot carry path segments".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
