//! Gene Expression Atlas client
//!
//! `AtlasClient` exposes the two library operations, experiment search and
//! experiment fetch, over an injected [`Transport`]. Requests are issued one
//! at a time and awaited in order.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and endpoint layout
//! - `http`: the `Transport` seam and its reqwest implementation
//! - `fixture`: an in-memory transport for tests
//! - `fetch`: the per-experiment fetch pipeline

use tracing::info;

use crate::app::models::{Accession, ExperimentMetadata, ExperimentRecord};
use crate::app::search::parse_search_response;
use crate::errors::{FetchError, FetchResult, SearchResult, TransportResult};

pub mod config;
pub mod fetch;
pub mod fixture;
pub mod http;

pub use config::{AtlasEndpoints, ClientConfig};
pub use fixture::{FixtureResponse, FixtureTransport};
pub use http::{HttpTransport, Transport};

use fetch::ExperimentFetcher;

/// Client for the Gene Expression Atlas
#[derive(Debug)]
pub struct AtlasClient<T: Transport = HttpTransport> {
    transport: T,
    endpoints: AtlasEndpoints,
}

impl AtlasClient<HttpTransport> {
    /// Creates a client for the public EBI services with default settings
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if HTTP client creation fails
    pub fn new() -> TransportResult<Self> {
        Self::with_config(&ClientConfig::default(), AtlasEndpoints::default())
    }

    /// Creates a client with custom HTTP configuration and endpoints
    pub fn with_config(config: &ClientConfig, endpoints: AtlasEndpoints) -> TransportResult<Self> {
        let transport = HttpTransport::new(config)?;
        info!("Created Atlas client for {}", endpoints.search_url);
        Ok(Self::with_transport(transport, endpoints))
    }
}

impl<T: Transport> AtlasClient<T> {
    /// Creates a client over any transport
    pub fn with_transport(transport: T, endpoints: AtlasEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &AtlasEndpoints {
        &self.endpoints
    }

    /// Search for experiments and return their full metadata
    ///
    /// Terms are combined with OR; `species` is matched by the service
    /// case-insensitively. No matches yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::EmptyTerms` before any request when no term is
    /// given, `SearchError::Transport` when the request fails and
    /// `SearchError::Parse` when the body is malformed.
    pub async fn search_atlas_experiment_metadata<S: AsRef<str>>(
        &self,
        terms: &[S],
        species: Option<&str>,
    ) -> SearchResult<Vec<ExperimentMetadata>> {
        let url = self.endpoints.search(terms, species)?;
        info!("Searching Atlas experiments: {}", url);

        let body = self.transport.get_text(&url).await?;
        let hits = parse_search_response(&body)?;

        info!("Search returned {} experiments", hits.len());
        Ok(hits)
    }

    /// Search for experiments and return their accessions in service order
    pub async fn search_atlas_experiments<S: AsRef<str>>(
        &self,
        terms: &[S],
        species: Option<&str>,
    ) -> SearchResult<Vec<Accession>> {
        Ok(self
            .search_atlas_experiment_metadata(terms, species)
            .await?
            .into_iter()
            .map(|m| m.accession)
            .collect())
    }

    /// Fetch one experiment's metadata and analytics table
    pub async fn get_atlas_experiment(&self, accession: &Accession) -> FetchResult<ExperimentRecord> {
        ExperimentFetcher::new(&self.transport, &self.endpoints)
            .fetch(accession)
            .await
    }

    /// Fetch experiments in order, stopping at the first failure
    ///
    /// The result has the same order and length as `accessions`. An empty
    /// input makes no requests.
    pub async fn get_atlas_experiments(
        &self,
        accessions: &[Accession],
    ) -> FetchResult<Vec<ExperimentRecord>> {
        let mut records = Vec::with_capacity(accessions.len());
        for accession in accessions {
            records.push(self.get_atlas_experiment(accession).await?);
        }
        Ok(records)
    }

    /// Validate raw identifiers, then fetch them as [`get_atlas_experiments`](Self::get_atlas_experiments) does
    ///
    /// Every identifier is validated before the first request, so a batch
    /// containing a malformed accession makes no requests at all.
    pub async fn get_atlas_experiments_by_id<S: AsRef<str>>(
        &self,
        identifiers: &[S],
    ) -> FetchResult<Vec<ExperimentRecord>> {
        let accessions = identifiers
            .iter()
            .map(|id| {
                Accession::parse(id.as_ref()).map_err(|_| FetchError::InvalidAccession {
                    accession: id.as_ref().to_string(),
                })
            })
            .collect::<FetchResult<Vec<_>>>()?;

        self.get_atlas_experiments(&accessions).await
    }
}

/// Search for experiment accessions matching `terms` and `species`
pub async fn search_atlas_experiments<T: Transport, S: AsRef<str>>(
    client: &AtlasClient<T>,
    terms: &[S],
    species: Option<&str>,
) -> SearchResult<Vec<Accession>> {
    client.search_atlas_experiments(terms, species).await
}

/// Fetch experiment records for `accessions`, in order
pub async fn get_atlas_experiments<T: Transport>(
    client: &AtlasClient<T>,
    accessions: &[Accession],
) -> FetchResult<Vec<ExperimentRecord>> {
    client.get_atlas_experiments(accessions).await
}
