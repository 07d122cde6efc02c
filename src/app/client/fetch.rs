//! Per-experiment fetch pipeline
//!
//! Metadata → analytics TSV → configuration XML → parsed record. The first
//! failure stops the pipeline and is reported with the accession and stage.

use tracing::{debug, info};

use crate::app::analytics::{parse_analytics, ContrastNames};
use crate::app::client::config::AtlasEndpoints;
use crate::app::client::http::Transport;
use crate::app::configuration::parse_contrast_names;
use crate::app::models::{Accession, ExperimentMetadata, ExperimentRecord};
use crate::app::search::parse_metadata_response;
use crate::errors::{FetchError, FetchResult};

/// Fetches and assembles one experiment record
pub struct ExperimentFetcher<'a, T: Transport> {
    transport: &'a T,
    endpoints: &'a AtlasEndpoints,
}

impl<'a, T: Transport> ExperimentFetcher<'a, T> {
    pub fn new(transport: &'a T, endpoints: &'a AtlasEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Run the full pipeline for one accession
    pub async fn fetch(&self, accession: &Accession) -> FetchResult<ExperimentRecord> {
        info!("Fetching experiment {}", accession);

        let metadata = self.fetch_metadata(accession).await?;
        let (file_name, body) = self.fetch_analytics(accession, &metadata).await?;
        let names = self.fetch_contrast_names(accession).await?;

        let analytics =
            parse_analytics(&file_name, &body, &names).map_err(|source| FetchError::Parse {
                accession: accession.to_string(),
                source,
            })?;

        info!(
            "Fetched {}: {} rows across {} contrasts",
            accession,
            analytics.len(),
            analytics.contrasts.len()
        );

        Ok(ExperimentRecord {
            metadata,
            analytics,
        })
    }

    async fn fetch_metadata(&self, accession: &Accession) -> FetchResult<ExperimentMetadata> {
        let url = self
            .endpoints
            .metadata(accession)
            .map_err(|source| FetchError::Metadata {
                accession: accession.to_string(),
                source,
            })?;

        let body = match self.transport.get_text(&url).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                return Err(FetchError::ExperimentNotFound {
                    accession: accession.to_string(),
                })
            }
            Err(source) => {
                return Err(FetchError::Metadata {
                    accession: accession.to_string(),
                    source,
                })
            }
        };

        parse_metadata_response(&body, accession)
            .map_err(|source| FetchError::Parse {
                accession: accession.to_string(),
                source,
            })?
            .ok_or_else(|| FetchError::ExperimentNotFound {
                accession: accession.to_string(),
            })
    }

    /// Candidate analytics file names, most specific first
    fn analytics_candidates(accession: &Accession, metadata: &ExperimentMetadata) -> Vec<String> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(design) = metadata.array_designs.first() {
            candidates.push(accession.analytics_file_name(Some(design)));
        }
        candidates.push(accession.analytics_file_name(None));
        candidates
    }

    /// Fetch the first analytics file that exists; only a 404 moves on to the next candidate
    async fn fetch_analytics(
        &self,
        accession: &Accession,
        metadata: &ExperimentMetadata,
    ) -> FetchResult<(String, String)> {
        let candidates = Self::analytics_candidates(accession, metadata);

        for file_name in &candidates {
            let url = self
                .endpoints
                .experiment_file(accession, file_name)
                .map_err(|source| FetchError::Analytics {
                    accession: accession.to_string(),
                    source,
                })?;

            match self.transport.get_text(&url).await {
                Ok(body) => {
                    debug!("Using analytics file {}", file_name);
                    return Ok((file_name.clone(), body));
                }
                Err(e) if e.is_not_found() => {
                    debug!("Analytics file {} not found", file_name);
                }
                Err(source) => {
                    return Err(FetchError::Analytics {
                        accession: accession.to_string(),
                        source,
                    })
                }
            }
        }

        Err(FetchError::MissingAnalytics {
            accession: accession.to_string(),
            tried: candidates,
        })
    }

    /// Contrast names from the configuration XML; a missing file is an error
    async fn fetch_contrast_names(&self, accession: &Accession) -> FetchResult<ContrastNames> {
        let file_name = accession.configuration_file_name();
        let url = self
            .endpoints
            .experiment_file(accession, &file_name)
            .map_err(|source| FetchError::Configuration {
                accession: accession.to_string(),
                source,
            })?;

        match self.transport.get_text(&url).await {
            Ok(xml) => parse_contrast_names(&xml).map_err(|source| FetchError::Parse {
                accession: accession.to_string(),
                source,
            }),
            Err(e) if e.is_not_found() => Err(FetchError::MissingConfiguration {
                accession: accession.to_string(),
                file_name,
            }),
            Err(source) => Err(FetchError::Configuration {
                accession: accession.to_string(),
                source,
            }),
        }
    }
}
