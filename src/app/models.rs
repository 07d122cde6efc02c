//! Data models for GXA Fetcher
//!
//! This module defines the core data structures returned by the library:
//! validated experiment accessions, experiment metadata, and the parsed
//! analytics table that makes up the payload of an experiment record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ParseError, ParseResult};

/// Atlas experiment accession (e.g. `E-GEOD-10315`)
///
/// Accessions have the shape `E-XXXX-<digits>` where `XXXX` is four word
/// characters naming the submitting archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Accession(String);

impl Accession {
    /// Parse and validate an accession string
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Accession` if the value is not of the form `E-XXXX-nnn`
    pub fn parse(value: &str) -> ParseResult<Self> {
        if Self::is_valid(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ParseError::Accession {
                value: value.to_string(),
            })
        }
    }

    /// Check whether a string is a well-formed accession
    pub fn is_valid(value: &str) -> bool {
        let Some(rest) = value.strip_prefix("E-") else {
            return false;
        };
        let Some((archive, number)) = rest.split_once('-') else {
            return false;
        };

        archive.chars().count() == 4
            && archive.chars().all(|c| c.is_alphanumeric() || c == '_')
            && !number.is_empty()
            && number.chars().all(|c| c.is_ascii_digit())
    }

    /// The accession as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the analytics file for a given array design, or the
    /// design-independent name when `array_design` is `None`
    pub fn analytics_file_name(&self, array_design: Option<&str>) -> String {
        use crate::constants::files::ANALYTICS_SUFFIX;
        match array_design {
            Some(design) => format!("{}_{}{}", self.0, design, ANALYTICS_SUFFIX),
            None => format!("{}{}", self.0, ANALYTICS_SUFFIX),
        }
    }

    /// Name of the experiment configuration file
    pub fn configuration_file_name(&self) -> String {
        format!("{}{}", self.0, crate::constants::files::CONFIGURATION_SUFFIX)
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Accession {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Accession {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Accession> for String {
    fn from(accession: Accession) -> Self {
        accession.0
    }
}

impl AsRef<str> for Accession {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Descriptive metadata for one experiment, as reported by the Atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// Experiment accession
    pub accession: Accession,
    /// Experiment title
    pub title: String,
    /// Free-text description, when the service provides one
    pub description: Option<String>,
    /// Organisms studied
    pub species: Vec<String>,
    /// Experiment types (e.g. "transcription profiling by array")
    pub experiment_types: Vec<String>,
    /// Array design accessions, empty for sequencing experiments
    pub array_designs: Vec<String>,
    /// Public release date as reported by the service
    pub release_date: Option<String>,
}

/// Condensed view of a search hit, sortable by species, type and accession
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub species: String,
    pub experiment_type: String,
    pub accession: Accession,
    pub title: String,
}

impl ExperimentSummary {
    /// Sort summaries by species, then experiment type, then accession
    pub fn sort_condensed(summaries: &mut [ExperimentSummary]) {
        summaries.sort_by(|a, b| {
            a.species
                .cmp(&b.species)
                .then_with(|| a.experiment_type.cmp(&b.experiment_type))
                .then_with(|| a.accession.cmp(&b.accession))
        });
    }
}

impl From<&ExperimentMetadata> for ExperimentSummary {
    fn from(metadata: &ExperimentMetadata) -> Self {
        Self {
            species: metadata.species.join(", "),
            experiment_type: metadata.experiment_types.join(", "),
            accession: metadata.accession.clone(),
            title: metadata.title.clone(),
        }
    }
}

/// A pairwise comparison between two assay groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contrast {
    /// Contrast identifier used in TSV headers (e.g. `g1_g2`)
    pub id: String,
    /// Human-readable comparison name, or the id when none is known
    pub name: String,
}

impl Contrast {
    /// Whether `id` has the `g<digits>_g<digits>` shape of an assay group pair
    pub fn is_contrast_id(id: &str) -> bool {
        let group = |part: &str| {
            part.strip_prefix('g')
                .map_or(false, |n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        };
        matches!(id.split_once('_'), Some((reference, test)) if group(reference) && group(test))
    }

    /// Split a `<contrast id>.<statistic>` column header
    ///
    /// Headers whose prefix is not a contrast id (e.g. `Source.db`) are not
    /// contrast columns and yield `None`.
    pub fn split_header(header: &str) -> Option<(&str, &str)> {
        let (id, statistic) = header.split_once('.')?;
        (Self::is_contrast_id(id) && !statistic.is_empty()).then_some((id, statistic))
    }
}

/// Statistics for one gene under one contrast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastStatistics {
    /// Comparison label (the contrast name)
    pub comparison: String,
    pub p_value: Option<f64>,
    pub log2_fold_change: Option<f64>,
    pub t_statistic: Option<f64>,
    /// Any other per-contrast statistic columns, keyed by statistic name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Option<f64>>,
}

/// One data row of an analytics TSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    pub gene_id: String,
    pub gene_name: String,
    /// Probe identifier, present for microarray experiments only
    pub design_element: Option<String>,
    /// Gene-level columns beyond the identifiers, keyed by header
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// One entry per contrast, in the table's contrast order
    pub statistics: Vec<ContrastStatistics>,
}

impl AnalyticsRow {
    /// Statistics for the named comparison
    pub fn comparison(&self, name: &str) -> Option<&ContrastStatistics> {
        self.statistics.iter().find(|s| s.comparison == name)
    }
}

/// Parsed contents of an experiment's `*-analytics.tsv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsTable {
    /// Analytics file the table was parsed from
    pub file_name: String,
    /// Contrasts in column order
    pub contrasts: Vec<Contrast>,
    /// Data rows in file order
    pub rows: Vec<AnalyticsRow>,
    /// Raw column headers as they appeared in the file
    pub raw_headers: Vec<String>,
}

impl AnalyticsTable {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers with contrast ids replaced by comparison names
    ///
    /// `g1_g2.p-value` becomes `'treated' vs 'control'.p-value` when the
    /// contrast `g1_g2` is named; other headers are returned unchanged.
    pub fn headers(&self) -> Vec<String> {
        self.raw_headers
            .iter()
            .map(|header| {
                Contrast::split_header(header)
                    .and_then(|(id, statistic)| {
                        self.contrasts
                            .iter()
                            .find(|c| c.id == id)
                            .map(|c| format!("{}.{}", c.name, statistic))
                    })
                    .unwrap_or_else(|| header.clone())
            })
            .collect()
    }

    /// Comparison names in column order
    pub fn comparison_names(&self) -> Vec<&str> {
        self.contrasts.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A fetched experiment: metadata plus its analytics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub metadata: ExperimentMetadata,
    pub analytics: AnalyticsTable,
}

impl ExperimentRecord {
    pub fn accession(&self) -> &Accession {
        &self.metadata.accession
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }
}
