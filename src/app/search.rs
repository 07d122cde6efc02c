//! Experiment search query building and response parsing
//!
//! The Atlas exposes its experiments through the ArrayExpress JSON (v3)
//! experiment resource. The same document shape is returned both for a
//! keyword search and for a single-accession lookup, so the parser here is
//! shared by the search and metadata stages.

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::app::models::{Accession, ExperimentMetadata};
use crate::errors::{ParseError, ParseResult, SearchError, SearchResult};

/// Build the search URL for a set of OR-combined terms and an optional species
///
/// Blank terms are ignored. The `gxa=true` flag restricts results to
/// experiments loaded into the Expression Atlas.
///
/// # Errors
///
/// Returns `SearchError::EmptyTerms` if no non-blank term is given
pub fn build_search_url<S: AsRef<str>>(
    base: &Url,
    terms: &[S],
    species: Option<&str>,
) -> SearchResult<Url> {
    let terms: Vec<&str> = terms
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() {
        return Err(SearchError::EmptyTerms);
    }

    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("gxa", "true");
        query.append_pair("keywords", &terms.join(" OR "));
        if let Some(species) = species.map(str::trim).filter(|s| !s.is_empty()) {
            query.append_pair("species", species);
        }
    }

    Ok(url)
}

/// Parse a search (or metadata) response body into experiment metadata
///
/// Hits are returned in service order. A response reporting zero
/// experiments yields an empty list.
///
/// # Errors
///
/// Returns `ParseError::Json` when the body does not match the expected
/// document shape, or `ParseError::Accession` when the service reports an
/// accession that is not well formed.
pub fn parse_search_response(body: &str) -> ParseResult<Vec<ExperimentMetadata>> {
    let envelope: SearchEnvelope = serde_json::from_str(body)?;

    envelope
        .experiments
        .experiment
        .into_iter()
        .map(ExperimentMetadata::try_from)
        .collect()
}

/// Parse a metadata response and pick the experiment matching `accession`
pub fn parse_metadata_response(
    body: &str,
    accession: &Accession,
) -> ParseResult<Option<ExperimentMetadata>> {
    Ok(parse_search_response(body)?
        .into_iter()
        .find(|m| &m.accession == accession))
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    experiments: ExperimentList,
}

#[derive(Debug, Deserialize)]
struct ExperimentList {
    #[serde(default, deserialize_with = "one_or_many")]
    experiment: Vec<RawExperiment>,
}

#[derive(Debug, Deserialize)]
struct RawExperiment {
    accession: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    releasedate: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    organism: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    experimenttype: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    arraydesign: Vec<RawArrayDesign>,
    #[serde(default, deserialize_with = "one_or_many")]
    description: Vec<RawDescription>,
}

#[derive(Debug, Deserialize)]
struct RawArrayDesign {
    accession: String,
}

#[derive(Debug, Deserialize)]
struct RawDescription {
    #[serde(default)]
    text: Option<serde_json::Value>,
}

impl TryFrom<RawExperiment> for ExperimentMetadata {
    type Error = ParseError;

    fn try_from(raw: RawExperiment) -> Result<Self, Self::Error> {
        let description: Vec<String> = raw
            .description
            .into_iter()
            .filter_map(|d| match d.text {
                Some(serde_json::Value::String(text)) => Some(text),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .filter(|text| !text.trim().is_empty())
            .collect();

        Ok(Self {
            accession: Accession::parse(&raw.accession)?,
            title: raw.name.unwrap_or_default(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.join("\n"))
            },
            species: raw.organism,
            experiment_types: raw.experimenttype,
            array_designs: raw.arraydesign.into_iter().map(|a| a.accession).collect(),
            release_date: raw.releasedate,
        })
    }
}

/// ArrayExpress emits a bare object where a one-element list is expected
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.ebi.ac.uk/arrayexpress/json/v3/experiments").unwrap()
    }

    #[test]
    fn test_search_url_joins_terms_with_or() {
        let url = build_search_url(&base(), &["diabetes", "obesity"], Some("homo sapiens"))
            .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("gxa".to_string(), "true".to_string()),
                ("keywords".to_string(), "diabetes OR obesity".to_string()),
                ("species".to_string(), "homo sapiens".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_url_without_species() {
        let url = build_search_url(&base(), &["asthma"], None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.ebi.ac.uk/arrayexpress/json/v3/experiments?gxa=true&keywords=asthma"
        );

        let url = build_search_url(&base(), &["asthma"], Some("  ")).unwrap();
        assert!(url.query_pairs().all(|(k, _)| k != "species"));
    }

    #[test]
    fn test_search_url_rejects_blank_terms() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            build_search_url(&base(), &empty, None),
            Err(SearchError::EmptyTerms)
        ));
        assert!(matches!(
            build_search_url(&base(), &["", "   "], None),
            Err(SearchError::EmptyTerms)
        ));
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "experiments": {
                "total": 2,
                "experiment": [
                    {
                        "accession": "E-GEOD-10315",
                        "name": "Diabetes study",
                        "releasedate": "2008-06-30",
                        "organism": ["Homo sapiens"],
                        "experimenttype": ["transcription profiling by array"],
                        "arraydesign": [{"accession": "A-AFFY-44", "name": "HG-U133_Plus_2"}],
                        "description": [{"id": null, "text": "Islets from donors."}]
                    },
                    {
                        "accession": "E-MTAB-5214",
                        "name": "Second study",
                        "organism": "Homo sapiens",
                        "experimenttype": "RNA-seq of coding RNA"
                    }
                ]
            }
        }"#;

        let hits = parse_search_response(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].accession.as_str(), "E-GEOD-10315");
        assert_eq!(hits[0].array_designs, vec!["A-AFFY-44"]);
        assert_eq!(hits[0].description.as_deref(), Some("Islets from donors."));
        assert_eq!(hits[1].species, vec!["Homo sapiens"]);
        assert_eq!(hits[1].experiment_types, vec!["RNA-seq of coding RNA"]);
        assert!(hits[1].array_designs.is_empty());
    }

    #[test]
    fn test_parse_single_object_and_zero_hits() {
        let single = r#"{"experiments": {"total": 1, "experiment": {"accession": "E-MTAB-1"}}}"#;
        let hits = parse_search_response(single).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "");

        let none = r#"{"experiments": {"total": 0}}"#;
        assert!(parse_search_response(none).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(matches!(
            parse_search_response("<html>oops</html>"),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse_search_response(r#"{"unexpected": true}"#),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse_search_response(r#"{"experiments": {"experiment": [{"accession": "GSE1"}]}}"#),
            Err(ParseError::Accession { .. })
        ));
    }

    #[test]
    fn test_parse_metadata_picks_matching_accession() {
        let body = r#"{"experiments": {"experiment": [
            {"accession": "E-MTAB-1", "name": "one"},
            {"accession": "E-MTAB-2", "name": "two"}
        ]}}"#;
        let wanted = Accession::parse("E-MTAB-2").unwrap();
        let found = parse_metadata_response(body, &wanted).unwrap().unwrap();
        assert_eq!(found.title, "two");

        let missing = Accession::parse("E-MTAB-3").unwrap();
        assert!(parse_metadata_response(body, &missing).unwrap().is_none());
    }
}
