//! Command handlers for GXA Fetcher CLI
//!
//! This module implements the command handlers that connect CLI arguments
//! to the Atlas client and render its results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::{AtlasClient, ExperimentRecord, ExperimentSummary};
use crate::cli::{ConfigAction, ConfigArgs, FetchArgs, OutputFormat, SearchArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Build the HTTP-backed client described by the configuration
fn build_client(config: &AppConfig) -> Result<AtlasClient> {
    let endpoints = config.endpoints()?;
    Ok(AtlasClient::with_config(&config.client_config(), endpoints)?)
}

/// Handle the search command
pub async fn handle_search(args: SearchArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;
    let client = build_client(config)?;

    info!(
        "Searching for {:?} (species: {})",
        args.terms,
        args.species.as_deref().unwrap_or("any")
    );

    let hits = client
        .search_atlas_experiment_metadata(&args.terms, args.species.as_deref())
        .await?;

    let output = if args.summary {
        let mut summaries: Vec<ExperimentSummary> =
            hits.iter().map(ExperimentSummary::from).collect();
        ExperimentSummary::sort_condensed(&mut summaries);
        match args.format {
            OutputFormat::Text => render_summaries(&summaries),
            OutputFormat::Json => serde_json::to_string_pretty(&summaries)?,
        }
    } else {
        let accessions: Vec<&str> = hits.iter().map(|m| m.accession.as_str()).collect();
        match args.format {
            OutputFormat::Text => accessions.join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(&accessions)?,
        }
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Handle the fetch command
///
/// Experiments are fetched in order and the first failure aborts the
/// command; files are only written once every record has been fetched.
pub async fn handle_fetch(args: FetchArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let accessions = args.validate().map_err(AppError::generic)?;
    let client = build_client(config)?;
    let start_time = Instant::now();

    let spinner = create_spinner(quiet);
    let mut records = Vec::with_capacity(accessions.len());
    for (i, accession) in accessions.iter().enumerate() {
        if let Some(spinner) = &spinner {
            spinner.set_message(format!(
                "Fetching {} ({}/{})",
                accession,
                i + 1,
                accessions.len()
            ));
        }

        let record = match client.get_atlas_experiment(accession).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(spinner) = &spinner {
                    spinner.finish_and_clear();
                }
                return Err(e.into());
            }
        };
        records.push(record);
    }
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    info!(
        "Fetched {} experiments in {:?}",
        records.len(),
        start_time.elapsed()
    );

    if let Some(dir) = &args.output {
        let written = write_records(dir, &records).await?;
        if !quiet {
            eprintln!("Wrote {} files to {}", written.len(), dir.display());
        }
    }

    match args.format {
        OutputFormat::Text => {
            let text = render_records(&records);
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }

    Ok(())
}

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config: &AppConfig,
    path: Option<PathBuf>,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml());
        }
        ConfigAction::Init { force } => {
            let path = match path {
                Some(path) => path,
                None => AppConfig::default_config_path()?,
            };
            if AppConfig::write_default(&path, force).await? {
                println!("Created configuration file: {}", path.display());
            } else {
                println!(
                    "Configuration file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
        }
        ConfigAction::Path => {
            println!("{}", AppConfig::default_config_path()?.display());
        }
    }
    Ok(())
}

/// Spinner on stderr, only when it is a terminal and output is not quiet
fn create_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet || !atty::is(atty::Stream::Stderr) {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    Some(spinner)
}

/// Write each record to `<dir>/<accession>.json`, returning the paths written
async fn write_records(dir: &Path, records: &[ExperimentRecord]) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::with_capacity(records.len());
    for record in records {
        let path = dir.join(format!("{}.json", record.accession()));
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json).await?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn render_summaries(summaries: &[ExperimentSummary]) -> String {
    summaries
        .iter()
        .map(|s| {
            format!(
                "{}\t{}\t{}\t{}",
                s.accession, s.species, s.experiment_type, s.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_records(records: &[ExperimentRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let mut lines = vec![
                format!("{}  {}", record.accession(), record.title()),
                format!(
                    "  analytics: {} ({} rows)",
                    record.analytics.file_name,
                    record.analytics.len()
                ),
            ];
            for name in record.analytics.comparison_names() {
                lines.push(format!("  comparison: {}", name));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{
        Accession, AnalyticsRow, AnalyticsTable, Contrast, ContrastStatistics, ExperimentMetadata,
    };
    use tempfile::TempDir;

    fn record(accession: &str) -> ExperimentRecord {
        ExperimentRecord {
            metadata: ExperimentMetadata {
                accession: Accession::parse(accession).unwrap(),
                title: "Insulin resistance in muscle".to_string(),
                description: None,
                species: vec!["Homo sapiens".to_string()],
                experiment_types: vec!["transcription profiling by array".to_string()],
                array_designs: vec!["A-AFFY-44".to_string()],
                release_date: None,
            },
            analytics: AnalyticsTable {
                file_name: format!("{}_A-AFFY-44-analytics.tsv", accession),
                contrasts: vec![Contrast {
                    id: "g1_g2".to_string(),
                    name: "'type 2 diabetes' vs 'normal'".to_string(),
                }],
                rows: vec![AnalyticsRow {
                    gene_id: "ENSG00000141510".to_string(),
                    gene_name: "TP53".to_string(),
                    design_element: Some("201746_at".to_string()),
                    annotations: Default::default(),
                    statistics: vec![ContrastStatistics {
                        comparison: "'type 2 diabetes' vs 'normal'".to_string(),
                        p_value: Some(0.0123),
                        log2_fold_change: Some(-0.58),
                        t_statistic: None,
                        extra: Default::default(),
                    }],
                }],
                raw_headers: vec![],
            },
        }
    }

    #[test]
    fn test_render_records() {
        let text = render_records(&[record("E-GEOD-10315")]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "E-GEOD-10315  Insulin resistance in muscle");
        assert_eq!(
            lines[1],
            "  analytics: E-GEOD-10315_A-AFFY-44-analytics.tsv (1 rows)"
        );
        assert_eq!(lines[2], "  comparison: 'type 2 diabetes' vs 'normal'");
        assert!(render_records(&[]).is_empty());
    }

    #[test]
    fn test_render_summaries() {
        let summary = ExperimentSummary::from(&record("E-GEOD-10315").metadata);
        assert_eq!(
            render_summaries(&[summary]),
            "E-GEOD-10315\tHomo sapiens\ttranscription profiling by array\tInsulin resistance in muscle"
        );
    }

    #[tokio::test]
    async fn test_write_records() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested");
        let records = vec![record("E-GEOD-10315"), record("E-MTAB-513")];

        let written = write_records(&out, &records).await.unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("E-MTAB-513.json"));

        let content = tokio::fs::read_to_string(&written[0]).await.unwrap();
        let parsed: ExperimentRecord = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.accession().as_str(), "E-GEOD-10315");
        assert_eq!(parsed.analytics.rows[0].gene_name, "TP53");
    }

    #[test]
    fn test_spinner_disabled_when_quiet() {
        assert!(create_spinner(true).is_none());
    }
}
