//! Analytics TSV parsing
//!
//! Differential experiments publish one `*-analytics.tsv` per experiment (or
//! per array design). The layout is:
//!
//! ```text
//! Gene ID  Gene Name  [Design Element]  g1_g2.p-value  g1_g2.t-statistic  g1_g2.log2foldchange  g1_g3.p-value ...
//! ```
//!
//! The leading columns identify the gene; statistic columns are
//! `<contrast id>.<statistic>` with ids shaped like `g1_g2`. Any other
//! column is kept verbatim as a gene-level annotation. Missing statistics
//! are written as `NA`.

use std::collections::{BTreeMap, HashMap};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::app::models::{AnalyticsRow, AnalyticsTable, Contrast, ContrastStatistics};
use crate::constants::{columns, files};
use crate::errors::{ParseError, ParseResult};

/// Contrast id to human-readable comparison name
pub type ContrastNames = HashMap<String, String>;

/// Column positions of one contrast's statistics
#[derive(Debug, Default)]
struct ContrastColumns {
    id: String,
    p_value: Option<usize>,
    log2_fold_change: Option<usize>,
    t_statistic: Option<usize>,
    extra: Vec<(String, usize)>,
}

/// Column layout resolved from the header row
#[derive(Debug)]
struct Layout {
    gene_id: usize,
    gene_name: usize,
    design_element: Option<usize>,
    annotations: Vec<(String, usize)>,
    contrasts: Vec<ContrastColumns>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> ParseResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| ParseError::MissingColumn {
                column: name.to_string(),
            })
        };

        let gene_id = required(columns::GENE_ID)?;
        let gene_name = required(columns::GENE_NAME)?;
        let design_element = position(columns::DESIGN_ELEMENT);

        let mut annotations = Vec::new();
        let mut contrasts: Vec<ContrastColumns> = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            let header = header.trim();
            if [Some(gene_id), Some(gene_name), design_element].contains(&Some(index)) {
                continue;
            }

            let Some((id, statistic)) = Contrast::split_header(header) else {
                annotations.push((header.to_string(), index));
                continue;
            };

            let slot = match contrasts.iter().position(|c| c.id == id) {
                Some(existing) => existing,
                None => {
                    contrasts.push(ContrastColumns {
                        id: id.to_string(),
                        ..Default::default()
                    });
                    contrasts.len() - 1
                }
            };

            match statistic {
                columns::P_VALUE => contrasts[slot].p_value = Some(index),
                columns::LOG2_FOLD_CHANGE => contrasts[slot].log2_fold_change = Some(index),
                columns::T_STATISTIC => contrasts[slot].t_statistic = Some(index),
                other => contrasts[slot].extra.push((other.to_string(), index)),
            }
        }

        Ok(Self {
            gene_id,
            gene_name,
            design_element,
            annotations,
            contrasts,
        })
    }
}

/// Parse an analytics TSV body into an [`AnalyticsTable`]
///
/// Contrast ids found in `names` are given their comparison name; unknown
/// ids keep the id as their name. Rows keep file order and every data row
/// produces exactly one [`AnalyticsRow`].
///
/// # Errors
///
/// Returns `ParseError` if the header lacks the gene columns, a row has the
/// wrong number of fields, or a statistic is neither numeric nor `NA`.
pub fn parse_analytics(
    file_name: &str,
    body: &str,
    names: &ContrastNames,
) -> ParseResult<AnalyticsTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
        return Err(ParseError::EmptyAnalytics);
    }

    let layout = Layout::from_headers(&headers)?;
    let contrasts: Vec<Contrast> = layout
        .contrasts
        .iter()
        .map(|c| Contrast {
            id: c.id.clone(),
            name: names.get(&c.id).cloned().unwrap_or_else(|| c.id.clone()),
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() != headers.len() {
            return Err(ParseError::RowLength {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let cell = |index: usize| record.get(index).unwrap_or_default().trim();
        let statistic = |index: Option<usize>| match index {
            Some(index) => parse_statistic(cell(index), line, &headers[index]),
            None => Ok(None),
        };

        let mut statistics = Vec::with_capacity(contrasts.len());
        for (positions, contrast) in layout.contrasts.iter().zip(&contrasts) {
            let mut extra = BTreeMap::new();
            for (name, index) in &positions.extra {
                extra.insert(name.clone(), statistic(Some(*index))?);
            }

            statistics.push(ContrastStatistics {
                comparison: contrast.name.clone(),
                p_value: statistic(positions.p_value)?,
                log2_fold_change: statistic(positions.log2_fold_change)?,
                t_statistic: statistic(positions.t_statistic)?,
                extra,
            });
        }

        rows.push(AnalyticsRow {
            gene_id: cell(layout.gene_id).to_string(),
            gene_name: cell(layout.gene_name).to_string(),
            design_element: layout.design_element.map(|i| cell(i).to_string()),
            annotations: layout
                .annotations
                .iter()
                .map(|(header, index)| (header.clone(), cell(*index).to_string()))
                .collect(),
            statistics,
        });
    }

    debug!(
        "Parsed {}: {} rows, {} contrasts",
        file_name,
        rows.len(),
        contrasts.len()
    );

    Ok(AnalyticsTable {
        file_name: file_name.to_string(),
        contrasts,
        rows,
        raw_headers: headers.iter().map(|h| h.trim().to_string()).collect(),
    })
}

fn parse_statistic(value: &str, line: u64, column: &str) -> ParseResult<Option<f64>> {
    if value.is_empty() || value == files::MISSING_VALUE {
        return Ok(None);
    }

    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ParseError::InvalidNumber {
            line,
            column: column.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MICROARRAY: &str = "Gene ID\tGene Name\tDesign Element\tg1_g2.p-value\tg1_g2.t-statistic\tg1_g2.log2foldchange\n\
ENSG00000000003\tTSPAN6\t209108_at\t0.0123\t2.5\t-0.75\n\
ENSG00000000005\tTNMD\t220029_at\tNA\tNA\tNA\n";

    const RNASEQ: &str = "Gene ID\tGene Name\tg1_g2.p-value\tg1_g2.log2foldchange\tg1_g3.p-value\tg1_g3.log2foldchange\n\
ENSMUSG00000000001\tGnai3\t1e-05\t1.5\t0.5\t-0.1\n";

    fn names() -> ContrastNames {
        let mut names = ContrastNames::new();
        names.insert("g1_g2".to_string(), "'diabetic' vs 'normal'".to_string());
        names
    }

    #[test]
    fn test_parse_microarray_layout() {
        let table = parse_analytics("E-GEOD-1_A-AFFY-44-analytics.tsv", MICROARRAY, &names())
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.contrasts.len(), 1);
        assert_eq!(table.contrasts[0].name, "'diabetic' vs 'normal'");

        let first = &table.rows[0];
        assert_eq!(first.gene_id, "ENSG00000000003");
        assert_eq!(first.gene_name, "TSPAN6");
        assert_eq!(first.design_element.as_deref(), Some("209108_at"));
        assert_eq!(first.statistics[0].p_value, Some(0.0123));
        assert_eq!(first.statistics[0].t_statistic, Some(2.5));
        assert_eq!(first.statistics[0].log2_fold_change, Some(-0.75));

        let second = &table.rows[1];
        assert_eq!(second.statistics[0].p_value, None);
        assert_eq!(second.statistics[0].log2_fold_change, None);
    }

    #[test]
    fn test_parse_rnaseq_layout_with_unnamed_contrast() {
        let table = parse_analytics("E-MTAB-1-analytics.tsv", RNASEQ, &names()).unwrap();

        assert_eq!(table.comparison_names(), vec!["'diabetic' vs 'normal'", "g1_g3"]);
        let row = &table.rows[0];
        assert_eq!(row.design_element, None);
        assert_eq!(row.statistics[0].p_value, Some(1e-05));
        assert_eq!(row.statistics[1].log2_fold_change, Some(-0.1));
        assert_eq!(row.statistics[1].t_statistic, None);
        assert_eq!(
            row.comparison("g1_g3").and_then(|s| s.p_value),
            Some(0.5)
        );
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let table = parse_analytics(
            "x-analytics.tsv",
            "Gene ID\tGene Name\tg1_g2.p-value\n",
            &ContrastNames::new(),
        )
        .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.contrasts.len(), 1);
    }

    #[test]
    fn test_empty_body_is_rejected() {
        assert!(matches!(
            parse_analytics("x", "", &ContrastNames::new()),
            Err(ParseError::EmptyAnalytics)
        ));
    }

    #[test]
    fn test_missing_gene_column() {
        let err = parse_analytics("x", "Gene Name\tg1_g2.p-value\nA\t0.1\n", &ContrastNames::new())
            .unwrap_err();
        match err {
            ParseError::MissingColumn { column } => assert_eq!(column, "Gene ID"),
            other => panic!("Expected ParseError::MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row() {
        let body = "Gene ID\tGene Name\tg1_g2.p-value\nENSG1\tA\n";
        let err = parse_analytics("x", body, &ContrastNames::new()).unwrap_err();
        match err {
            ParseError::RowLength {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("Expected ParseError::RowLength, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number() {
        let body = "Gene ID\tGene Name\tg1_g2.p-value\nENSG1\tA\tlow\n";
        let err = parse_analytics("x", body, &ContrastNames::new()).unwrap_err();
        match err {
            ParseError::InvalidNumber { column, value, .. } => {
                assert_eq!(column, "g1_g2.p-value");
                assert_eq!(value, "low");
            }
            other => panic!("Expected ParseError::InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_statistics_are_kept() {
        let body = "Gene ID\tGene Name\tg1_g2.p-value\tg1_g2.log2foldchange\tg1_g2.mean-expression\n\
ENSG1\tA\t0.01\t1.5\t42.0\n\
ENSG2\tB\t0.2\t-0.3\tNA\n";
        let table = parse_analytics("x", body, &names()).unwrap();

        assert_eq!(table.contrasts.len(), 1);
        let first = &table.rows[0].statistics[0];
        assert_eq!(first.p_value, Some(0.01));
        assert_eq!(first.log2_fold_change, Some(1.5));
        assert_eq!(first.extra.get("mean-expression"), Some(&Some(42.0)));
        assert_eq!(
            table.rows[1].statistics[0].extra.get("mean-expression"),
            Some(&None)
        );
    }

    #[test]
    fn test_dotted_gene_columns_are_annotations() {
        let body = "Gene ID\tGene Name\tSource.db\tg1_g2.p-value\n\
ENSG1\tA\tensembl\t0.5\n";
        let table = parse_analytics("x", body, &ContrastNames::new()).unwrap();

        assert_eq!(table.comparison_names(), vec!["g1_g2"]);
        let row = &table.rows[0];
        assert_eq!(row.annotations.get("Source.db").map(String::as_str), Some("ensembl"));
        assert_eq!(row.statistics.len(), 1);
        assert_eq!(row.statistics[0].p_value, Some(0.5));
        assert_eq!(table.headers()[2], "Source.db");
    }

    #[test]
    fn test_crlf_line_endings() {
        let body = "Gene ID\tGene Name\tg1_g2.p-value\r\nENSG1\tA\t0.25\r\n";
        let table = parse_analytics("x", body, &ContrastNames::new()).unwrap();
        assert_eq!(table.rows[0].statistics[0].p_value, Some(0.25));
        assert_eq!(table.raw_headers[2], "g1_g2.p-value");
    }
}
