//! Experiment configuration XML
//!
//! Each Atlas experiment ships an `<accession>-configuration.xml` describing
//! its assay groups and contrasts. Only the contrast names are needed here,
//! to turn `g1_g2` style ids in the analytics headers into readable labels:
//!
//! ```text
//! <configuration experimentType="microarray_1colour_mrna_differential">
//!   <analytics>
//!     <contrasts>
//!       <contrast id="g1_g2">
//!         <name>'type 2 diabetes' vs 'normal'</name>
//!         ...
//! ```
//!
//! The document is small and element names are lower case, so the lenient
//! `scraper` tree is enough to walk it. That tree does not close XML
//! self-closing tags, so an empty `<name/>` swallows its siblings; names are
//! therefore read from the element's own text nodes only.

use scraper::{Html, Selector};

use crate::app::analytics::ContrastNames;
use crate::errors::{ParseError, ParseResult};

const CONTRAST_SELECTOR: &str = "contrast";
const NAME_SELECTOR: &str = "name";

fn selector(source: &str) -> ParseResult<Selector> {
    Selector::parse(source).map_err(|_| ParseError::InvalidSelector {
        selector: source.to_string(),
    })
}

/// Extract the contrast id to comparison name table from a configuration document
///
/// Contrasts from every `<analytics>` block are collected; a contrast
/// without an id or a non-empty name is skipped.
pub fn parse_contrast_names(xml: &str) -> ParseResult<ContrastNames> {
    let document = Html::parse_document(xml);
    let contrast_selector = selector(CONTRAST_SELECTOR)?;
    let name_selector = selector(NAME_SELECTOR)?;

    let mut names = ContrastNames::new();
    for contrast in document.select(&contrast_selector) {
        let Some(id) = contrast.value().attr("id") else {
            continue;
        };

        let name = contrast
            .select(&name_selector)
            .next()
            .map(|element| {
                element
                    .children()
                    .filter_map(|child| child.value().as_text())
                    .map(|text| &**text)
                    .collect::<String>()
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        if let Some(name) = name {
            names.insert(id.to_string(), name);
        }
    }

    tracing::debug!("Resolved {} contrast names", names.len());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIGURATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<configuration experimentType="microarray_1colour_mrna_differential" r_data="1">
    <analytics>
        <array_design>A-AFFY-44</array_design>
        <assay_groups>
            <assay_group id="g1" label="normal">
                <assay>GSM260965</assay>
            </assay_group>
            <assay_group id="g2" label="type 2 diabetes">
                <assay>GSM260966</assay>
            </assay_group>
        </assay_groups>
        <contrasts>
            <contrast id="g1_g2">
                <name>'type 2 diabetes' vs 'normal'</name>
                <reference_assay_group>g1</reference_assay_group>
                <test_assay_group>g2</test_assay_group>
            </contrast>
            <contrast id="g1_g3">
                <name>'impaired glucose tolerance' vs 'normal'</name>
                <reference_assay_group>g1</reference_assay_group>
                <test_assay_group>g3</test_assay_group>
            </contrast>
        </contrasts>
    </analytics>
</configuration>"#;

    #[test]
    fn test_parse_contrast_names() {
        let names = parse_contrast_names(CONFIGURATION).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names["g1_g2"], "'type 2 diabetes' vs 'normal'");
        assert_eq!(names["g1_g3"], "'impaired glucose tolerance' vs 'normal'");
    }

    #[test]
    fn test_multiple_analytics_blocks() {
        let xml = r#"<configuration>
            <analytics><contrasts><contrast id="g1_g2"><name>a vs b</name></contrast></contrasts></analytics>
            <analytics><contrasts><contrast id="g3_g4"><name>c vs d</name></contrast></contrasts></analytics>
        </configuration>"#;
        let names = parse_contrast_names(xml).unwrap();
        assert_eq!(names["g1_g2"], "a vs b");
        assert_eq!(names["g3_g4"], "c vs d");
    }

    #[test]
    fn test_escaped_names_and_incomplete_contrasts() {
        let xml = r#"<configuration><analytics><contrasts>
            <contrast id="g1_g2"><name>&apos;high fat&apos; vs &apos;chow&apos;</name></contrast>
            <contrast><name>no id</name></contrast>
            <contrast id="g5_g6"><name>  </name></contrast>
        </contrasts></analytics></configuration>"#;
        let names = parse_contrast_names(xml).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names["g1_g2"], "'high fat' vs 'chow'");
    }

    #[test]
    fn test_self_closing_name_is_skipped() {
        let xml = r#"<configuration><analytics><contrasts>
            <contrast id="g1_g2"><name/><reference_assay_group>g1</reference_assay_group><test_assay_group>g2</test_assay_group></contrast>
            <contrast id="g1_g3"><name>'obese' vs 'lean'</name></contrast>
        </contrasts></analytics></configuration>"#;
        let names = parse_contrast_names(xml).unwrap();
        assert!(!names.contains_key("g1_g2"));
        assert_eq!(names["g1_g3"], "'obese' vs 'lean'");
    }

    #[test]
    fn test_document_without_contrasts() {
        let names = parse_contrast_names("<configuration/>").unwrap();
        assert!(names.is_empty());
    }
}
