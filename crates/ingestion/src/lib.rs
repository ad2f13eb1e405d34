//! ScholarMap Ingestion
//!
//! Turns a tabular bibliographic export into a validated [`RecordModel`].
//! The pipeline is:
//! 1. Parse CSV bytes into loosely typed rows (edge or wide layout)
//! 2. Validate each row, skipping bad ones with a warning
//! 3. Normalize countries, universities, authors and papers into one tree
//!
//! Ingestion is pure: publishing the result is the caller's job.

pub mod errors;
pub mod geo;
pub mod identity;
pub mod normalizer;
pub mod parser;
pub mod record;

pub use errors::IngestionError;
pub use parser::Layout;
pub use record::RowWarning;

use record::YearBounds;
use scholarmap_common::{AppConfig, RecordModel};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

/// Limits applied to one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionOptions {
    pub min_year: i32,
    pub max_year: i32,
    pub max_rows: usize,
}

impl IngestionOptions {
    /// Options derived from configuration, relative to `current_year`
    pub fn from_config(config: &AppConfig, current_year: i32) -> Self {
        Self {
            min_year: config.dataset.min_year,
            max_year: config.max_publication_year(current_year),
            max_rows: config.upload.max_rows,
        }
    }

    fn bounds(&self) -> YearBounds {
        YearBounds {
            min: self.min_year,
            max: self.max_year,
        }
    }
}

/// Summary of an ingestion run, returned to the uploader
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub layout: Layout,
    /// Data records in the file
    pub records: usize,
    /// Paper-authorship edges read from those records
    pub edges_read: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub warnings: Vec<RowWarning>,
    pub countries: usize,
    pub universities: usize,
    pub authors: usize,
    pub papers: usize,
}

/// A successfully ingested dataset
#[derive(Debug)]
pub struct Ingested {
    pub model: RecordModel,
    pub report: IngestionReport,
}

/// Parse, validate and normalize a CSV dataset
#[instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn ingest_csv(bytes: &[u8], options: &IngestionOptions) -> Result<Ingested, IngestionError> {
    let started = Instant::now();

    let parsed = parser::parse_csv(bytes, options.max_rows)?;
    let edges_read = parsed.rows.len();

    let normalized = normalizer::normalize(parsed.rows, options.bounds())?;
    let model = normalized.model;

    let mut warnings = parsed.skipped;
    warnings.extend(normalized.warnings);
    warnings.sort_by_key(|w| w.line);

    let report = IngestionReport {
        layout: parsed.layout,
        records: parsed.records,
        edges_read,
        accepted: normalized.accepted,
        rejected: warnings.len(),
        warnings,
        countries: model.country_count(),
        universities: model.university_count(),
        authors: model.author_count(),
        papers: model.paper_count(),
    };

    info!(
        layout = ?report.layout,
        accepted = report.accepted,
        rejected = report.rejected,
        papers = report.papers,
        authors = report.authors,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dataset ingested"
    );

    Ok(Ingested { model, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: IngestionOptions = IngestionOptions {
        min_year: 1900,
        max_year: 2026,
        max_rows: 100,
    };

    const EDGE_CSV: &str = "\
Title,Year,Source title,Cited by,DOI,Link,Author,Affiliation,Country
Net zero energy buildings,2025,Energy and Buildings,4,10.1/nzeb,https://x/1,Mohammad Reza Maghami,Asia Pacific University,Malaysia
Net zero energy buildings,2025,Energy and Buildings,4,10.1/nzeb,https://x/1,Ka Fei Thang,Asia Pacific University,Malaysia
Solar forecasting,2021,Applied Energy,9,10.1/solar,https://x/2,Wei Zhang,Tsinghua University,China
Old paper,1850,Nature,1,,,Someone,Somewhere,China
";

    #[test]
    fn test_ingest_edge_csv() {
        let ingested = ingest_csv(EDGE_CSV.as_bytes(), &OPTIONS).unwrap();
        let report = ingested.report;

        assert_eq!(report.layout, Layout::Edge);
        assert_eq!(report.records, 4);
        assert_eq!(report.edges_read, 4);
        assert_eq!(report.accepted, 3);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.warnings[0].line, 5);
        assert_eq!(report.countries, 2);
        assert_eq!(report.universities, 2);
        assert_eq!(report.authors, 3);
        assert_eq!(report.papers, 2);
    }

    #[test]
    fn test_badly_encoded_row_does_not_abort_ingestion() {
        let mut csv = b"Title,Year,Author,Affiliation,Country\nGood paper,2024,Ka Fei Thang,APU,Malaysia\n".to_vec();
        csv.extend_from_slice(b"Bad paper,2024,Jos\xE9 Garc\xEDa,Universidad,Spain\n");

        let report = ingest_csv(&csv, &OPTIONS).unwrap().report;
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.countries, 2);
        assert_eq!(report.papers, 2);
    }

    #[test]
    fn test_row_limit() {
        let options = IngestionOptions { max_rows: 2, ..OPTIONS };
        assert!(matches!(
            ingest_csv(EDGE_CSV.as_bytes(), &options),
            Err(IngestionError::TooManyRows { rows: 4, limit: 2 })
        ));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ingest_csv(EDGE_CSV.as_bytes(), &OPTIONS).unwrap().report;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["edgesRead"], 4);
        assert_eq!(json["layout"], "edge");
    }

    #[test]
    fn test_options_from_config() {
        let config = AppConfig::default();
        let options = IngestionOptions::from_config(&config, 2025);
        assert_eq!(options.min_year, 1900);
        assert_eq!(options.max_year, 2026);
        assert_eq!(options.max_rows, config.upload.max_rows);
    }
}
