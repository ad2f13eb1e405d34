//! Raw and validated ingestion rows
//!
//! [`SourceRow`] is what the CSV layouts produce: loosely typed, every field
//! optional. [`AuthorshipRecord`] is the validated paper-authorship edge the
//! normalizer consumes; a row that cannot become one is rejected with a
//! [`RejectReason`] and never reaches the record model.

use crate::identity::clean_text;
use serde::Serialize;
use thiserror::Error;

/// One paper-authorship edge as read from the source, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line number in the uploaded file
    pub line: usize,
    pub title: Option<String>,
    pub year: Option<String>,
    pub source: Option<String>,
    pub cited_by: Option<String>,
    pub doi: Option<String>,
    pub link: Option<String>,
    pub eid: Option<String>,
    pub document_type: Option<String>,
    pub author_name: Option<String>,
    pub author_id: Option<String>,
    pub affiliation: Option<String>,
    pub country: Option<String>,
}

/// Why a row was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("missing title")]
    MissingTitle,

    #[error("missing year")]
    MissingYear,

    #[error("unparseable year {0:?}")]
    InvalidYear(String),

    #[error("year {year} outside accepted range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("missing author name")]
    MissingAuthor,

    #[error("missing affiliation")]
    MissingAffiliation,

    #[error("missing country")]
    MissingCountry,

    #[error("unknown country {0:?}")]
    UnknownCountry(String),

    #[error("unreadable record: {0}")]
    Unreadable(String),
}

/// A skipped row, reported back to the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub line: usize,
    pub reason: String,
}

impl RowWarning {
    pub fn new(line: usize, reason: &RejectReason) -> Self {
        Self {
            line,
            reason: reason.to_string(),
        }
    }
}

/// Inclusive publication-year bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// A validated paper-authorship edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorshipRecord {
    pub line: usize,
    pub title: String,
    pub year: i32,
    pub source: String,
    pub cited_by: u32,
    pub doi: String,
    pub link: String,
    pub eid: Option<String>,
    pub document_type: Option<String>,
    pub author_name: String,
    pub author_source_id: Option<String>,
    pub affiliation: String,
    pub country: String,
}

/// Cleaned, non-empty field value
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v)).filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
}

/// Integers exported by spreadsheet tools often arrive as `2024.0`
fn parse_whole_number(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

fn parse_year(raw: &str) -> Result<i32, RejectReason> {
    parse_whole_number(raw)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| RejectReason::InvalidYear(raw.to_string()))
}

/// Unparseable or negative citation counts read as zero
fn parse_citations(raw: Option<&str>) -> u32 {
    raw.and_then(parse_whole_number)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

impl AuthorshipRecord {
    /// Validate a source row, rejecting it on the first missing or
    /// out-of-range required field.
    pub fn validate(row: SourceRow, bounds: YearBounds) -> Result<Self, RejectReason> {
        let title = present(row.title).ok_or(RejectReason::MissingTitle)?;

        let raw_year = present(row.year).ok_or(RejectReason::MissingYear)?;
        let year = parse_year(&raw_year)?;
        if !bounds.contains(year) {
            return Err(RejectReason::YearOutOfRange {
                year,
                min: bounds.min,
                max: bounds.max,
            });
        }

        let author_name = present(row.author_name).ok_or(RejectReason::MissingAuthor)?;
        let affiliation = present(row.affiliation).ok_or(RejectReason::MissingAffiliation)?;
        let country = present(row.country).ok_or(RejectReason::MissingCountry)?;
        let cited_by = parse_citations(present(row.cited_by).as_deref());

        Ok(Self {
            line: row.line,
            title,
            year,
            source: present(row.source).unwrap_or_default(),
            cited_by,
            doi: present(row.doi).unwrap_or_default(),
            link: present(row.link).unwrap_or_default(),
            eid: present(row.eid),
            document_type: present(row.document_type),
            author_name,
            author_source_id: present(row.author_id),
            affiliation,
            country,
        })
    }
}
