//! Export projector
//!
//! Flattens a year-filtered slice of the hierarchy into spreadsheet rows.
//! Rows are ordered by country name, university name, author name, then
//! paper year descending, all case-insensitive, so the same dataset always
//! exports the same bytes.

use crate::slice::{name_order, slice_country, CountrySlice};
use scholarmap_common::model::RecordModel;
use scholarmap_common::{AppError, Result, YearFilter};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Papers,
    Authors,
    Universities,
    Countries,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Papers => "papers",
            ExportKind::Authors => "authors",
            ExportKind::Universities => "universities",
            ExportKind::Countries => "countries",
        }
    }

    fn headers(&self) -> &'static [&'static str] {
        match self {
            ExportKind::Papers => &[
                "Country",
                "University",
                "Author",
                "Title",
                "Year",
                "Source",
                "Cited By",
                "DOI",
                "Link",
                "Authors",
            ],
            ExportKind::Authors => &["Country", "University", "Author", "Affiliation", "Papers"],
            ExportKind::Universities => &["Country", "University", "Authors", "Papers"],
            ExportKind::Countries => &["Country", "Latitude", "Longitude", "Universities", "Authors", "Papers"],
        }
    }
}

impl FromStr for ExportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "papers" => Ok(ExportKind::Papers),
            "authors" => Ok(ExportKind::Authors),
            "universities" => Ok(ExportKind::Universities),
            "countries" => Ok(ExportKind::Countries),
            other => Err(AppError::Validation {
                message: format!(
                    "Unknown export kind '{}', expected papers, authors, universities or countries",
                    other
                ),
                field: Some("kind".to_string()),
            }),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A projected table, header first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub kind: ExportKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Suggested download name, e.g. `papers_2021-2025.csv`
    pub fn file_name(&self, filter: &YearFilter) -> String {
        format!("{}_{}.csv", self.kind, filter.label())
    }

    /// Serialize as CSV with a header row
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).map_err(csv_error)?;
        for row in &self.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.into_inner().map_err(|e| AppError::Internal {
            message: format!("Failed to flush CSV export: {}", e),
        })
    }
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal {
        message: format!("Failed to write CSV export: {}", e),
    }
}

/// Project the filtered model into rows of one kind
pub fn project(model: &RecordModel, kind: ExportKind, filter: &YearFilter) -> ExportTable {
    let mut slices: Vec<CountrySlice<'_>> = model
        .countries()
        .iter()
        .map(|c| slice_country(model, c, filter))
        .collect();
    sort_slices(&mut slices);

    let mut rows = Vec::new();
    for slice in &slices {
        let country = &slice.country.name;
        if kind == ExportKind::Countries {
            rows.push(vec![
                country.clone(),
                slice.country.lat.to_string(),
                slice.country.lng.to_string(),
                slice.universities.len().to_string(),
                slice.author_count().to_string(),
                slice.paper_count.to_string(),
            ]);
            continue;
        }

        for uni in &slice.universities {
            let university = &uni.university.name;
            if kind == ExportKind::Universities {
                rows.push(vec![
                    country.clone(),
                    university.clone(),
                    uni.author_count().to_string(),
                    uni.paper_count.to_string(),
                ]);
                continue;
            }

            for author in &uni.authors {
                let name = &author.author.name;
                if kind == ExportKind::Authors {
                    rows.push(vec![
                        country.clone(),
                        university.clone(),
                        name.clone(),
                        author.author.affiliation.clone(),
                        author.papers.len().to_string(),
                    ]);
                    continue;
                }

                // Author slices are already year descending, then title, then id
                for paper in &author.papers {
                    rows.push(vec![
                        country.clone(),
                        university.clone(),
                        name.clone(),
                        paper.title.clone(),
                        paper.year.to_string(),
                        paper.source.clone(),
                        paper.cited_by.to_string(),
                        paper.doi.clone(),
                        paper.link.clone(),
                        paper.authors.join("; "),
                    ]);
                }
            }
        }
    }

    ExportTable {
        kind,
        headers: kind.headers().iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

fn sort_slices(slices: &mut [CountrySlice<'_>]) {
    slices.sort_by(|a, b| name_order(&a.country.name, &a.country.id, &b.country.name, &b.country.id));
    for slice in slices.iter_mut() {
        slice.universities.sort_by(|a, b| {
            name_order(&a.university.name, &a.university.id, &b.university.name, &b.university.id)
        });
        for uni in slice.universities.iter_mut() {
            uni.authors
                .sort_by(|a, b| name_order(&a.author.name, &a.author.id, &b.author.name, &b.author.id));
        }
    }
}
