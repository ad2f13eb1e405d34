//! CSV parsing
//!
//! Two layouts are understood:
//! - **Edge**: one row per paper-authorship edge (`Title`, `Year`, `Author`,
//!   `Affiliation`, `Country`, ...).
//! - **Wide**: the cleaned Scopus export with one row per paper and numbered
//!   `Author N`, `Author with Affiliation N`, `University N`, `Country N`
//!   columns. Each author is expanded into its own edge.
//!
//! Both produce [`SourceRow`]s; validation happens later.

use crate::errors::IngestionError;
use crate::identity::{clean_text, normalize_text, person_name_key};
use crate::record::{RejectReason, RowWarning, SourceRow};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use regex_lite::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Accepted header spellings, compared after normalization
const TITLE: &[&str] = &["title", "paper title"];
const YEAR: &[&str] = &["year", "publication year"];
const SOURCE: &[&str] = &["source title", "source", "venue", "journal"];
const CITED_BY: &[&str] = &["cited by", "citations", "citation count"];
const DOI: &[&str] = &["doi"];
const LINK: &[&str] = &["link", "url"];
const EID: &[&str] = &["eid"];
const DOCUMENT_TYPE: &[&str] = &["document type"];
const AUTHOR: &[&str] = &["author", "author name", "author full name"];
const AUTHOR_ID: &[&str] = &["author id", "author(s) id", "author scopus id"];
const AFFILIATION: &[&str] = &["affiliation", "university", "institution"];
const COUNTRY: &[&str] = &["country"];

/// Detected file layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Edge,
    Wide,
}

/// Output of [`parse_csv`]
#[derive(Debug)]
pub struct ParsedRows {
    pub layout: Layout,
    /// Data records in the file (papers for the wide layout)
    pub records: usize,
    pub rows: Vec<SourceRow>,
    /// Records the reader could not split into fields
    pub skipped: Vec<RowWarning>,
}

fn author_with_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*?)\s*\((\d+)\)\s*$").expect("static pattern"))
}

fn numbered_column_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(author|author with affiliation|author with affliliation|university|country) (\d+)$")
            .expect("static pattern")
    })
}

/// Parse CSV bytes into source rows.
///
/// Fails before producing any rows when the file holds more than
/// `max_records` data records or lacks required columns. Fields that are
/// not valid UTF-8 (Latin-1 exports) are decoded lossily; a record the
/// reader cannot split is skipped with a warning.
pub fn parse_csv(bytes: &[u8], max_records: usize) -> Result<ParsedRows, IngestionError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = decode(reader.byte_headers()?).iter().map(normalize_text).collect();

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (index, result) in reader.byte_records().enumerate() {
        // Header is line 1
        let fallback_line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(fallback_line);
                let reason = RejectReason::Unreadable(e.to_string());
                warn!(line, reason = %reason, "Row rejected");
                skipped.push(RowWarning::new(line, &reason));
                continue;
            }
        };
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(fallback_line);
        records.push((line, decode(&record)));
    }

    if records.len() > max_records {
        return Err(IngestionError::TooManyRows {
            rows: records.len(),
            limit: max_records,
        });
    }

    let layout = if headers.iter().any(|h| h == "author 1") {
        Layout::Wide
    } else {
        Layout::Edge
    };

    let rows: Vec<SourceRow> = match layout {
        Layout::Edge => {
            let columns = EdgeColumns::resolve(&headers)?;
            records
                .iter()
                .map(|(line, record)| columns.extract(*line, record))
                .collect()
        }
        Layout::Wide => {
            let columns = WideColumns::resolve(&headers)?;
            records
                .iter()
                .flat_map(|(line, record)| columns.expand(*line, record))
                .collect()
        }
    };

    debug!(?layout, records = records.len(), "CSV parsed");

    Ok(ParsedRows {
        layout,
        records: records.len(),
        rows,
        skipped,
    })
}

fn decode(record: &ByteRecord) -> StringRecord {
    record.iter().map(|field| String::from_utf8_lossy(field)).collect()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| aliases.contains(&h.as_str()))
}

fn field(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Column positions shared by both layouts
#[derive(Debug)]
struct PaperColumns {
    title: usize,
    year: usize,
    source: Option<usize>,
    cited_by: Option<usize>,
    doi: Option<usize>,
    link: Option<usize>,
    eid: Option<usize>,
    document_type: Option<usize>,
}

impl PaperColumns {
    fn resolve(headers: &[String], missing: &mut Vec<&'static str>) -> Option<Self> {
        let title = find_column(headers, TITLE);
        let year = find_column(headers, YEAR);
        if title.is_none() {
            missing.push("Title");
        }
        if year.is_none() {
            missing.push("Year");
        }

        Some(Self {
            title: title?,
            year: year?,
            source: find_column(headers, SOURCE),
            cited_by: find_column(headers, CITED_BY),
            doi: find_column(headers, DOI),
            link: find_column(headers, LINK),
            eid: find_column(headers, EID),
            document_type: find_column(headers, DOCUMENT_TYPE),
        })
    }

    fn paper_fields(&self, line: usize, record: &StringRecord) -> SourceRow {
        SourceRow {
            line,
            title: field(record, Some(self.title)),
            year: field(record, Some(self.year)),
            source: field(record, self.source),
            cited_by: field(record, self.cited_by),
            doi: field(record, self.doi),
            link: field(record, self.link),
            eid: field(record, self.eid),
            document_type: field(record, self.document_type),
            ..SourceRow::default()
        }
    }
}

/// Edge layout column positions
#[derive(Debug)]
struct EdgeColumns {
    paper: PaperColumns,
    author: usize,
    author_id: Option<usize>,
    affiliation: usize,
    country: usize,
}

impl EdgeColumns {
    fn resolve(headers: &[String]) -> Result<Self, IngestionError> {
        let mut missing = Vec::new();
        let paper = PaperColumns::resolve(headers, &mut missing);

        let author = find_column(headers, AUTHOR);
        let affiliation = find_column(headers, AFFILIATION);
        let country = find_column(headers, COUNTRY);
        for (name, column) in [("Author", author), ("Affiliation", affiliation), ("Country", country)] {
            if column.is_none() {
                missing.push(name);
            }
        }

        match (paper, author, affiliation, country) {
            (Some(paper), Some(author), Some(affiliation), Some(country)) => Ok(Self {
                paper,
                author,
                author_id: find_column(headers, AUTHOR_ID),
                affiliation,
                country,
            }),
            _ => Err(IngestionError::MissingColumns(missing.join(", "))),
        }
    }

    fn extract(&self, line: usize, record: &StringRecord) -> SourceRow {
        SourceRow {
            author_name: field(record, Some(self.author)),
            author_id: field(record, self.author_id),
            affiliation: field(record, Some(self.affiliation)),
            country: field(record, Some(self.country)),
            ..self.paper.paper_fields(line, record)
        }
    }
}

/// Wide layout column positions, keyed by the column number
#[derive(Debug)]
struct WideColumns {
    paper: PaperColumns,
    authors: BTreeMap<usize, usize>,
    affiliations: BTreeMap<usize, usize>,
    universities: BTreeMap<usize, usize>,
    countries: BTreeMap<usize, usize>,
}

impl WideColumns {
    fn resolve(headers: &[String]) -> Result<Self, IngestionError> {
        let mut missing = Vec::new();
        let paper = PaperColumns::resolve(headers, &mut missing);

        let mut authors = BTreeMap::new();
        let mut affiliations = BTreeMap::new();
        let mut universities = BTreeMap::new();
        let mut countries = BTreeMap::new();

        for (position, header) in headers.iter().enumerate() {
            let Some(caps) = numbered_column_pattern().captures(header) else {
                continue;
            };
            let Ok(n) = caps[2].parse::<usize>() else {
                continue;
            };
            let target = match &caps[1] {
                "author" => &mut authors,
                "university" => &mut universities,
                "country" => &mut countries,
                _ => &mut affiliations,
            };
            target.entry(n).or_insert(position);
        }

        if countries.is_empty() {
            missing.push("Country N");
        }

        match paper {
            Some(paper) if !countries.is_empty() => Ok(Self {
                paper,
                authors,
                affiliations,
                universities,
                countries,
            }),
            _ => Err(IngestionError::MissingColumns(missing.join(", "))),
        }
    }

    /// Expand one paper row into one edge per listed author
    fn expand(&self, line: usize, record: &StringRecord) -> Vec<SourceRow> {
        let base = self.paper.paper_fields(line, record);

        // "Name - University" pairs, keyed by person name
        let mut affiliation_by_name: HashMap<String, String> = HashMap::new();
        for &column in self.affiliations.values() {
            let Some(text) = field(record, Some(column)) else {
                continue;
            };
            if let Some((name, university)) = text.split_once(" - ") {
                let university = clean_text(university);
                if !university.is_empty() {
                    affiliation_by_name.entry(person_name_key(name)).or_insert(university);
                }
            }
        }

        // University N sits in the same country as Country N
        let mut country_by_university: HashMap<String, String> = HashMap::new();
        for (n, &column) in &self.universities {
            let university = field(record, Some(column));
            let country = self.countries.get(n).and_then(|&c| field(record, Some(c)));
            if let (Some(university), Some(country)) = (university, country) {
                country_by_university
                    .entry(normalize_text(&university))
                    .or_insert(country);
            }
        }

        let mut row_countries: Vec<String> = Vec::new();
        for &column in self.countries.values() {
            if let Some(country) = field(record, Some(column)) {
                if !row_countries.iter().any(|c| normalize_text(c) == normalize_text(&country)) {
                    row_countries.push(country);
                }
            }
        }
        let sole_country = match row_countries.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };

        let mut edges = Vec::new();
        for (n, &column) in &self.authors {
            let Some(text) = field(record, Some(column)) else {
                continue;
            };
            let (name, author_id) = match author_with_id_pattern().captures(&text) {
                Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
                None => (text.clone(), None),
            };

            let affiliation = affiliation_by_name
                .get(&person_name_key(&name))
                .cloned()
                .or_else(|| self.universities.get(n).and_then(|&c| field(record, Some(c))));

            let country = affiliation
                .as_deref()
                .and_then(|a| country_by_university.get(&normalize_text(a)).cloned())
                .or_else(|| self.countries.get(n).and_then(|&c| field(record, Some(c))))
                .or_else(|| sole_country.clone());

            edges.push(SourceRow {
                author_name: Some(name),
                author_id,
                affiliation,
                country,
                ..base.clone()
            });
        }

        if edges.is_empty() {
            // Surfaces as a missing-author rejection for this line
            edges.push(base);
        }
        edges
    }
}
