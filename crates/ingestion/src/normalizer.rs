//! Ingestion normalizer
//!
//! Turns validated paper-authorship edges into a [`RecordModel`]:
//! - rows sharing a paper identity merge into one paper
//! - rows sharing an author identity merge into one author
//! - each author is placed at its most frequent (country, affiliation),
//!   ties going to the first one seen
//! - children are ordered by name so identical input yields identical output

use crate::errors::IngestionError;
use crate::geo::{self, CountryLocation};
use crate::identity::{self, clean_text, normalize_text, person_name_key, slugify};
use crate::record::{AuthorshipRecord, RejectReason, RowWarning, SourceRow, YearBounds};
use scholarmap_common::model::{Author, Country, Paper, RecordModel, University};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Result of normalizing one dataset
#[derive(Debug)]
pub struct Normalized {
    pub model: RecordModel,
    /// Edges that made it into the model
    pub accepted: usize,
    pub warnings: Vec<RowWarning>,
}

/// Paper assembled across all rows that share its identity
struct PaperDraft {
    paper: Paper,
    author_keys: HashSet<String>,
}

impl PaperDraft {
    fn new(id: String, record: &AuthorshipRecord) -> Self {
        Self {
            paper: Paper {
                id,
                title: record.title.clone(),
                year: record.year,
                source: record.source.clone(),
                cited_by: record.cited_by,
                doi: record.doi.clone(),
                link: record.link.clone(),
                authors: Vec::new(),
                document_type: record.document_type.clone(),
                eid: record.eid.clone(),
            },
            author_keys: HashSet::new(),
        }
    }

    fn add_author_name(&mut self, name: &str) {
        if self.author_keys.insert(person_name_key(name)) {
            self.paper.authors.push(name.to_string());
        }
    }
}

/// How often an author was seen at one (country, affiliation)
struct Placement {
    country_id: String,
    university_key: String,
    /// The author's own first spelling of the affiliation
    display: String,
    count: usize,
}

struct AuthorDraft {
    name: String,
    placements: Vec<Placement>,
    paper_ids: Vec<String>,
    paper_set: HashSet<String>,
}

impl AuthorDraft {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            placements: Vec::new(),
            paper_ids: Vec::new(),
            paper_set: HashSet::new(),
        }
    }

    fn record_placement(&mut self, country_id: &str, university_key: &str, display: &str) {
        match self
            .placements
            .iter_mut()
            .find(|p| p.country_id == country_id && p.university_key == university_key)
        {
            Some(placement) => placement.count += 1,
            None => self.placements.push(Placement {
                country_id: country_id.to_string(),
                university_key: university_key.to_string(),
                display: display.to_string(),
                count: 1,
            }),
        }
    }

    fn add_paper(&mut self, paper_id: &str) {
        if self.paper_set.insert(paper_id.to_string()) {
            self.paper_ids.push(paper_id.to_string());
        }
    }

    /// Most frequent placement; placements are stored in first-seen order,
    /// so keeping the earlier one on equal counts resolves ties.
    fn winning_placement(&self) -> Option<&Placement> {
        self.placements.iter().fold(None, |best: Option<&Placement>, p| match best {
            Some(b) if b.count >= p.count => Some(b),
            _ => Some(p),
        })
    }
}

/// Normalize source rows into a record model
pub fn normalize(rows: Vec<SourceRow>, bounds: YearBounds) -> Result<Normalized, IngestionError> {
    let mut warnings = Vec::new();
    let mut accepted = 0usize;

    let mut papers: HashMap<String, PaperDraft> = HashMap::new();
    let mut authors: HashMap<String, AuthorDraft> = HashMap::new();
    let mut author_order: Vec<String> = Vec::new();
    let mut countries: BTreeMap<String, CountryLocation> = BTreeMap::new();
    let mut university_names: HashMap<(String, String), String> = HashMap::new();

    for row in rows {
        let line = row.line;
        let record = match AuthorshipRecord::validate(row, bounds) {
            Ok(record) => record,
            Err(reason) => {
                reject(&mut warnings, line, reason);
                continue;
            }
        };

        // Rejected rows never touch a paper
        let Some(location) = geo::lookup(&record.country) else {
            reject(&mut warnings, line, RejectReason::UnknownCountry(record.country.clone()));
            continue;
        };

        let paper_id = identity::paper_id(&record.doi, record.eid.as_deref(), &record.title);
        papers
            .entry(paper_id.clone())
            .or_insert_with(|| PaperDraft::new(paper_id.clone(), &record))
            .add_author_name(&record.author_name);

        let country_id = slugify(location.name);
        countries.entry(country_id.clone()).or_insert(location);

        let university_key = normalize_text(&record.affiliation);
        university_names
            .entry((country_id.clone(), university_key.clone()))
            .or_insert_with(|| clean_text(&record.affiliation));

        let author_id = identity::author_id(
            record.author_source_id.as_deref(),
            &record.author_name,
            &record.affiliation,
            &country_id,
        );
        let author = authors.entry(author_id.clone()).or_insert_with(|| {
            author_order.push(author_id.clone());
            AuthorDraft::new(&record.author_name)
        });
        author.record_placement(&country_id, &university_key, &record.affiliation);
        author.add_paper(&paper_id);

        accepted += 1;
    }

    if accepted == 0 {
        return Err(IngestionError::NoValidRows {
            rejected: warnings.len(),
        });
    }

    // country id -> university key -> authors
    let mut tree: BTreeMap<String, BTreeMap<String, Vec<Author>>> = BTreeMap::new();
    for author_id in author_order {
        let Some(draft) = authors.remove(&author_id) else {
            continue;
        };
        let Some(placement) = draft.winning_placement() else {
            continue;
        };
        if draft.placements.len() > 1 {
            debug!(
                author_id = %author_id,
                affiliation = %placement.display,
                candidates = draft.placements.len(),
                "Resolved conflicting affiliations"
            );
        }

        let author = Author {
            id: author_id,
            name: draft.name.clone(),
            affiliation: placement.display.clone(),
            paper_ids: draft.paper_ids.clone(),
        };
        tree.entry(placement.country_id.clone())
            .or_default()
            .entry(placement.university_key.clone())
            .or_default()
            .push(author);
    }

    let mut country_nodes: Vec<Country> = tree
        .into_iter()
        .filter_map(|(country_id, universities)| {
            let location = countries.get(&country_id)?;
            Some(build_country(country_id, location, universities, &university_names))
        })
        .collect();
    country_nodes.sort_by(|a, b| sort_key(&a.name, &a.id).cmp(&sort_key(&b.name, &b.id)));

    let paper_nodes: Vec<Paper> = papers.into_values().map(|draft| draft.paper).collect();

    let model = RecordModel::from_tree(country_nodes, paper_nodes)?;

    Ok(Normalized {
        model,
        accepted,
        warnings,
    })
}

fn reject(warnings: &mut Vec<RowWarning>, line: usize, reason: RejectReason) {
    warn!(line, reason = %reason, "Row rejected");
    warnings.push(RowWarning::new(line, &reason));
}

fn sort_key(name: &str, id: &str) -> (String, String) {
    (name.to_lowercase(), id.to_string())
}

fn build_country(
    country_id: String,
    location: &CountryLocation,
    universities: BTreeMap<String, Vec<Author>>,
    university_names: &HashMap<(String, String), String>,
) -> Country {
    // BTreeMap order is normalized-name order, which makes slug
    // de-duplication deterministic.
    let mut taken: HashSet<String> = HashSet::new();
    let mut nodes: Vec<University> = universities
        .into_iter()
        .map(|(key, mut authors)| {
            let base = slugify(&key);
            let mut id = base.clone();
            let mut suffix = 2;
            while !taken.insert(id.clone()) {
                id = format!("{}-{}", base, suffix);
                suffix += 1;
            }

            authors.sort_by(|a, b| sort_key(&a.name, &a.id).cmp(&sort_key(&b.name, &b.id)));

            let name = university_names
                .get(&(country_id.clone(), key.clone()))
                .cloned()
                .unwrap_or(key);

            University {
                id,
                name,
                country_id: country_id.clone(),
                authors,
            }
        })
        .collect();
    nodes.sort_by(|a, b| sort_key(&a.name, &a.id).cmp(&sort_key(&b.name, &b.id)));

    Country {
        id: country_id,
        name: location.name.to_string(),
        lat: location.lat,
        lng: location.lng,
        universities: nodes,
    }
}
