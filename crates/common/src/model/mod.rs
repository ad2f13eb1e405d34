//! Record model
//!
//! The normalized Country → University → Author → Paper-reference tree.
//! Countries own universities, universities own authors, authors hold paper
//! ids; papers themselves live in one map so a co-authored paper exists once.
//! Upward lookups (author → university → country) go through the index maps
//! built here, never through stored back-pointers.
//!
//! A `RecordModel` can only be obtained through [`RecordModel::from_tree`],
//! which checks the tree invariants, and is never mutated afterwards.

mod author;
mod country;
mod paper;
mod university;

pub use author::Author;
pub use country::Country;
pub use paper::Paper;
pub use university::University;

use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// A broken tree invariant. Produced only by a defective normalizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("duplicate country id {0}")]
    DuplicateCountry(String),

    #[error("duplicate university id {university} in country {country}")]
    DuplicateUniversity { country: String, university: String },

    #[error("university {university} claims country {claimed} but sits under {actual}")]
    MisplacedUniversity {
        university: String,
        claimed: String,
        actual: String,
    },

    #[error("author id {0} appears more than once")]
    DuplicateAuthor(String),

    #[error("author {0} has no papers")]
    AuthorWithoutPapers(String),

    #[error("duplicate paper id {0}")]
    DuplicatePaper(String),

    #[error("author {author} references unknown paper {paper}")]
    DanglingPaperReference { author: String, paper: String },

    #[error("paper {0} is not reachable from any author")]
    OrphanPaper(String),
}

/// Position of an author inside the tree
#[derive(Debug, Clone, Copy)]
pub struct AuthorPath<'a> {
    pub country: &'a Country,
    pub university: &'a University,
    pub author: &'a Author,
}

/// The complete normalized dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordModel {
    countries: Vec<Country>,
    papers: BTreeMap<String, Paper>,
    country_index: HashMap<String, usize>,
    university_index: HashMap<(String, String), (usize, usize)>,
    author_index: HashMap<String, (usize, usize, usize)>,
}

impl RecordModel {
    /// The empty-but-valid model served before the first ingestion
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a model from an owned tree and its papers, checking every
    /// structural invariant.
    pub fn from_tree(countries: Vec<Country>, papers: Vec<Paper>) -> Result<Self, InvariantViolation> {
        let mut paper_map = BTreeMap::new();
        for paper in papers {
            if paper_map.contains_key(&paper.id) {
                return Err(InvariantViolation::DuplicatePaper(paper.id));
            }
            paper_map.insert(paper.id.clone(), paper);
        }

        let mut country_index = HashMap::new();
        let mut university_index = HashMap::new();
        let mut author_index = HashMap::new();
        let mut referenced: HashSet<&str> = HashSet::new();

        for (ci, country) in countries.iter().enumerate() {
            if country_index.insert(country.id.clone(), ci).is_some() {
                return Err(InvariantViolation::DuplicateCountry(country.id.clone()));
            }

            for (ui, university) in country.universities.iter().enumerate() {
                if university.country_id != country.id {
                    return Err(InvariantViolation::MisplacedUniversity {
                        university: university.id.clone(),
                        claimed: university.country_id.clone(),
                        actual: country.id.clone(),
                    });
                }
                let key = (country.id.clone(), university.id.clone());
                if university_index.insert(key, (ci, ui)).is_some() {
                    return Err(InvariantViolation::DuplicateUniversity {
                        country: country.id.clone(),
                        university: university.id.clone(),
                    });
                }

                for (ai, author) in university.authors.iter().enumerate() {
                    if author_index.insert(author.id.clone(), (ci, ui, ai)).is_some() {
                        return Err(InvariantViolation::DuplicateAuthor(author.id.clone()));
                    }
                    if author.paper_ids.is_empty() {
                        return Err(InvariantViolation::AuthorWithoutPapers(author.id.clone()));
                    }
                    for paper_id in &author.paper_ids {
                        if !paper_map.contains_key(paper_id) {
                            return Err(InvariantViolation::DanglingPaperReference {
                                author: author.id.clone(),
                                paper: paper_id.clone(),
                            });
                        }
                        referenced.insert(paper_id.as_str());
                    }
                }
            }
        }

        if let Some(orphan) = paper_map.keys().find(|id| !referenced.contains(id.as_str())) {
            return Err(InvariantViolation::OrphanPaper(orphan.clone()));
        }

        Ok(Self {
            countries,
            papers: paper_map,
            country_index,
            university_index,
            author_index,
        })
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn country(&self, id: &str) -> Option<&Country> {
        self.country_index.get(id).map(|&ci| &self.countries[ci])
    }

    pub fn university(&self, country_id: &str, university_id: &str) -> Option<&University> {
        self.university_index
            .get(&(country_id.to_string(), university_id.to_string()))
            .map(|&(ci, ui)| &self.countries[ci].universities[ui])
    }

    /// Resolve an author by id alone, with its ancestors
    pub fn locate_author(&self, author_id: &str) -> Option<AuthorPath<'_>> {
        self.author_index.get(author_id).map(|&(ci, ui, ai)| {
            let country = &self.countries[ci];
            let university = &country.universities[ui];
            AuthorPath {
                country,
                university,
                author: &university.authors[ai],
            }
        })
    }

    /// Resolve an author by its full path; `None` if any segment disagrees
    pub fn author(&self, country_id: &str, university_id: &str, author_id: &str) -> Option<&Author> {
        self.locate_author(author_id)
            .filter(|path| path.country.id == country_id && path.university.id == university_id)
            .map(|path| path.author)
    }

    pub fn paper(&self, id: &str) -> Option<&Paper> {
        self.papers.get(id)
    }

    /// All papers, ordered by id
    pub fn papers(&self) -> impl Iterator<Item = &Paper> {
        self.papers.values()
    }

    /// Papers referenced by one author, in the author's order
    pub fn papers_of<'a>(&'a self, author: &'a Author) -> impl Iterator<Item = &'a Paper> + 'a {
        author.paper_ids.iter().filter_map(move |id| self.papers.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn university_count(&self) -> usize {
        self.university_index.len()
    }

    pub fn author_count(&self) -> usize {
        self.author_index.len()
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, year: i32) -> Paper {
        Paper {
            id: id.to_string(),
            title: format!("Paper {}", id),
            year,
            source: "Journal".to_string(),
            cited_by: 1,
            doi: String::new(),
            link: String::new(),
            authors: vec![],
            document_type: None,
            eid: None,
        }
    }

    fn author(id: &str, papers: &[&str]) -> Author {
        Author {
            id: id.to_string(),
            name: id.to_uppercase(),
            affiliation: "APU".to_string(),
            paper_ids: papers.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn country(id: &str, universities: Vec<University>) -> Country {
        Country {
            id: id.to_string(),
            name: id.to_string(),
            lat: 0.0,
            lng: 0.0,
            universities,
        }
    }

    fn university(country_id: &str, id: &str, authors: Vec<Author>) -> University {
        University {
            id: id.to_string(),
            name: id.to_uppercase(),
            country_id: country_id.to_string(),
            authors,
        }
    }

    #[test]
    fn test_empty_model_is_valid() {
        let model = RecordModel::empty();
        assert!(model.is_empty());
        assert_eq!(model.paper_count(), 0);
        assert!(model.country("malaysia").is_none());
    }

    #[test]
    fn test_lookup_through_indexes() {
        let model = RecordModel::from_tree(
            vec![country(
                "malaysia",
                vec![university("malaysia", "apu", vec![author("a1", &["p1"]), author("a2", &["p1"])])],
            )],
            vec![paper("p1", 2025)],
        )
        .unwrap();

        assert_eq!(model.university_count(), 1);
        assert_eq!(model.author_count(), 2);
        assert!(model.author("malaysia", "apu", "a2").is_some());
        assert!(model.author("malaysia", "other", "a2").is_none());

        let path = model.locate_author("a1").unwrap();
        assert_eq!(path.country.id, "malaysia");
        assert_eq!(path.university.id, "apu");
        assert_eq!(model.papers_of(path.author).count(), 1);
    }

    #[test]
    fn test_same_university_id_in_two_countries() {
        let model = RecordModel::from_tree(
            vec![
                country("china", vec![university("china", "apu", vec![author("a1", &["p1"])])]),
                country("malaysia", vec![university("malaysia", "apu", vec![author("a2", &["p1"])])]),
            ],
            vec![paper("p1", 2024)],
        )
        .unwrap();
        assert_eq!(model.university_count(), 2);
    }

    #[test]
    fn test_duplicate_author_rejected() {
        let err = RecordModel::from_tree(
            vec![country(
                "malaysia",
                vec![
                    university("malaysia", "apu", vec![author("a1", &["p1"])]),
                    university("malaysia", "um", vec![author("a1", &["p1"])]),
                ],
            )],
            vec![paper("p1", 2024)],
        )
        .unwrap_err();
        assert_eq!(err, InvariantViolation::DuplicateAuthor("a1".to_string()));
    }

    #[test]
    fn test_orphan_paper_rejected() {
        let err = RecordModel::from_tree(
            vec![country("malaysia", vec![university("malaysia", "apu", vec![author("a1", &["p1"])])])],
            vec![paper("p1", 2024), paper("p2", 2024)],
        )
        .unwrap_err();
        assert_eq!(err, InvariantViolation::OrphanPaper("p2".to_string()));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let err = RecordModel::from_tree(
            vec![country("malaysia", vec![university("malaysia", "apu", vec![author("a1", &["p9"])])])],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, InvariantViolation::DanglingPaperReference { .. }));
    }

    #[test]
    fn test_misplaced_university_rejected() {
        let err = RecordModel::from_tree(
            vec![country("malaysia", vec![university("china", "apu", vec![author("a1", &["p1"])])])],
            vec![paper("p1", 2024)],
        )
        .unwrap_err();
        assert!(matches!(err, InvariantViolation::MisplacedUniversity { .. }));
    }
}
