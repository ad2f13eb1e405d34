//! Filtered views of the record model
//!
//! A slice is the part of a subtree whose papers survive a predicate, with
//! distinct-paper counts computed once on the way up. Query, search and
//! export all read the model through slices so their counts agree.

use scholarmap_common::model::{Author, Country, Paper, RecordModel, University};
use scholarmap_common::YearFilter;
use std::cmp::Ordering;
use std::collections::HashSet;

pub(crate) struct AuthorSlice<'a> {
    pub author: &'a Author,
    /// Surviving papers, year descending then title
    pub papers: Vec<&'a Paper>,
}

pub(crate) struct UniversitySlice<'a> {
    pub university: &'a University,
    /// Authors with at least one surviving paper
    pub authors: Vec<AuthorSlice<'a>>,
    pub paper_count: usize,
}

pub(crate) struct CountrySlice<'a> {
    pub country: &'a Country,
    /// Universities with at least one surviving author
    pub universities: Vec<UniversitySlice<'a>>,
    pub paper_count: usize,
}

impl<'a> AuthorSlice<'a> {
    /// Slice of one author, `None` when no paper survives
    pub fn build(model: &'a RecordModel, author: &'a Author, keep: impl Fn(&Paper) -> bool) -> Option<Self> {
        let mut papers: Vec<&Paper> = model.papers_of(author).filter(|p| keep(p)).collect();
        if papers.is_empty() {
            return None;
        }
        papers.sort_by(|a, b| paper_order(a, b));
        Some(Self { author, papers })
    }
}

impl<'a> UniversitySlice<'a> {
    pub fn from_authors(university: &'a University, authors: Vec<AuthorSlice<'a>>) -> Option<Self> {
        if authors.is_empty() {
            return None;
        }
        let paper_count = distinct(authors.iter().flat_map(|a| a.papers.iter().copied()));
        Some(Self {
            university,
            authors,
            paper_count,
        })
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }
}

impl<'a> CountrySlice<'a> {
    pub fn from_universities(country: &'a Country, universities: Vec<UniversitySlice<'a>>) -> Self {
        let paper_count = distinct(
            universities
                .iter()
                .flat_map(|u| u.authors.iter())
                .flat_map(|a| a.papers.iter().copied()),
        );
        Self {
            country,
            universities,
            paper_count,
        }
    }

    /// Distinct surviving authors; author ids are unique model-wide
    pub fn author_count(&self) -> usize {
        self.universities.iter().map(UniversitySlice::author_count).sum()
    }

    pub fn papers(&self) -> impl Iterator<Item = &'a Paper> + '_ {
        self.universities
            .iter()
            .flat_map(|u| u.authors.iter())
            .flat_map(|a| a.papers.iter().copied())
    }
}

/// Year-filtered slice of one country. Always returned, possibly empty.
pub(crate) fn slice_country<'a>(model: &'a RecordModel, country: &'a Country, filter: &YearFilter) -> CountrySlice<'a> {
    let universities = country
        .universities
        .iter()
        .filter_map(|u| slice_university(model, u, filter))
        .collect();
    CountrySlice::from_universities(country, universities)
}

/// Year-filtered slice of one university, `None` when nothing survives
pub(crate) fn slice_university<'a>(
    model: &'a RecordModel,
    university: &'a University,
    filter: &YearFilter,
) -> Option<UniversitySlice<'a>> {
    let authors = university
        .authors
        .iter()
        .filter_map(|a| AuthorSlice::build(model, a, |p| filter.contains(p.year)))
        .collect();
    UniversitySlice::from_authors(university, authors)
}

fn distinct<'p>(papers: impl Iterator<Item = &'p Paper>) -> usize {
    papers.map(|p| p.id.as_str()).collect::<HashSet<_>>().len()
}

/// Case-insensitive name comparison, ties broken by id
pub(crate) fn name_order(a_name: &str, a_id: &str, b_name: &str, b_id: &str) -> Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_id.cmp(b_id))
}

/// Listing order: paper count descending, then name
pub(crate) fn listing_order(a: (usize, &str, &str), b: (usize, &str, &str)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| name_order(a.1, a.2, b.1, b.2))
}

/// Year descending, then title, then id
pub(crate) fn paper_order(a: &Paper, b: &Paper) -> Ordering {
    b.year
        .cmp(&a.year)
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}
