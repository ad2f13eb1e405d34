//! Query engine
//!
//! Answers the drill-down views of the map: global stats, the country
//! listing, and one country, university or author. Every view takes a
//! year filter applied at paper level and propagated upward.

use crate::slice::{listing_order, slice_country, slice_university, AuthorSlice, CountrySlice};
use scholarmap_common::model::{Paper, RecordModel};
use scholarmap_common::{AppError, Result, YearFilter};
use serde::Serialize;
use std::collections::HashSet;

/// Global totals under a year filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_papers: usize,
    pub total_countries: usize,
    pub total_universities: usize,
    pub total_authors: usize,
    pub total_citations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub paper_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDetail {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub paper_count: usize,
    pub universities: Vec<UniversitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversitySummary {
    pub id: String,
    pub name: String,
    pub paper_count: usize,
    pub author_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityDetail {
    pub id: String,
    pub name: String,
    pub country_id: String,
    /// Country display name
    pub country: String,
    pub paper_count: usize,
    pub authors: Vec<AuthorSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub affiliation: String,
    pub paper_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDetail {
    pub id: String,
    pub name: String,
    pub affiliation: String,
    pub paper_count: usize,
    /// Year descending, then title
    pub papers: Vec<Paper>,
}

/// Read-only views over one record model snapshot
pub struct QueryEngine<'a> {
    model: &'a RecordModel,
    filter: YearFilter,
}

impl<'a> QueryEngine<'a> {
    pub fn new(model: &'a RecordModel, filter: YearFilter) -> Self {
        Self { model, filter }
    }

    fn slices(&self) -> impl Iterator<Item = CountrySlice<'a>> + '_ {
        self.model
            .countries()
            .iter()
            .map(move |c| slice_country(self.model, c, &self.filter))
    }

    /// Global totals; papers shared by co-authors count once
    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        let mut papers: HashSet<&str> = HashSet::new();

        for slice in self.slices() {
            if slice.paper_count == 0 {
                continue;
            }
            stats.total_countries += 1;
            stats.total_universities += slice.universities.len();
            stats.total_authors += slice.author_count();

            for paper in slice.papers() {
                if papers.insert(paper.id.as_str()) {
                    stats.total_citations += u64::from(paper.cited_by);
                }
            }
        }

        stats.total_papers = papers.len();
        stats
    }

    /// Every country, including those with no surviving papers
    pub fn countries(&self) -> Vec<CountrySummary> {
        let mut countries: Vec<CountrySummary> = self
            .slices()
            .map(|slice| CountrySummary {
                id: slice.country.id.clone(),
                name: slice.country.name.clone(),
                lat: slice.country.lat,
                lng: slice.country.lng,
                paper_count: slice.paper_count,
            })
            .collect();
        countries.sort_by(|a, b| listing_order((a.paper_count, &a.name, &a.id), (b.paper_count, &b.name, &b.id)));
        countries
    }

    pub fn country(&self, country_id: &str) -> Result<CountryDetail> {
        let country = self
            .model
            .country(country_id)
            .ok_or_else(|| AppError::not_found("Country", country_id))?;
        let slice = slice_country(self.model, country, &self.filter);

        let mut universities: Vec<UniversitySummary> = slice
            .universities
            .iter()
            .map(|u| UniversitySummary {
                id: u.university.id.clone(),
                name: u.university.name.clone(),
                paper_count: u.paper_count,
                author_count: u.author_count(),
            })
            .collect();
        universities.sort_by(|a, b| listing_order((a.paper_count, &a.name, &a.id), (b.paper_count, &b.name, &b.id)));

        Ok(CountryDetail {
            id: country.id.clone(),
            name: country.name.clone(),
            lat: country.lat,
            lng: country.lng,
            paper_count: slice.paper_count,
            universities,
        })
    }

    pub fn university(&self, country_id: &str, university_id: &str) -> Result<UniversityDetail> {
        let country = self
            .model
            .country(country_id)
            .ok_or_else(|| AppError::not_found("Country", country_id))?;
        let university = self
            .model
            .university(country_id, university_id)
            .ok_or_else(|| AppError::not_found("University", university_id))?;

        let (paper_count, mut authors): (usize, Vec<AuthorSummary>) = match slice_university(self.model, university, &self.filter) {
            Some(slice) => (slice.paper_count, slice.authors.iter().map(author_summary).collect()),
            None => (0, Vec::new()),
        };
        authors.sort_by(|a, b| {
            listing_order((a.paper_count, &a.name, &a.id), (b.paper_count, &b.name, &b.id))
        });

        Ok(UniversityDetail {
            id: university.id.clone(),
            name: university.name.clone(),
            country_id: country.id.clone(),
            country: country.name.clone(),
            paper_count,
            authors,
        })
    }

    pub fn author(&self, country_id: &str, university_id: &str, author_id: &str) -> Result<AuthorDetail> {
        if self.model.country(country_id).is_none() {
            return Err(AppError::not_found("Country", country_id));
        }
        if self.model.university(country_id, university_id).is_none() {
            return Err(AppError::not_found("University", university_id));
        }
        let author = self
            .model
            .author(country_id, university_id, author_id)
            .ok_or_else(|| AppError::not_found("Author", author_id))?;

        let papers: Vec<Paper> = AuthorSlice::build(self.model, author, |p| self.filter.contains(p.year))
            .map(|slice| slice.papers.into_iter().cloned().collect())
            .unwrap_or_default();

        Ok(AuthorDetail {
            id: author.id.clone(),
            name: author.name.clone(),
            affiliation: author.affiliation.clone(),
            paper_count: papers.len(),
            papers,
        })
    }
}

fn author_summary(slice: &AuthorSlice<'_>) -> AuthorSummary {
    AuthorSummary {
        id: slice.author.id.clone(),
        name: slice.author.name.clone(),
        affiliation: slice.author.affiliation.clone(),
        paper_count: slice.papers.len(),
    }
}
