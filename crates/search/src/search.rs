//! Search index
//!
//! Case-insensitive substring search over country, university and author
//! names and paper titles. Results are pruned country subtrees:
//! - a country, university or author match keeps its whole subtree
//! - a paper-title match keeps only that paper under its author(s)
//! - ancestors of any match are kept so the result stays navigable
//!
//! Counts in the result are recomputed over the pruned tree. The year
//! filter always applies on top of the text match.

use crate::query::AuthorSummary;
use crate::slice::{listing_order, AuthorSlice, CountrySlice, UniversitySlice};
use scholarmap_common::model::{Paper, RecordModel};
use scholarmap_common::YearFilter;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCountry {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub paper_count: usize,
    pub universities: Vec<SearchUniversity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchUniversity {
    pub id: String,
    pub name: String,
    pub paper_count: usize,
    pub authors: Vec<SearchAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAuthor {
    #[serde(flatten)]
    pub summary: AuthorSummary,
    pub papers: Vec<Paper>,
}

struct UniversityKeys {
    name: String,
    authors: Vec<String>,
}

struct CountryKeys {
    name: String,
    universities: Vec<UniversityKeys>,
}

/// Lower-cased search keys for one record model.
///
/// Keys mirror the model's tree positions, so an index must only be used
/// with the model it was built from.
pub struct SearchIndex {
    countries: Vec<CountryKeys>,
    titles: HashMap<String, String>,
}

impl SearchIndex {
    pub fn build(model: &RecordModel) -> Self {
        let countries = model
            .countries()
            .iter()
            .map(|c| CountryKeys {
                name: c.name.to_lowercase(),
                universities: c
                    .universities
                    .iter()
                    .map(|u| UniversityKeys {
                        name: u.name.to_lowercase(),
                        authors: u.authors.iter().map(|a| a.name.to_lowercase()).collect(),
                    })
                    .collect(),
            })
            .collect();

        let titles = model
            .papers()
            .map(|p| (p.id.clone(), p.title.to_lowercase()))
            .collect();

        Self { countries, titles }
    }

    fn title_matches(&self, paper: &Paper, needle: &str) -> bool {
        self.titles.get(&paper.id).is_some_and(|t| t.contains(needle))
    }

    /// Run a query. An empty or whitespace query returns the year-filtered
    /// hierarchy with every country, like the country listing.
    pub fn search(&self, model: &RecordModel, query: &str, filter: &YearFilter) -> Vec<SearchCountry> {
        let needle = query.trim().to_lowercase();
        let browsing = needle.is_empty();

        let mut results = Vec::new();
        for (country, country_keys) in model.countries().iter().zip(&self.countries) {
            let country_hit = browsing || country_keys.name.contains(&needle);

            let mut universities = Vec::new();
            for (university, uni_keys) in country.universities.iter().zip(&country_keys.universities) {
                let university_hit = country_hit || uni_keys.name.contains(&needle);

                let authors: Vec<AuthorSlice<'_>> = university
                    .authors
                    .iter()
                    .zip(&uni_keys.authors)
                    .filter_map(|(author, author_key)| {
                        let author_hit = university_hit || author_key.contains(&needle);
                        AuthorSlice::build(model, author, |p| {
                            filter.contains(p.year) && (author_hit || self.title_matches(p, &needle))
                        })
                    })
                    .collect();

                if let Some(slice) = UniversitySlice::from_authors(university, authors) {
                    universities.push(slice);
                }
            }

            let slice = CountrySlice::from_universities(country, universities);
            if browsing || slice.paper_count > 0 {
                results.push(to_result(slice));
            }
        }

        results.sort_by(|a, b| listing_order((a.paper_count, &a.name, &a.id), (b.paper_count, &b.name, &b.id)));
        results
    }
}

fn to_result(slice: CountrySlice<'_>) -> SearchCountry {
    let mut universities: Vec<SearchUniversity> = slice
        .universities
        .into_iter()
        .map(|u| {
            let mut authors: Vec<SearchAuthor> = u
                .authors
                .into_iter()
                .map(|a| SearchAuthor {
                    summary: AuthorSummary {
                        id: a.author.id.clone(),
                        name: a.author.name.clone(),
                        affiliation: a.author.affiliation.clone(),
                        paper_count: a.papers.len(),
                    },
                    papers: a.papers.into_iter().cloned().collect(),
                })
                .collect();
            authors.sort_by(|a, b| {
                listing_order(
                    (a.summary.paper_count, &a.summary.name, &a.summary.id),
                    (b.summary.paper_count, &b.summary.name, &b.summary.id),
                )
            });
            SearchUniversity {
                id: u.university.id.clone(),
                name: u.university.name.clone(),
                paper_count: u.paper_count,
                authors,
            }
        })
        .collect();
    universities.sort_by(|a, b| listing_order((a.paper_count, &a.name, &a.id), (b.paper_count, &b.name, &b.id)));

    SearchCountry {
        id: slice.country.id.clone(),
        name: slice.country.name.clone(),
        lat: slice.country.lat,
        lng: slice.country.lng,
        paper_count: slice.paper_count,
        universities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryEngine;
    use crate::test_support::sample_model;

    fn run(query: &str, filter: YearFilter) -> Vec<SearchCountry> {
        let model = sample_model();
        SearchIndex::build(&model).search(&model, query, &filter)
    }

    #[test]
    fn test_title_match_promotes_only_owning_branch() {
        let results = run("solar", YearFilter::All);

        assert_eq!(results.len(), 1);
        let malaysia = &results[0];
        assert_eq!(malaysia.name, "Malaysia");
        assert_eq!(malaysia.paper_count, 1);
        assert_eq!(malaysia.universities.len(), 1);

        let um = &malaysia.universities[0];
        assert_eq!(um.id, "um");
        assert_eq!(um.authors.len(), 1);
        assert_eq!(um.authors[0].summary.name, "Lee Chong");
        // Lee's other paper is not part of the match
        assert_eq!(um.authors[0].papers.len(), 1);
        assert_eq!(um.authors[0].summary.paper_count, 1);
    }

    #[test]
    fn test_shared_title_counted_once_in_country() {
        let results = run("SHARED", YearFilter::All);
        let malaysia = &results[0];
        assert_eq!(malaysia.paper_count, 1);
        assert_eq!(malaysia.universities.len(), 2);
        assert!(malaysia.universities.iter().all(|u| u.paper_count == 1));
    }

    #[test]
    fn test_university_match_keeps_whole_subtree() {
        let results = run("apu", YearFilter::All);
        assert_eq!(results.len(), 1);
        let apu = &results[0].universities[0];
        assert_eq!(apu.authors.len(), 2);
        assert_eq!(apu.paper_count, 2);
    }

    #[test]
    fn test_country_match_respects_year_filter() {
        let results = run("malaysia", YearFilter::year(2025));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].paper_count, 1);
        assert_eq!(results[0].universities.len(), 1);
        assert_eq!(results[0].universities[0].authors[0].summary.name, "Ka Fei Thang");
    }

    #[test]
    fn test_no_match_returns_nothing() {
        assert!(run("quantum", YearFilter::All).is_empty());
        // Matches, but filtered out by year
        assert!(run("grid", YearFilter::year(2025)).is_empty());
    }

    #[test]
    fn test_empty_query_returns_full_listing() {
        let model = sample_model();
        let filter = YearFilter::year(2025);
        let results = SearchIndex::build(&model).search(&model, "   ", &filter);
        let listing = QueryEngine::new(&model, filter).countries();

        assert_eq!(results.len(), listing.len());
        for (result, summary) in results.iter().zip(&listing) {
            assert_eq!(result.id, summary.id);
            assert_eq!(result.paper_count, summary.paper_count);
        }
        // China has nothing in 2025 but stays listed
        assert!(results.iter().any(|c| c.id == "china" && c.universities.is_empty()));
    }

    #[test]
    fn test_author_result_serializes_flat() {
        let results = run("zhang", YearFilter::All);
        let json = serde_json::to_value(&results[0].universities[0].authors[0]).unwrap();
        assert_eq!(json["name"], "Wei Zhang");
        assert_eq!(json["paperCount"], 1);
        assert_eq!(json["papers"][0]["title"], "Grid resilience");
    }
}
