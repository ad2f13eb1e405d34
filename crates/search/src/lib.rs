//! ScholarMap Search
//!
//! Read paths over a published record model:
//! - [`QueryEngine`]: stats and Country → University → Author drill-down
//! - [`SearchIndex`]: substring search returning pruned subtrees
//! - [`export`]: flat spreadsheet projections
//!
//! Everything here is a pure function of one snapshot and a year filter.

pub mod export;
pub mod query;
pub mod search;
mod slice;

#[cfg(test)]
mod test_support;

pub use export::{project, ExportKind, ExportTable};
pub use query::{
    AuthorDetail, AuthorSummary, CountryDetail, CountrySummary, QueryEngine, Stats, UniversityDetail,
    UniversitySummary,
};
pub use search::{SearchAuthor, SearchCountry, SearchIndex, SearchUniversity};
