//! Year filters
//!
//! Every read path (stats, drill-down, search, export) takes a [`YearFilter`].
//! Filtering always happens at the paper level.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication-year predicate applied to papers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearFilter {
    /// Identity filter, no paper is excluded
    #[default]
    All,
    /// Exactly one publication year
    Single { year: i32 },
    /// Inclusive range, `start <= end`
    Range { start: i32, end: i32 },
}

impl YearFilter {
    /// Single-year filter
    pub fn year(year: i32) -> Self {
        YearFilter::Single { year }
    }

    /// Inclusive range filter.
    ///
    /// A degenerate range collapses to [`YearFilter::Single`] so that
    /// `2021..=2021` and `2021` are the same filter.
    pub fn range(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }
        if start == end {
            return Ok(YearFilter::Single { year: start });
        }
        Ok(YearFilter::Range { start, end })
    }

    /// Whether a paper published in `year` survives the filter
    pub fn contains(&self, year: i32) -> bool {
        match *self {
            YearFilter::All => true,
            YearFilter::Single { year: y } => year == y,
            YearFilter::Range { start, end } => (start..=end).contains(&year),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, YearFilter::All)
    }

    /// Short label used in export file names and logs
    pub fn label(&self) -> String {
        match *self {
            YearFilter::All => "all".to_string(),
            YearFilter::Single { year } => year.to_string(),
            YearFilter::Range { start, end } => format!("{}-{}", start, end),
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
