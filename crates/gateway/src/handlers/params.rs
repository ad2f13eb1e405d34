//! Query-string parameters shared by read endpoints

use scholarmap_common::errors::{AppError, Result};
use scholarmap_common::YearFilter;
use serde::Deserialize;
use validator::Validate;

/// Year filter as it arrives on the query string.
///
/// Values are taken as strings so malformed input reports a
/// `ValidationError` naming the field instead of a bare rejection.
#[derive(Debug, Default, Deserialize)]
pub struct YearParams {
    pub year: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
}

impl YearParams {
    pub fn into_filter(self) -> Result<YearFilter> {
        let year = present(self.year);
        let start = present(self.start_year);
        let end = present(self.end_year);

        match (year, start, end) {
            (None, None, None) => Ok(YearFilter::All),
            (Some(year), None, None) if year.eq_ignore_ascii_case("all") => Ok(YearFilter::All),
            (Some(year), None, None) => Ok(YearFilter::year(parse_year("year", &year)?)),
            (None, Some(start), Some(end)) => {
                YearFilter::range(parse_year("start_year", &start)?, parse_year("end_year", &end)?)
            }
            (None, Some(_), None) | (None, None, Some(_)) => Err(AppError::Validation {
                message: "A year range needs both start_year and end_year".to_string(),
                field: Some("start_year".to_string()),
            }),
            (Some(_), _, _) => Err(AppError::Validation {
                message: "Use either year or start_year/end_year, not both".to_string(),
                field: Some("year".to_string()),
            }),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_year(field: &str, raw: &str) -> Result<i32> {
    raw.parse().map_err(|_| AppError::Validation {
        message: format!("{} must be an integer year, got '{}'", field, raw),
        field: Some(field.to_string()),
    })
}

/// `?q=` for the search endpoint
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(max = 200))]
    pub q: Option<String>,
}
