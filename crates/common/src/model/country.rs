//! Country entity

use super::university::University;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Slug of the canonical country name
    pub id: String,

    pub name: String,

    pub lat: f64,

    pub lng: f64,

    pub universities: Vec<University>,
}
