//! University entity

use super::author::Author;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    /// Slug of the normalized name, unique within the owning country
    pub id: String,

    pub name: String,

    /// Id of the owning country
    pub country_id: String,

    pub authors: Vec<Author>,
}
