//! Author entity

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,

    pub name: String,

    /// University name exactly as given in the source
    pub affiliation: String,

    /// Papers this author contributed to, first-seen order, no duplicates
    pub paper_ids: Vec<String>,
}
