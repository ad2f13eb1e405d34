//! Paper entity

use serde::{Deserialize, Serialize};

/// One publication, shared by every author who contributed to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Stable content-derived identifier
    pub id: String,

    pub title: String,

    /// Publication year
    pub year: i32,

    /// Source title / venue
    pub source: String,

    /// Citation count as reported by the source
    pub cited_by: u32,

    /// DOI, empty when the source had none
    pub doi: String,

    /// External link
    pub link: String,

    /// Author display names as printed on the paper, first-seen order
    pub authors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    /// Scopus EID, when the source carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,
}
