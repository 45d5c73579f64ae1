//! Canonical bibliographic record

use super::Highlight;
use serde::{Deserialize, Serialize};

/// A bibliographic record. The `id` is a normalized DOI when one is known,
/// a provider-native paper id otherwise, or a synthesized `user_*` id for
/// manual entries. Once assigned the id never changes; every other field may
/// be overwritten by later enrichment or user edits.
///
/// Serializes in the camelCase shape of the on-disk library file, and
/// tolerates missing optional fields on read (schema changes must stay
/// additive).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Epoch milliseconds, set once the extraction pipeline has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Highlight>,
}

impl Paper {
    /// Create a paper with required fields only
    pub fn new(id: String, title: String, authors: Vec<String>) -> Self {
        Self {
            id,
            title,
            authors,
            abstract_text: None,
            doi: None,
            citations: None,
            url: None,
            venue: None,
            year: None,
            publication_type: None,
            is_open_access: None,
            pdf_url: None,
            tags: Vec::new(),
            notes: None,
            local_path: None,
            references: Vec::new(),
            enriched_at: None,
            annotations: Vec::new(),
        }
    }

    /// Synthesize an id for a manually entered paper: `user_<millis>_<rand>`
    pub fn manual_id() -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: String = uuid::Uuid::new_v4().simple().to_string()[..4].to_string();
        format!("user_{}_{}", millis, suffix)
    }
}
