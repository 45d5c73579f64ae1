//! Search result and query types for online sources

use super::Paper;
use serde::{Deserialize, Serialize};

/// Online metadata provider
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Crossref,
    SemanticScholar,
    OpenAlex,
    Manual,
}

impl Source {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Crossref => "crossref",
            Source::SemanticScholar => "semanticscholar",
            Source::OpenAlex => "openalex",
            Source::Manual => "manual",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider's answer to a search call. Ephemeral, never persisted.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub papers: Vec<Paper>,
    pub total: u64,
    pub source: Source,
}

impl SearchResult {
    /// The fail-soft empty result for a provider
    pub fn empty(source: Source) -> Self {
        Self {
            papers: Vec::new(),
            total: 0,
            source,
        }
    }
}

/// Structured fields for advanced search.
///
/// When `doi` is set, providers bypass keyword search and perform an exact
/// identifier lookup.
#[derive(Clone, Debug, Default)]
pub struct SearchFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub venue: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub doi: Option<String>,
}
