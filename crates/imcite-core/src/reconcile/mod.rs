//! Record reconciliation: merge multi-provider result sets into one
//! deduplicated, field-complete list
//!
//! Identity is heuristic: lowercased DOI when present, else lowercased
//! trimmed title. Near-duplicate titles do not collapse; there is no fuzzy
//! matching here.

use crate::domain::{Paper, SearchResult, Source};
use std::collections::HashMap;

/// Dedup key for a paper: `lowercase(doi)` if present, else
/// `lowercase(trim(title))`.
pub fn dedupe_key(paper: &Paper) -> String {
    match paper.doi.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(doi) => doi.to_lowercase(),
        None => paper.title.trim().to_lowercase(),
    }
}

/// Merge result sets in descending priority order.
///
/// The first source to produce a record for a key wins its non-empty fields;
/// lower-priority duplicates only fill fields the winner left empty
/// (abstract, doi, pdf link, venue; a filled pdf link also marks the record
/// open access) and raise the citation count to the maximum seen. Output keeps
/// first-seen order, independent of per-source internal order.
pub fn merge_results(result_sets: Vec<SearchResult>, priority: &[Source]) -> Vec<Paper> {
    let rank = |source: Source| {
        priority
            .iter()
            .position(|p| *p == source)
            .unwrap_or(priority.len())
    };

    let mut sets = result_sets;
    // Stable: sets for sources absent from the priority list keep their
    // relative order after the prioritized ones.
    sets.sort_by_key(|set| rank(set.source));

    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Paper> = HashMap::new();

    for set in sets {
        for paper in set.papers {
            let key = dedupe_key(&paper);
            match by_key.get_mut(&key) {
                None => {
                    order.push(key.clone());
                    by_key.insert(key, paper);
                }
                Some(existing) => fill_missing_fields(existing, paper),
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect()
}

fn is_empty(field: &Option<String>) -> bool {
    field.as_deref().map(str::trim).is_none_or(str::is_empty)
}

/// Enrich `existing` from a lower-priority duplicate: fill only what is
/// absent, never overwrite.
fn fill_missing_fields(existing: &mut Paper, other: Paper) {
    if is_empty(&existing.abstract_text) && !is_empty(&other.abstract_text) {
        existing.abstract_text = other.abstract_text;
    }
    if is_empty(&existing.doi) && !is_empty(&other.doi) {
        existing.doi = other.doi;
    }
    if is_empty(&existing.pdf_url) && !is_empty(&other.pdf_url) {
        existing.pdf_url = other.pdf_url;
        existing.is_open_access = Some(true);
    }
    if is_empty(&existing.venue) && !is_empty(&other.venue) {
        existing.venue = other.venue;
    }
    if existing.citations.is_some() || other.citations.is_some() {
        existing.citations = Some(
            existing
                .citations
                .unwrap_or(0)
                .max(other.citations.unwrap_or(0)),
        );
    }
}
