//! DOI normalization and validation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // DOI pattern: 10.<registrant, 4+ digits with optional dotted subdivisions>/<suffix>
    static ref DOI_PATTERN: Regex = Regex::new(r"^10\.\d{4,}(\.\d+)*/.+$").unwrap();
    static ref DOI_URL_PREFIX: Regex = Regex::new(r"(?i)^https?://(dx\.)?doi\.org/").unwrap();
}

/// Strip resolver URL prefixes and lowercase a DOI.
///
/// Does not validate; pair with [`is_valid_doi`] before trusting the result.
pub fn normalize_doi(doi: &str) -> String {
    let stripped = DOI_URL_PREFIX.replace(doi.trim(), "");
    stripped.to_lowercase()
}

/// Check a (already normalized) DOI against the `10.NNNN/...` pattern
pub fn is_valid_doi(doi: &str) -> bool {
    DOI_PATTERN.is_match(doi)
}

/// Normalize and validate in one step. Invalid DOIs come back as `None`
/// so callers clear the field instead of propagating garbage.
pub fn clean_doi(doi: &str) -> Option<String> {
    let normalized = normalize_doi(doi);
    if is_valid_doi(&normalized) {
        Some(normalized)
    } else {
        None
    }
}
