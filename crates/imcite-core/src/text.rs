//! Text cleanup helpers shared by providers and the extraction pipeline

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Naive tag stripper. Inputs are well-formed JATS/XML snippets from
    // metadata APIs, not arbitrary HTML.
    static ref TAG_PATTERN: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Strip HTML/XML tags
pub fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").to_string()
}

/// Collapse runs of two or more whitespace characters into a single space
/// and trim. A lone newline or tab is kept as-is.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}
