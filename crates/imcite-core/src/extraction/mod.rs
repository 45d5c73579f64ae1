//! Metadata extraction pipeline
//!
//! An ordered chain of idempotent cleanup steps applied to a single paper
//! before it is persisted. A step that fails is logged and skipped; the
//! pipeline continues with the pre-step value, so enrichment can never block
//! saving a paper.

use crate::domain::Paper;
use crate::identifiers::clean_doi;
use crate::text::{collapse_whitespace, strip_tags};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("extraction step failed: {0}")]
pub struct StepError(pub String);

/// One named transformation over a paper
pub trait ExtractionStep: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, paper: Paper) -> Result<Paper, StepError>;
}

/// Runs registered steps in registration order, fail-open per step, and
/// stamps `enriched_at` when done.
#[derive(Default)]
pub struct MetadataExtractor {
    steps: Vec<Box<dyn ExtractionStep>>,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn register(&mut self, step: Box<dyn ExtractionStep>) {
        self.steps.push(step);
    }

    pub fn enrich(&self, paper: Paper) -> Paper {
        let mut enriched = paper;
        for step in &self.steps {
            match step.apply(enriched.clone()) {
                Ok(next) => enriched = next,
                Err(e) => {
                    tracing::warn!(step = step.name(), error = %e, "skipping failed step");
                }
            }
        }
        enriched.enriched_at = Some(chrono::Utc::now().timestamp_millis());
        enriched
    }
}

/// Trims whitespace from the title and each author name
pub struct Formatter;

impl ExtractionStep for Formatter {
    fn name(&self) -> &'static str {
        "formatter"
    }

    fn apply(&self, mut paper: Paper) -> Result<Paper, StepError> {
        paper.title = paper.title.trim().to_string();
        paper.authors = paper
            .authors
            .into_iter()
            .map(|a| a.trim().to_string())
            .collect();
        Ok(paper)
    }
}

/// Strips markup from the abstract and collapses whitespace
pub struct AbstractCleaner;

impl ExtractionStep for AbstractCleaner {
    fn name(&self) -> &'static str {
        "abstract_cleaner"
    }

    fn apply(&self, mut paper: Paper) -> Result<Paper, StepError> {
        if let Some(abstract_text) = paper.abstract_text {
            paper.abstract_text = Some(collapse_whitespace(&strip_tags(&abstract_text)));
        }
        Ok(paper)
    }
}

/// Normalizes the DOI and clears it when it fails validation
pub struct DoiValidator;

impl ExtractionStep for DoiValidator {
    fn name(&self) -> &'static str {
        "doi_validator"
    }

    fn apply(&self, mut paper: Paper) -> Result<Paper, StepError> {
        if let Some(doi) = &paper.doi {
            paper.doi = clean_doi(doi);
        }
        Ok(paper)
    }
}

/// Title-cases author names and deduplicates them case-insensitively,
/// keeping first-occurrence order. Runs last so it sees trimmed names.
pub struct AuthorNormalizer;

impl ExtractionStep for AuthorNormalizer {
    fn name(&self) -> &'static str {
        "author_normalizer"
    }

    fn apply(&self, mut paper: Paper) -> Result<Paper, StepError> {
        if paper.authors.is_empty() {
            return Ok(paper);
        }

        let mut seen = std::collections::HashSet::new();
        let mut unique = Vec::new();
        for author in &paper.authors {
            let normalized = title_case(author.trim());
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized.to_lowercase()) {
                unique.push(normalized);
            }
        }
        paper.authors = unique;
        Ok(paper)
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Factory: the canonical pipeline in its required order
pub fn default_extractor() -> MetadataExtractor {
    let mut extractor = MetadataExtractor::new();
    extractor.register(Box::new(Formatter));
    extractor.register(Box::new(AbstractCleaner));
    extractor.register(Box::new(DoiValidator));
    extractor.register(Box::new(AuthorNormalizer));
    extractor
}
