//! imcite-core: bibliographic record reconciliation and citation-graph engine
//!
//! This library provides:
//! - Provider clients for CrossRef, Semantic Scholar, and OpenAlex with a
//!   fail-soft contract (an outage degrades to empty results, never errors)
//! - A metadata extraction pipeline run on a paper before it is persisted
//! - A reconciler merging multi-provider result sets into one deduplicated
//!   list under a source-priority order
//! - An incremental citation-graph builder (shared authorship, direct
//!   citations, second-degree links) with snapshot delivery
//! - A JSON-file-backed library store

pub mod domain;
pub mod extraction;
pub mod graph;
pub mod http;
pub mod identifiers;
pub mod reconcile;
pub mod search;
pub mod sources;
pub mod store;
pub mod text;

// Re-export main types for convenience
pub use domain::{Highlight, Paper, Rect, SearchFields, SearchResult, Source};
pub use extraction::{default_extractor, ExtractionStep, MetadataExtractor};
pub use graph::{GraphBuilder, GraphConfig, GraphEdge, GraphSnapshot};
pub use reconcile::{dedupe_key, merge_results};
pub use search::{SearchEngine, DEFAULT_LIMIT};
pub use sources::{
    CrossrefClient, OpenAlexClient, ProviderClient, ReferenceProvider, SemanticScholarClient,
    SourceError,
};
pub use store::{LibraryStore, StoreError};
