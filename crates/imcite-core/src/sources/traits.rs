//! Common traits for source plugins

use crate::domain::{Paper, SearchFields, SearchResult, Source};
use crate::http::HttpError;
use async_trait::async_trait;

#[derive(Debug)]
pub enum SourceError {
    Http(HttpError),
    Parse(String),
    RateLimit,
    NotFound,
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SourceError::RateLimit,
            HttpError::Status { status: 404 } => SourceError::NotFound,
            other => SourceError::Http(other),
        }
    }
}

/// Metadata about a source
pub struct SourceMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    pub supports_references: bool,
}

/// A bibliographic metadata provider.
///
/// `search` and `search_advanced` never fail: transport and parse errors are
/// absorbed at this boundary and surface as an empty result, so a fan-out
/// across providers is never aborted by one outage. `lookup_by_doi` returns
/// `None` both for "not found" and for failures.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn source(&self) -> Source;

    async fn search(&self, query: &str, limit: usize) -> SearchResult;

    /// Structured search. When `fields.doi` is set the provider bypasses
    /// keyword search and performs an exact identifier lookup.
    async fn search_advanced(&self, fields: &SearchFields, limit: usize) -> SearchResult;

    async fn lookup_by_doi(&self, doi: &str) -> Option<Paper>;
}

/// Reference-list lookup for the citation graph. Only Semantic Scholar
/// implements this today; failures surface as an empty list.
#[async_trait]
pub trait ReferenceProvider: Send + Sync {
    async fn references(&self, paper_id: &str) -> Vec<String>;
}

/// Run a provider call under the fail-soft contract: on error, log and
/// return the empty result for that source.
pub(crate) async fn fail_soft<F>(source: Source, operation: &str, fut: F) -> SearchResult
where
    F: std::future::Future<Output = Result<SearchResult, SourceError>>,
{
    match fut.await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                source = source.as_str(),
                operation,
                error = ?e,
                "provider call failed, returning empty result"
            );
            SearchResult::empty(source)
        }
    }
}
