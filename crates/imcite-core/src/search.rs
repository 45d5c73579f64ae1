//! Multi-provider search orchestration
//!
//! Fans a query out to every configured provider concurrently, then hands
//! the result sets to the reconciler. Providers are injected, not ambient,
//! so the engine is testable without live endpoints. Merge precedence comes
//! from the priority list, never from completion order.

use crate::domain::{Paper, SearchFields, Source};
use crate::reconcile::merge_results;
use crate::sources::{CrossrefClient, OpenAlexClient, ProviderClient, SemanticScholarClient};
use std::sync::Arc;

pub const DEFAULT_LIMIT: usize = 10;

pub struct SearchEngine {
    clients: Vec<Arc<dyn ProviderClient>>,
    priority: Vec<Source>,
}

impl SearchEngine {
    pub fn new(clients: Vec<Arc<dyn ProviderClient>>, priority: Vec<Source>) -> Self {
        Self { clients, priority }
    }

    /// All three providers, Semantic Scholar results taking precedence
    pub fn with_default_providers() -> Self {
        Self::new(
            vec![
                Arc::new(SemanticScholarClient::new()),
                Arc::new(CrossrefClient::new()),
                Arc::new(OpenAlexClient::new()),
            ],
            vec![
                Source::SemanticScholar,
                Source::Crossref,
                Source::OpenAlex,
            ],
        )
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<Paper> {
        let calls = self.clients.iter().map(|c| c.search(query, limit));
        let results = futures::future::join_all(calls).await;
        merge_results(results, &self.priority)
    }

    pub async fn search_advanced(&self, fields: &SearchFields, limit: usize) -> Vec<Paper> {
        let calls = self
            .clients
            .iter()
            .map(|c| c.search_advanced(fields, limit));
        let results = futures::future::join_all(calls).await;
        merge_results(results, &self.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SearchResult;
    use async_trait::async_trait;

    /// A provider whose transport always fails; the fail-soft contract
    /// turns that into an empty result.
    struct BrokenProvider(Source);

    #[async_trait]
    impl ProviderClient for BrokenProvider {
        fn source(&self) -> Source {
            self.0
        }

        async fn search(&self, _query: &str, _limit: usize) -> SearchResult {
            SearchResult::empty(self.0)
        }

        async fn search_advanced(&self, _fields: &SearchFields, _limit: usize) -> SearchResult {
            SearchResult::empty(self.0)
        }

        async fn lookup_by_doi(&self, _doi: &str) -> Option<Paper> {
            None
        }
    }

    struct FixedProvider {
        source: Source,
        papers: Vec<Paper>,
    }

    #[async_trait]
    impl ProviderClient for FixedProvider {
        fn source(&self) -> Source {
            self.source
        }

        async fn search(&self, _query: &str, _limit: usize) -> SearchResult {
            SearchResult {
                papers: self.papers.clone(),
                total: self.papers.len() as u64,
                source: self.source,
            }
        }

        async fn search_advanced(&self, _fields: &SearchFields, _limit: usize) -> SearchResult {
            self.search("", 0).await
        }

        async fn lookup_by_doi(&self, _doi: &str) -> Option<Paper> {
            self.papers.first().cloned()
        }
    }

    #[tokio::test]
    async fn test_one_broken_provider_does_not_abort_fanout() {
        let paper = Paper::new("id1".to_string(), "Survives".to_string(), vec![]);
        let engine = SearchEngine::new(
            vec![
                Arc::new(BrokenProvider(Source::Crossref)),
                Arc::new(FixedProvider {
                    source: Source::SemanticScholar,
                    papers: vec![paper],
                }),
            ],
            vec![Source::SemanticScholar, Source::Crossref],
        );

        let merged = engine.search("anything", 10).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Survives");
    }

    #[tokio::test]
    async fn test_fanout_merges_by_priority_not_completion() {
        let mut s2 = Paper::new("s2id".to_string(), "T".to_string(), vec![]);
        s2.doi = Some("10.1/x".to_string());
        let mut cr = Paper::new("10.1/x".to_string(), "T".to_string(), vec![]);
        cr.doi = Some("10.1/x".to_string());
        cr.venue = Some("Nature".to_string());

        let engine = SearchEngine::new(
            vec![
                // Listed first, but lower priority
                Arc::new(FixedProvider {
                    source: Source::Crossref,
                    papers: vec![cr],
                }),
                Arc::new(FixedProvider {
                    source: Source::SemanticScholar,
                    papers: vec![s2],
                }),
            ],
            vec![Source::SemanticScholar, Source::Crossref],
        );

        let merged = engine.search("t", 10).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "s2id");
        assert_eq!(merged[0].venue.as_deref(), Some("Nature"));
    }
}
