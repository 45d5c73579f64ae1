//! OpenAlex source plugin
//!
//! API docs: https://docs.openalex.org/
//! Abstracts come back as an inverted index and are reconstructed here.

use super::traits::{fail_soft, ProviderClient, SourceError, SourceMetadata};
use crate::domain::{Paper, SearchFields, SearchResult, Source};
use crate::http::HttpClient;
use crate::identifiers::normalize_doi;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

const BASE_URL: &str = "https://api.openalex.org/works";

#[derive(Debug, Deserialize)]
struct OpenAlexResponse {
    meta: Option<OpenAlexMeta>,
    results: Option<Vec<OpenAlexWork>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexMeta {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: String,
    title: Option<String>,
    publication_year: Option<i32>,
    doi: Option<String>,
    primary_location: Option<OpenAlexLocation>,
    best_oa_location: Option<OpenAlexOaLocation>,
    open_access: Option<OpenAlexOpenAccess>,
    authorships: Option<Vec<OpenAlexAuthorship>>,
    abstract_inverted_index: Option<HashMap<String, Vec<u32>>>,
    cited_by_count: Option<u32>,
    type_crossref: Option<String>,
    #[serde(rename = "type")]
    work_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexLocation {
    source: Option<OpenAlexVenueSource>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexVenueSource {
    display_name: Option<String>,
    host_organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexOaLocation {
    pdf_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexOpenAccess {
    is_oa: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    author: Option<OpenAlexAuthor>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthor {
    display_name: Option<String>,
}

pub struct OpenAlexClient {
    http: HttpClient,
}

impl OpenAlexClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::default(),
        }
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "openalex",
            name: "OpenAlex",
            base_url: BASE_URL,
            supports_references: false,
        }
    }

    /// Parse an OpenAlex works response
    pub fn parse_search_response(json: &str) -> Result<SearchResult, SourceError> {
        let response: OpenAlexResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid OpenAlex JSON: {}", e)))?;

        let papers: Vec<Paper> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(map_work)
            .collect();
        let total = response.meta.and_then(|m| m.count).unwrap_or(0);

        Ok(SearchResult {
            papers,
            total,
            source: Source::OpenAlex,
        })
    }

    async fn search_inner(&self, query: &str, limit: usize) -> Result<SearchResult, SourceError> {
        let per_page = limit.to_string();
        let body = self
            .http
            .get_with_params(BASE_URL, &[("search", query), ("per-page", &per_page)])
            .await?;
        Self::parse_search_response(&body)
    }

    async fn search_advanced_inner(
        &self,
        fields: &SearchFields,
        limit: usize,
    ) -> Result<SearchResult, SourceError> {
        let per_page = limit.to_string();
        let mut params: Vec<(&str, String)> = vec![("per-page", per_page)];
        let mut filters: Vec<String> = Vec::new();

        if let Some(title) = &fields.title {
            params.push(("search", title.clone()));
        }
        if let Some(author) = &fields.author {
            filters.push(format!(
                "authorships.author.display_name.search:{}",
                author
            ));
        }
        if let Some(venue) = &fields.venue {
            filters.push(format!(
                "primary_location.source.display_name.search:{}",
                venue
            ));
        }
        match (fields.year_from, fields.year_to) {
            (Some(from), Some(to)) => filters.push(format!("publication_year:{}-{}", from, to)),
            (Some(from), None) => filters.push(format!("publication_year:>{}", from - 1)),
            (None, Some(to)) => filters.push(format!("publication_year:<{}", to + 1)),
            (None, None) => {}
        }
        if !filters.is_empty() {
            params.push(("filter", filters.join(",")));
        }

        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = self.http.get_with_params(BASE_URL, &borrowed).await?;
        Self::parse_search_response(&body)
    }

    async fn lookup_inner(&self, doi: &str) -> Result<Option<Paper>, SourceError> {
        // OpenAlex expects the full resolver URL in the doi filter
        let doi = normalize_doi(doi);
        let filter = format!("filter=doi:https://doi.org/{}", doi);
        let url = format!("{}?{}", BASE_URL, filter);
        let body = self.http.get(&url).await?;
        let result = Self::parse_search_response(&body)?;
        Ok(result.papers.into_iter().next())
    }
}

impl Default for OpenAlexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for OpenAlexClient {
    fn source(&self) -> Source {
        Source::OpenAlex
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResult {
        fail_soft(Source::OpenAlex, "search", self.search_inner(query, limit)).await
    }

    async fn search_advanced(&self, fields: &SearchFields, limit: usize) -> SearchResult {
        if fields.doi.is_some() {
            let paper = self.lookup_by_doi(fields.doi.as_deref().unwrap_or_default()).await;
            let total = paper.is_some() as u64;
            return SearchResult {
                papers: paper.into_iter().collect(),
                total,
                source: Source::OpenAlex,
            };
        }
        fail_soft(
            Source::OpenAlex,
            "search_advanced",
            self.search_advanced_inner(fields, limit),
        )
        .await
    }

    async fn lookup_by_doi(&self, doi: &str) -> Option<Paper> {
        match self.lookup_inner(doi).await {
            Ok(paper) => paper,
            Err(e) => {
                tracing::debug!(doi, error = ?e, "OpenAlex DOI lookup failed");
                None
            }
        }
    }
}

/// Rebuild abstract text from OpenAlex's inverted-index representation.
///
/// Word order is only recoverable by flattening to (word, position) pairs
/// and sorting by position globally.
fn decode_inverted_index(index: &HashMap<String, Vec<u32>>) -> String {
    let mut pairs: Vec<(&str, u32)> = Vec::new();
    for (word, positions) in index {
        for &pos in positions {
            pairs.push((word.as_str(), pos));
        }
    }
    pairs.sort_by_key(|&(_, pos)| pos);
    pairs
        .into_iter()
        .map(|(word, _)| word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn map_work(work: OpenAlexWork) -> Paper {
    let doi = work.doi.as_deref().map(normalize_doi);

    let venue = work.primary_location.and_then(|l| l.source).and_then(|s| {
        s.display_name.or(s.host_organization_name)
    });

    let is_oa = work
        .open_access
        .and_then(|oa| oa.is_oa)
        .unwrap_or(false);
    let pdf_url = if is_oa {
        work.best_oa_location.and_then(|l| l.pdf_url)
    } else {
        None
    };

    let authors = work
        .authorships
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.author.and_then(|a| a.display_name))
        .collect();

    let abstract_text = work
        .abstract_inverted_index
        .as_ref()
        .map(decode_inverted_index);

    let mut paper = Paper::new(
        work.id.clone(),
        work.title.unwrap_or_else(|| "Untitled".to_string()),
        authors,
    );
    paper.year = work.publication_year;
    paper.venue = venue;
    paper.doi = doi;
    paper.abstract_text = abstract_text;
    paper.citations = Some(work.cited_by_count.unwrap_or(0));
    // The OpenAlex id doubles as a landing URL
    paper.url = Some(work.id);
    paper.pdf_url = pdf_url;
    paper.publication_type = work.type_crossref.or(work.work_type);
    paper.is_open_access = Some(is_oa);
    paper
}
