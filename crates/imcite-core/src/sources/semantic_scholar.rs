//! Semantic Scholar source plugin
//!
//! Graph API docs: https://api.semanticscholar.org/api-docs/graph
//! Public pool is rate limited; reference lookups stay sequential upstream.

use super::traits::{fail_soft, ProviderClient, ReferenceProvider, SourceError, SourceMetadata};
use crate::domain::{Paper, SearchFields, SearchResult, Source};
use crate::http::HttpClient;
use crate::identifiers::normalize_doi;
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1/paper";

const SEARCH_FIELDS: &str =
    "paperId,title,authors,abstract,citationCount,venue,year,url,publicationTypes,openAccessPdf,externalIds";

/// Page size cap for reference lookups
const REFERENCES_PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    data: Option<Vec<S2Paper>>,
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: String,
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i32>,
    citation_count: Option<u32>,
    venue: Option<String>,
    url: Option<String>,
    publication_types: Option<Vec<String>>,
    open_access_pdf: Option<S2OpenAccessPdf>,
    external_ids: Option<S2ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: String,
}

#[derive(Debug, Deserialize)]
struct S2OpenAccessPdf {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ReferencesResponse {
    data: Option<Vec<S2ReferenceEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2ReferenceEntry {
    cited_paper: Option<S2CitedPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2CitedPaper {
    paper_id: Option<String>,
}

pub struct SemanticScholarClient {
    http: HttpClient,
}

impl SemanticScholarClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::default(),
        }
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "semanticscholar",
            name: "Semantic Scholar",
            base_url: BASE_URL,
            supports_references: true,
        }
    }

    /// Parse a Semantic Scholar search response
    pub fn parse_search_response(json: &str) -> Result<SearchResult, SourceError> {
        let response: S2SearchResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Semantic Scholar JSON: {}", e)))?;

        let papers: Vec<Paper> = response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(map_paper)
            .collect();
        let total = response.total.unwrap_or(papers.len() as u64);

        Ok(SearchResult {
            papers,
            total,
            source: Source::SemanticScholar,
        })
    }

    /// Parse a single-paper response (DOI lookup)
    pub fn parse_paper_response(json: &str) -> Result<Paper, SourceError> {
        let paper: S2Paper = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Semantic Scholar JSON: {}", e)))?;
        Ok(map_paper(paper))
    }

    /// Parse a references response into cited paper ids
    pub fn parse_references_response(json: &str) -> Result<Vec<String>, SourceError> {
        let response: S2ReferencesResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid references JSON: {}", e)))?;

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| r.cited_paper.and_then(|p| p.paper_id))
            .collect())
    }

    async fn search_inner(&self, query: &str, limit: usize) -> Result<SearchResult, SourceError> {
        let limit = limit.to_string();
        let url = format!("{}/search", BASE_URL);
        let body = self
            .http
            .get_with_params(
                &url,
                &[
                    ("query", query),
                    ("limit", &limit),
                    ("fields", SEARCH_FIELDS),
                ],
            )
            .await?;
        Self::parse_search_response(&body)
    }

    async fn search_advanced_inner(
        &self,
        fields: &SearchFields,
        limit: usize,
    ) -> Result<SearchResult, SourceError> {
        // The search endpoint takes one free-text query; structured hints go
        // into dedicated parameters where the API has them.
        let mut query_parts = Vec::new();
        if let Some(title) = &fields.title {
            query_parts.push(title.clone());
        }
        if let Some(author) = &fields.author {
            query_parts.push(author.clone());
        }
        let query = query_parts.join(" ");

        let limit = limit.to_string();
        let mut params: Vec<(&str, String)> = vec![
            ("query", query),
            ("limit", limit),
            ("fields", SEARCH_FIELDS.to_string()),
        ];
        if let Some(venue) = &fields.venue {
            params.push(("venue", venue.clone()));
        }
        match (fields.year_from, fields.year_to) {
            (Some(from), Some(to)) => params.push(("year", format!("{}-{}", from, to))),
            (Some(from), None) => params.push(("year", format!("{}-", from))),
            (None, Some(to)) => params.push(("year", format!("-{}", to))),
            (None, None) => {}
        }

        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let url = format!("{}/search", BASE_URL);
        let body = self.http.get_with_params(&url, &borrowed).await?;
        Self::parse_search_response(&body)
    }

    async fn lookup_inner(&self, doi: &str) -> Result<Paper, SourceError> {
        let doi = normalize_doi(doi);
        let url = format!("{}/DOI:{}", BASE_URL, urlencoding::encode(&doi));
        let body = self
            .http
            .get_with_params(&url, &[("fields", SEARCH_FIELDS)])
            .await?;
        Self::parse_paper_response(&body)
    }
}

impl Default for SemanticScholarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for SemanticScholarClient {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResult {
        fail_soft(
            Source::SemanticScholar,
            "search",
            self.search_inner(query, limit),
        )
        .await
    }

    async fn search_advanced(&self, fields: &SearchFields, limit: usize) -> SearchResult {
        if fields.doi.is_some() {
            let paper = self.lookup_by_doi(fields.doi.as_deref().unwrap_or_default()).await;
            let total = paper.is_some() as u64;
            return SearchResult {
                papers: paper.into_iter().collect(),
                total,
                source: Source::SemanticScholar,
            };
        }
        fail_soft(
            Source::SemanticScholar,
            "search_advanced",
            self.search_advanced_inner(fields, limit),
        )
        .await
    }

    async fn lookup_by_doi(&self, doi: &str) -> Option<Paper> {
        match self.lookup_inner(doi).await {
            Ok(paper) => Some(paper),
            Err(e) => {
                tracing::debug!(doi, error = ?e, "Semantic Scholar DOI lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl ReferenceProvider for SemanticScholarClient {
    async fn references(&self, paper_id: &str) -> Vec<String> {
        let limit = REFERENCES_PAGE_LIMIT.to_string();
        let url = format!("{}/{}/references", BASE_URL, urlencoding::encode(paper_id));
        let body = match self
            .http
            .get_with_params(&url, &[("fields", "paperId"), ("limit", &limit)])
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(paper_id, error = ?e, "reference fetch failed");
                return Vec::new();
            }
        };

        match Self::parse_references_response(&body) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(paper_id, error = ?e, "reference parse failed");
                Vec::new()
            }
        }
    }
}

fn map_paper(paper: S2Paper) -> Paper {
    let authors = paper
        .authors
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.name)
        .collect();

    let is_open_access = paper.open_access_pdf.is_some();
    let pdf_url = paper.open_access_pdf.and_then(|p| p.url);

    let mut mapped = Paper::new(
        paper.paper_id,
        paper.title.unwrap_or_else(|| "Untitled".to_string()),
        authors,
    );
    mapped.abstract_text = paper.abstract_text;
    mapped.doi = paper.external_ids.and_then(|ids| ids.doi);
    mapped.citations = Some(paper.citation_count.unwrap_or(0));
    mapped.year = paper.year;
    mapped.venue = paper.venue.filter(|v| !v.is_empty());
    mapped.url = paper.url;
    mapped.publication_type = paper
        .publication_types
        .and_then(|t| t.into_iter().next());
    mapped.is_open_access = Some(is_open_access);
    mapped.pdf_url = pdf_url;
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "total": 512,
        "data": [{
            "paperId": "649def34f8be52c8b66281af98ae884c09aef38b",
            "title": "Attention Is All You Need",
            "authors": [{"name": "Ashish Vaswani"}, {"name": "Noam Shazeer"}],
            "abstract": "The dominant sequence transduction models...",
            "year": 2017,
            "citationCount": 90000,
            "venue": "NeurIPS",
            "url": "https://www.semanticscholar.org/paper/649def",
            "publicationTypes": ["JournalArticle", "Conference"],
            "openAccessPdf": {"url": "https://arxiv.org/pdf/1706.03762.pdf", "status": "GREEN"},
            "externalIds": {"DOI": "10.5555/3295222", "ArXiv": "1706.03762"}
        }]
    }"#;

    const SAMPLE_REFERENCES: &str = r#"{
        "data": [
            {"citedPaper": {"paperId": "abc"}},
            {"citedPaper": {"paperId": null}},
            {"citedPaper": null},
            {"citedPaper": {"paperId": "def"}}
        ]
    }"#;

    #[test]
    fn test_parse_search_response() {
        let result = SemanticScholarClient::parse_search_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(result.total, 512);
        assert_eq!(result.source, Source::SemanticScholar);

        let paper = &result.papers[0];
        assert_eq!(paper.id, "649def34f8be52c8b66281af98ae884c09aef38b");
        assert_eq!(paper.authors.len(), 2);
        assert_eq!(paper.doi.as_deref(), Some("10.5555/3295222"));
        assert_eq!(paper.publication_type.as_deref(), Some("JournalArticle"));
        assert_eq!(paper.is_open_access, Some(true));
        assert_eq!(
            paper.pdf_url.as_deref(),
            Some("https://arxiv.org/pdf/1706.03762.pdf")
        );
    }

    #[test]
    fn test_parse_search_response_empty_data() {
        let result = SemanticScholarClient::parse_search_response("{}").unwrap();
        assert!(result.papers.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_parse_references_skips_null_ids() {
        let ids = SemanticScholarClient::parse_references_response(SAMPLE_REFERENCES).unwrap();
        assert_eq!(ids, vec!["abc".to_string(), "def".to_string()]);
    }
}
