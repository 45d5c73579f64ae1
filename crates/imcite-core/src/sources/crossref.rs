//! Crossref source plugin for DOI metadata
//!
//! API docs: https://api.crossref.org/swagger-ui/index.html
//! Polite pool via mailto User-Agent.

use super::traits::{fail_soft, ProviderClient, SourceError, SourceMetadata};
use crate::domain::{Paper, SearchFields, SearchResult, Source};
use crate::http::HttpClient;
use crate::identifiers::normalize_doi;
use crate::text::strip_tags;
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.crossref.org/works";

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: CrossrefMessage,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CrossrefMessage {
    WorkList(CrossrefWorkList),
    Work(Box<CrossrefWork>),
}

#[derive(Debug, Deserialize)]
struct CrossrefWorkList {
    items: Vec<CrossrefWork>,
    #[serde(rename = "total-results")]
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CrossrefWork {
    #[serde(rename = "DOI")]
    doi: String,
    title: Option<Vec<String>>,
    author: Option<Vec<CrossrefAuthor>>,
    #[serde(rename = "container-title")]
    container_title: Option<Vec<String>>,
    #[serde(rename = "is-referenced-by-count")]
    citation_count: Option<u32>,
    #[serde(rename = "URL")]
    url: Option<String>,
    created: Option<CrossrefDate>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<i32>>>,
}

pub struct CrossrefClient {
    http: HttpClient,
}

impl CrossrefClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::default(),
        }
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "crossref",
            name: "Crossref",
            base_url: BASE_URL,
            supports_references: false,
        }
    }

    /// Parse a Crossref search response
    pub fn parse_search_response(json: &str) -> Result<SearchResult, SourceError> {
        let response: CrossrefResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Crossref JSON: {}", e)))?;

        match response.message {
            CrossrefMessage::WorkList(list) => {
                let total = list.total_results.unwrap_or(list.items.len() as u64);
                let papers = list.items.into_iter().map(map_work).collect();
                Ok(SearchResult {
                    papers,
                    total,
                    source: Source::Crossref,
                })
            }
            CrossrefMessage::Work(work) => {
                let papers = vec![map_work(*work)];
                Ok(SearchResult {
                    papers,
                    total: 1,
                    source: Source::Crossref,
                })
            }
        }
    }

    /// Parse a single-work response (DOI lookup)
    pub fn parse_work_response(json: &str) -> Result<Paper, SourceError> {
        let response: CrossrefResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Crossref JSON: {}", e)))?;

        match response.message {
            CrossrefMessage::Work(work) => Ok(map_work(*work)),
            _ => Err(SourceError::Parse("Unexpected response format".to_string())),
        }
    }

    async fn search_inner(&self, query: &str, limit: usize) -> Result<SearchResult, SourceError> {
        let rows = limit.to_string();
        let body = self
            .http
            .get_with_params(
                BASE_URL,
                &[("query", query), ("rows", &rows), ("sort", "relevance")],
            )
            .await?;
        Self::parse_search_response(&body)
    }

    async fn search_advanced_inner(
        &self,
        fields: &SearchFields,
        limit: usize,
    ) -> Result<SearchResult, SourceError> {
        let rows = limit.to_string();
        let mut params: Vec<(&str, String)> = vec![("rows", rows)];

        if let Some(title) = &fields.title {
            params.push(("query.title", title.clone()));
        }
        if let Some(author) = &fields.author {
            params.push(("query.author", author.clone()));
        }
        if let Some(venue) = &fields.venue {
            params.push(("query.container-title", venue.clone()));
        }
        let mut filters = Vec::new();
        if let Some(from) = fields.year_from {
            filters.push(format!("from-pub-date:{}-01-01", from));
        }
        if let Some(to) = fields.year_to {
            filters.push(format!("until-pub-date:{}-12-31", to));
        }
        if !filters.is_empty() {
            params.push(("filter", filters.join(",")));
        }

        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = self.http.get_with_params(BASE_URL, &borrowed).await?;
        Self::parse_search_response(&body)
    }

    async fn lookup_inner(&self, doi: &str) -> Result<Paper, SourceError> {
        let doi = normalize_doi(doi);
        let url = format!("{}/{}", BASE_URL, urlencoding::encode(&doi));
        let body = self.http.get(&url).await?;
        Self::parse_work_response(&body)
    }
}

impl Default for CrossrefClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for CrossrefClient {
    fn source(&self) -> Source {
        Source::Crossref
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResult {
        fail_soft(Source::Crossref, "search", self.search_inner(query, limit)).await
    }

    async fn search_advanced(&self, fields: &SearchFields, limit: usize) -> SearchResult {
        if fields.doi.is_some() {
            let paper = self.lookup_by_doi(fields.doi.as_deref().unwrap_or_default()).await;
            let total = paper.is_some() as u64;
            return SearchResult {
                papers: paper.into_iter().collect(),
                total,
                source: Source::Crossref,
            };
        }
        fail_soft(
            Source::Crossref,
            "search_advanced",
            self.search_advanced_inner(fields, limit),
        )
        .await
    }

    async fn lookup_by_doi(&self, doi: &str) -> Option<Paper> {
        match self.lookup_inner(doi).await {
            Ok(paper) => Some(paper),
            Err(e) => {
                tracing::debug!(doi, error = ?e, "Crossref DOI lookup failed");
                None
            }
        }
    }
}

fn map_work(work: CrossrefWork) -> Paper {
    let authors = work
        .author
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| {
            let name = format!(
                "{} {}",
                a.given.unwrap_or_default(),
                a.family.unwrap_or_default()
            )
            .trim()
            .to_string();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        })
        .collect();

    let title = work
        .title
        .and_then(|t| t.into_iter().next())
        .unwrap_or_else(|| "Untitled".to_string());

    let year = work
        .created
        .and_then(|d| d.date_parts)
        .and_then(|dp| dp.into_iter().next())
        .and_then(|parts| parts.into_iter().next());

    // Crossref abstracts usually carry JATS XML markup
    let abstract_text = work.abstract_text.map(|a| strip_tags(&a));

    let mut paper = Paper::new(work.doi.clone(), title, authors);
    paper.doi = Some(work.doi);
    paper.url = work.url;
    paper.venue = work.container_title.and_then(|t| t.into_iter().next());
    paper.citations = Some(work.citation_count.unwrap_or(0));
    paper.year = year;
    paper.abstract_text = abstract_text;
    paper
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "message": {
            "total-results": 187,
            "items": [{
                "DOI": "10.1234/test",
                "title": ["A Test Paper"],
                "author": [{"given": "John", "family": "Smith"}, {"family": "Doe"}],
                "container-title": ["Test Journal"],
                "created": {"date-parts": [[2023, 1, 15]]},
                "is-referenced-by-count": 42,
                "URL": "https://doi.org/10.1234/test",
                "abstract": "<jats:p>An abstract.</jats:p>"
            }]
        }
    }"#;

    const SAMPLE_WORK: &str = r#"{
        "message": {
            "DOI": "10.5555/single",
            "title": ["Single Work"],
            "created": {"date-parts": [[2019]]}
        }
    }"#;

    #[test]
    fn test_parse_search_response() {
        let result = CrossrefClient::parse_search_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(result.total, 187);
        assert_eq!(result.source, Source::Crossref);
        assert_eq!(result.papers.len(), 1);

        let paper = &result.papers[0];
        assert_eq!(paper.id, "10.1234/test");
        assert_eq!(paper.doi.as_deref(), Some("10.1234/test"));
        assert_eq!(paper.authors, vec!["John Smith", "Doe"]);
        assert_eq!(paper.venue.as_deref(), Some("Test Journal"));
        assert_eq!(paper.citations, Some(42));
        assert_eq!(paper.year, Some(2023));
        assert_eq!(paper.abstract_text.as_deref(), Some("An abstract."));
    }

    #[test]
    fn test_parse_work_response() {
        let paper = CrossrefClient::parse_work_response(SAMPLE_WORK).unwrap();
        assert_eq!(paper.id, "10.5555/single");
        assert_eq!(paper.title, "Single Work");
        assert_eq!(paper.year, Some(2019));
        assert!(paper.authors.is_empty());
        // Absent citation count defaults to zero, never null
        assert_eq!(paper.citations, Some(0));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(CrossrefClient::parse_search_response("{not json").is_err());
    }
}
