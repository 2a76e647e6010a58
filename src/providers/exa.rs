//! Exa client — neural/embeddings search.
//!
//! The one provider that reports a meaningful relevance score, so the
//! `merge` strategy has something real to normalise. Supports domain
//! and published-date filters server-side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderSettings;
use crate::normalize;
use crate::provider::{ProviderError, SearchCapability, SearchProvider};
use crate::types::{ProviderId, RawResult, SearchQuery};

use super::{json_body, parse_published};

const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Exa search client.
pub struct ExaSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ExaSearch {
    /// Build a client against the configured (or default) endpoint.
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaBody<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude_domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_published_date: Option<String>,
}

#[async_trait]
impl SearchProvider for ExaSearch {
    fn id(&self) -> ProviderId {
        ProviderId::Exa
    }

    fn capabilities(&self) -> &'static [SearchCapability] {
        &[SearchCapability::Neural]
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, ProviderError> {
        tracing::trace!(text = %query.text, "exa search");

        let body = ExaBody {
            query: &query.text,
            num_results: query.max_results.unwrap_or(10),
            include_domains: query.include_domains.clone(),
            exclude_domains: query.exclude_domains.clone(),
            start_published_date: query
                .date_range
                .and_then(|r| r.after)
                .map(|d| d.format("%Y-%m-%d").to_string()),
            end_published_date: query
                .date_range
                .and_then(|r| r.before)
                .map(|d| d.format("%Y-%m-%d").to_string()),
        };

        let mut request = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| normalize::from_transport(&e))?;
        let body = json_body(response).await?;
        parse_response(&body)
    }
}

#[derive(Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaHit>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaHit {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Parse an Exa search response body into raw results.
pub(crate) fn parse_response(body: &str) -> Result<Vec<RawResult>, ProviderError> {
    let parsed: ExaResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::parse(format!("exa response: {e}")))?;

    let results = parsed
        .results
        .into_iter()
        .map(|hit| RawResult {
            title: hit.title.unwrap_or_else(|| hit.url.clone()),
            snippet: hit.text.map(snippet_of).unwrap_or_default(),
            url: hit.url,
            score: hit.score,
            published: hit.published_date.as_deref().and_then(parse_published),
            provider: ProviderId::Exa,
        })
        .collect();
    Ok(results)
}

/// First few hundred characters of page text, on a char boundary.
fn snippet_of(text: String) -> String {
    const LIMIT: usize = 280;
    if text.len() <= LIMIT {
        return text;
    }
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_BODY: &str = r#"{
        "results": [
            {
                "title": "Async Rust in practice",
                "url": "https://example.com/async",
                "score": 0.912,
                "publishedDate": "2023-11-02T00:00:00.000Z",
                "text": "Async Rust lets you write concurrent programs without threads."
            },
            {
                "title": null,
                "url": "https://example.com/untitled",
                "score": 0.44
            }
        ]
    }"#;

    #[test]
    fn parse_mock_body() {
        let results = parse_response(MOCK_BODY).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, Some(0.912));
        assert_eq!(
            results[0].published,
            chrono::NaiveDate::from_ymd_opt(2023, 11, 2)
        );
        assert!(results[0].snippet.contains("concurrent"));
        // Missing title falls back to the URL.
        assert_eq!(results[1].title, "https://example.com/untitled");
    }

    #[test]
    fn parse_empty_results() {
        assert!(parse_response(r#"{"results":[]}"#)
            .expect("should parse")
            .is_empty());
        assert!(parse_response("{}").expect("should parse").is_empty());
    }

    #[test]
    fn parse_malformed_body_is_parse_error() {
        let err = parse_response(r#"{"results": 42}"#).unwrap_err();
        assert_eq!(err.status, crate::types::OutcomeStatus::ParseError);
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let long = "é".repeat(400);
        let snippet = snippet_of(long);
        assert!(snippet.len() <= 280);
        assert!(snippet.chars().all(|c| c == 'é'));
    }
}
