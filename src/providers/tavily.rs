//! Tavily client — keyword search tuned for LLM consumption.
//!
//! Returns pre-summarised content snippets and a 0..1 relevance score.
//! Bearer-token auth, domain filters supported server-side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderSettings;
use crate::normalize;
use crate::provider::{ProviderError, SearchCapability, SearchProvider};
use crate::types::{ProviderId, RawResult, SearchQuery};

use super::{json_body, parse_published};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily search client.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TavilySearch {
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
struct TavilyBody<'a> {
    query: &'a str,
    max_results: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude_domains: Vec<String>,
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn id(&self) -> ProviderId {
        ProviderId::Tavily
    }

    fn capabilities(&self) -> &'static [SearchCapability] {
        &[SearchCapability::Keyword]
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, ProviderError> {
        tracing::trace!(text = %query.text, "tavily search");

        let body = TavilyBody {
            query: &query.text,
            max_results: query.max_results.unwrap_or(10),
            include_domains: query.include_domains.clone(),
            exclude_domains: query.exclude_domains.clone(),
        };

        let mut request = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
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
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Deserialize)]
struct TavilyHit {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    published_date: Option<String>,
}

/// Parse a Tavily search response body into raw results.
pub(crate) fn parse_response(body: &str) -> Result<Vec<RawResult>, ProviderError> {
    let parsed: TavilyResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("tavily response: {e}")))?;

    let results = parsed
        .results
        .into_iter()
        .map(|hit| RawResult {
            title: hit.title,
            url: hit.url,
            snippet: hit.content,
            score: hit.score,
            published: hit.published_date.as_deref().and_then(parse_published),
            provider: ProviderId::Tavily,
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_BODY: &str = r#"{
        "query": "rust web frameworks",
        "results": [
            {
                "title": "Comparison of Rust web frameworks",
                "url": "https://example.com/frameworks",
                "content": "Axum, Actix and Rocket compared.",
                "score": 0.97
            },
            {
                "title": "Axum docs",
                "url": "https://docs.rs/axum",
                "content": "Web framework built on tokio.",
                "score": 0.81,
                "published_date": "2024-06-10"
            }
        ]
    }"#;

    #[test]
    fn parse_mock_body() {
        let results = parse_response(MOCK_BODY).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, Some(0.97));
        assert_eq!(results[0].provider, ProviderId::Tavily);
        assert_eq!(
            results[1].published,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 10)
        );
    }

    #[test]
    fn parse_missing_results_key() {
        assert!(parse_response("{}").expect("should parse").is_empty());
    }

    #[test]
    fn parse_malformed_body_is_parse_error() {
        let err = parse_response(r#"{"results": "nope"}"#).unwrap_err();
        assert_eq!(err.status, crate::types::OutcomeStatus::ParseError);
    }
}
