//! Brave Search API client — keyword web search, the default workhorse.
//!
//! Independent index, JSON API, subscription-token auth. Brave reports
//! no numeric relevance score; rank is conveyed purely by position.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ProviderSettings;
use crate::normalize;
use crate::provider::{ProviderError, SearchCapability, SearchProvider};
use crate::types::{ProviderId, RawResult, SearchQuery};

use super::{json_body, parse_published};

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

/// Brave Search API client.
pub struct BraveSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl BraveSearch {
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

#[async_trait]
impl SearchProvider for BraveSearch {
    fn id(&self) -> ProviderId {
        ProviderId::Brave
    }

    fn capabilities(&self) -> &'static [SearchCapability] {
        &[SearchCapability::Keyword]
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, ProviderError> {
        tracing::trace!(text = %query.text, "brave search");

        let count = query.max_results.unwrap_or(10).min(20).to_string();
        let mut request = self
            .client
            .get(format!("{}/res/v1/web/search", self.base_url))
            .query(&[("q", query.text.as_str()), ("count", count.as_str())])
            .header("Accept", "application/json");
        if let Some(ref locale) = query.locale {
            request = request.query(&[("search_lang", locale.as_str())]);
        }
        if let Some(ref key) = self.api_key {
            request = request.header("X-Subscription-Token", key);
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
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveHit>,
}

#[derive(Deserialize)]
struct BraveHit {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    page_age: Option<String>,
}

/// Parse a Brave web-search response body into raw results.
pub(crate) fn parse_response(body: &str) -> Result<Vec<RawResult>, ProviderError> {
    let parsed: BraveResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("brave response: {e}")))?;

    let hits = parsed.web.map(|w| w.results).unwrap_or_default();
    let results = hits
        .into_iter()
        .map(|hit| RawResult {
            title: hit.title,
            url: hit.url,
            snippet: hit.description,
            score: None,
            published: hit.page_age.as_deref().and_then(parse_published),
            provider: ProviderId::Brave,
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_BODY: &str = r#"{
        "web": {
            "results": [
                {
                    "title": "The Rust Programming Language",
                    "url": "https://www.rust-lang.org/",
                    "description": "A language empowering everyone.",
                    "page_age": "2024-01-15T09:00:00"
                },
                {
                    "title": "Rust Book",
                    "url": "https://doc.rust-lang.org/book/",
                    "description": "An introductory book."
                }
            ]
        }
    }"#;

    #[test]
    fn parse_mock_body() {
        let results = parse_response(MOCK_BODY).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "The Rust Programming Language");
        assert_eq!(results[0].provider, ProviderId::Brave);
        assert!(results[0].score.is_none());
        assert_eq!(
            results[0].published,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert!(results[1].published.is_none());
    }

    #[test]
    fn parse_empty_web_section() {
        let results = parse_response("{}").expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn parse_malformed_body_is_parse_error() {
        let err = parse_response("{\"web\": 42}").unwrap_err();
        assert_eq!(err.status, crate::types::OutcomeStatus::ParseError);
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BraveSearch>();
    }
}
