//! FxTwitter client — social-content search and post extraction.
//!
//! One vendor, two roles: it joins the search fan-out when the router
//! detects social markers in the query, and sits at the head of the
//! scrape chain for twitter.com/x.com URLs. Keyless JSON API.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::ProviderSettings;
use crate::normalize;
use crate::provider::{
    Extraction, ProviderError, ScrapeCapability, ScrapeProvider, SearchCapability, SearchProvider,
};
use crate::types::{
    ContentFormat, ExtractionMetadata, ProviderId, RawResult, ScrapeRequest, SearchQuery,
};

use super::{json_body, parse_published};

const DEFAULT_BASE_URL: &str = "https://api.fxtwitter.com";

/// FxTwitter client for both search and extraction.
pub struct FxTwitterClient {
    client: reqwest::Client,
    base_url: String,
}

impl FxTwitterClient {
    /// Build a client against the configured (or default) endpoint.
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl SearchProvider for FxTwitterClient {
    fn id(&self) -> ProviderId {
        ProviderId::FxTwitter
    }

    fn capabilities(&self) -> &'static [SearchCapability] {
        &[SearchCapability::Social]
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, ProviderError> {
        tracing::trace!(text = %query.text, "fxtwitter search");

        let count = query.max_results.unwrap_or(10).to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query.text.as_str()), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| normalize::from_transport(&e))?;
        let body = json_body(response).await?;
        parse_search_response(&body)
    }
}

#[async_trait]
impl ScrapeProvider for FxTwitterClient {
    fn id(&self) -> ProviderId {
        ProviderId::FxTwitter
    }

    fn capabilities(&self) -> &'static [ScrapeCapability] {
        &[ScrapeCapability::Social]
    }

    async fn fetch(&self, request: &ScrapeRequest) -> Result<Extraction, ProviderError> {
        // Permanent failure for URLs this extractor cannot address — the
        // orchestrator advances the chain without retrying.
        let (user, id) = status_path(&request.url).ok_or_else(|| {
            ProviderError::parse(format!("not a post URL: {}", request.url))
        })?;

        tracing::trace!(user, id, "fxtwitter fetch");

        let response = self
            .client
            .get(format!("{}/{user}/status/{id}", self.base_url))
            .send()
            .await
            .map_err(|e| normalize::from_transport(&e))?;
        let body = json_body(response).await?;
        parse_status_response(&body, request.format)
    }
}

/// Pull `(user, status id)` out of a twitter.com/x.com post URL.
fn status_path(raw: &str) -> Option<(String, String)> {
    let parsed = Url::parse(raw).ok()?;
    let mut segments = parsed.path_segments()?;
    let user = segments.next()?.to_string();
    if segments.next()? != "status" {
        return None;
    }
    let id: String = segments
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if user.is_empty() || id.is_empty() {
        return None;
    }
    Some((user, id))
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tweets: Vec<Tweet>,
}

#[derive(Deserialize)]
struct StatusResponse {
    code: u32,
    #[serde(default)]
    tweet: Option<Tweet>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct Tweet {
    #[serde(default)]
    text: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    author: Author,
}

#[derive(Deserialize)]
struct Author {
    name: String,
    screen_name: String,
}

/// Parse a social search response into raw results.
pub(crate) fn parse_search_response(body: &str) -> Result<Vec<RawResult>, ProviderError> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("fxtwitter search response: {e}")))?;

    let results = parsed
        .tweets
        .into_iter()
        .filter_map(|tweet| {
            let url = tweet.url.clone()?;
            Some(RawResult {
                title: format!("{} (@{})", tweet.author.name, tweet.author.screen_name),
                snippet: tweet.text,
                url,
                score: None,
                published: tweet.created_at.as_deref().and_then(parse_published),
                provider: ProviderId::FxTwitter,
            })
        })
        .collect();
    Ok(results)
}

/// Parse a status lookup into an extraction.
///
/// FxTwitter signals its own failures inside a 200 body via `code`;
/// those map to the taxonomy here rather than leaking vendor shapes.
pub(crate) fn parse_status_response(
    body: &str,
    format: ContentFormat,
) -> Result<Extraction, ProviderError> {
    let parsed: StatusResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("fxtwitter status response: {e}")))?;

    if parsed.code != 200 {
        let message = parsed.message.unwrap_or_else(|| "post unavailable".into());
        return Err(ProviderError::upstream(format!(
            "fxtwitter code {}: {message}",
            parsed.code
        )));
    }
    let tweet = parsed
        .tweet
        .ok_or_else(|| ProviderError::parse("status response missing tweet"))?;

    let content = match format {
        ContentFormat::Markdown | ContentFormat::Html => format!(
            "**{}** (@{})\n\n{}",
            tweet.author.name, tweet.author.screen_name, tweet.text
        ),
        ContentFormat::PlainText => format!(
            "{} (@{}): {}",
            tweet.author.name, tweet.author.screen_name, tweet.text
        ),
    };
    let token_estimate = content.len() / 4;
    Ok(Extraction {
        metadata: ExtractionMetadata {
            title: Some(format!("Post by @{}", tweet.author.screen_name)),
            language: tweet.lang,
            token_estimate,
        },
        content,
        // Post text renders the same either way; never claim HTML.
        format: if format == ContentFormat::PlainText {
            ContentFormat::PlainText
        } else {
            ContentFormat::Markdown
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_STATUS: &str = r#"{
        "code": 200,
        "message": "OK",
        "tweet": {
            "text": "Announcing Rust 1.80",
            "url": "https://twitter.com/rustlang/status/123",
            "created_at": "2024-07-25T14:00:00.000Z",
            "lang": "en",
            "author": {"name": "Rust Language", "screen_name": "rustlang"}
        }
    }"#;

    const MOCK_SEARCH: &str = r#"{
        "tweets": [
            {
                "text": "Rust 1.80 is out",
                "url": "https://twitter.com/rustlang/status/123",
                "created_at": "2024-07-25T14:00:00.000Z",
                "author": {"name": "Rust Language", "screen_name": "rustlang"}
            },
            {
                "text": "untweetable",
                "author": {"name": "Nobody", "screen_name": "nobody"}
            }
        ]
    }"#;

    #[test]
    fn status_path_extracts_user_and_id() {
        assert_eq!(
            status_path("https://x.com/rustlang/status/1234567890"),
            Some(("rustlang".into(), "1234567890".into()))
        );
        assert_eq!(
            status_path("https://twitter.com/rustlang/status/123?s=20"),
            Some(("rustlang".into(), "123".into()))
        );
    }

    #[test]
    fn status_path_rejects_non_post_urls() {
        assert!(status_path("https://x.com/rustlang").is_none());
        assert!(status_path("https://x.com/rustlang/likes").is_none());
        assert!(status_path("not a url").is_none());
    }

    #[test]
    fn parse_status_builds_markdown() {
        let extraction =
            parse_status_response(MOCK_STATUS, ContentFormat::Markdown).expect("should parse");
        assert!(extraction.content.contains("**Rust Language**"));
        assert!(extraction.content.contains("Announcing Rust 1.80"));
        assert_eq!(extraction.metadata.language.as_deref(), Some("en"));
        assert_eq!(
            extraction.metadata.title.as_deref(),
            Some("Post by @rustlang")
        );
    }

    #[test]
    fn parse_status_plain_text() {
        let extraction =
            parse_status_response(MOCK_STATUS, ContentFormat::PlainText).expect("should parse");
        assert_eq!(extraction.format, ContentFormat::PlainText);
        assert!(!extraction.content.contains("**"));
    }

    #[test]
    fn vendor_error_code_maps_to_upstream() {
        let body = r#"{"code": 404, "message": "NOT_FOUND"}"#;
        let err = parse_status_response(body, ContentFormat::Markdown).unwrap_err();
        assert_eq!(err.status, crate::types::OutcomeStatus::UpstreamError);
        assert!(err.message.contains("NOT_FOUND"));
    }

    #[test]
    fn parse_search_skips_hits_without_urls() {
        let results = parse_search_response(MOCK_SEARCH).expect("should parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Rust Language (@rustlang)");
        assert_eq!(
            results[0].published,
            chrono::NaiveDate::from_ymd_opt(2024, 7, 25)
        );
    }
}
