//! Firecrawl client — JS-rendering extraction for dynamic pages.
//!
//! Renders the page in a headless browser before extracting, so it sits
//! behind the cheaper reader in the fallback chain. Bearer-token auth,
//! JSON in and out, with vendor failures sometimes reported inside a
//! 200 body (`success: false`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderSettings;
use crate::normalize;
use crate::provider::{Extraction, ProviderError, ScrapeCapability, ScrapeProvider};
use crate::types::{ContentFormat, ExtractionMetadata, ProviderId, ScrapeRequest};

use super::json_body;

const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

/// Firecrawl scrape client.
pub struct FirecrawlScraper {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl FirecrawlScraper {
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
struct ScrapeBody<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
}

#[async_trait]
impl ScrapeProvider for FirecrawlScraper {
    fn id(&self) -> ProviderId {
        ProviderId::Firecrawl
    }

    fn capabilities(&self) -> &'static [ScrapeCapability] {
        &[ScrapeCapability::JsRendering]
    }

    async fn fetch(&self, request: &ScrapeRequest) -> Result<Extraction, ProviderError> {
        tracing::trace!(url = %request.url, "firecrawl fetch");

        // Firecrawl extracts markdown or raw HTML; plain text requests
        // get markdown, tagged accordingly in the parse step.
        let wire_format = match request.format {
            ContentFormat::Html => "html",
            ContentFormat::Markdown | ContentFormat::PlainText => "markdown",
        };
        let body = ScrapeBody {
            url: &request.url,
            formats: vec![wire_format],
        };

        let mut req = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| normalize::from_transport(&e))?;
        let body = json_body(response).await?;
        parse_response(&body, request.format)
    }
}

#[derive(Deserialize)]
struct FirecrawlResponse {
    success: bool,
    #[serde(default)]
    data: Option<FirecrawlData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FirecrawlData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    metadata: Option<FirecrawlMetadata>,
}

#[derive(Deserialize)]
struct FirecrawlMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Parse a Firecrawl scrape response into an extraction.
pub(crate) fn parse_response(
    body: &str,
    requested: ContentFormat,
) -> Result<Extraction, ProviderError> {
    let parsed: FirecrawlResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(format!("firecrawl response: {e}")))?;

    if !parsed.success {
        let reason = parsed.error.unwrap_or_else(|| "scrape failed".into());
        return Err(ProviderError::upstream(format!("firecrawl: {reason}")));
    }
    let data = parsed
        .data
        .ok_or_else(|| ProviderError::parse("firecrawl success without data"))?;

    let (content, format) = match requested {
        ContentFormat::Html => (data.html, ContentFormat::Html),
        ContentFormat::Markdown | ContentFormat::PlainText => {
            (data.markdown, ContentFormat::Markdown)
        }
    };
    let content =
        content.ok_or_else(|| ProviderError::parse("firecrawl data missing requested format"))?;

    let metadata = data.metadata.unwrap_or(FirecrawlMetadata {
        title: None,
        language: None,
    });
    let token_estimate = content.len() / 4;
    Ok(Extraction {
        content,
        format,
        metadata: ExtractionMetadata {
            title: metadata.title,
            language: metadata.language,
            token_estimate,
        },
    })
}
