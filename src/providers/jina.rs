//! Jina Reader client — generic content extraction for any URL.
//!
//! Prefixes the target URL onto the reader endpoint and gets back
//! cleaned markdown (or HTML/plain text, selected by header) with a
//! small `Title:`/`URL Source:` preamble. Works keyless at a lower rate
//! limit; the head of the default scrape chain.

use async_trait::async_trait;

use crate::config::ProviderSettings;
use crate::normalize;
use crate::provider::{Extraction, ProviderError, ScrapeCapability, ScrapeProvider};
use crate::types::{ContentFormat, ExtractionMetadata, ProviderId, ScrapeRequest};

const DEFAULT_BASE_URL: &str = "https://r.jina.ai";

/// Jina Reader client.
pub struct JinaReader {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl JinaReader {
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
impl ScrapeProvider for JinaReader {
    fn id(&self) -> ProviderId {
        ProviderId::Jina
    }

    fn capabilities(&self) -> &'static [ScrapeCapability] {
        &[ScrapeCapability::GenericFallback]
    }

    async fn fetch(&self, request: &ScrapeRequest) -> Result<Extraction, ProviderError> {
        tracing::trace!(url = %request.url, "jina fetch");

        let return_format = match request.format {
            ContentFormat::Markdown => "markdown",
            ContentFormat::Html => "html",
            ContentFormat::PlainText => "text",
        };

        let mut req = self
            .client
            .get(format!("{}/{}", self.base_url, request.url))
            .header("X-Return-Format", return_format);
        if !request.keep_images {
            req = req.header("X-Retain-Images", "none");
        }
        if request.link_summary {
            req = req.header("X-With-Links-Summary", "true");
        }
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| normalize::from_transport(&e))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .await
            .map_err(|e| normalize::from_transport(&e))?;

        let classified = normalize::classify_status(status);
        if classified != crate::types::OutcomeStatus::Ok {
            return Err(ProviderError::new(
                classified,
                format!("HTTP {status}: {}", normalize::summarise_body(&body)),
            ));
        }

        // Upstreams sometimes hand the reader a 200 carrying their own
        // HTML error page. Unless HTML was the requested format, an
        // HTML-shaped body is a failure, summarised so the raw page
        // never becomes extraction content.
        let html_content_type = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        if request.format != ContentFormat::Html
            && (html_content_type || normalize::looks_like_html(&body))
        {
            return Err(ProviderError::upstream(format!(
                "HTML error page: {}",
                normalize::summarise_body(&body)
            )));
        }

        Ok(parse_reader_body(&body, request.format))
    }
}

/// Split the reader preamble (`Title:`, `URL Source:`, the
/// `Markdown Content:` marker) from the extracted content.
pub(crate) fn parse_reader_body(body: &str, format: ContentFormat) -> Extraction {
    let mut title = None;
    let mut content_start = 0;

    for (offset, line) in body.lines().take(8).scan(0usize, |acc, line| {
        let offset = *acc;
        *acc += line.len() + 1;
        Some((offset, line))
    }) {
        if let Some(rest) = line.strip_prefix("Title:") {
            title = Some(rest.trim().to_string()).filter(|t| !t.is_empty());
        }
        if line.trim_end() == "Markdown Content:" {
            content_start = offset + line.len() + 1;
            break;
        }
    }

    let content = body[content_start.min(body.len())..].trim().to_string();
    let token_estimate = content.len() / 4;
    Extraction {
        content,
        format,
        metadata: ExtractionMetadata {
            title,
            language: None,
            token_estimate,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_BODY: &str = "Title: Example Domain\n\
URL Source: https://example.com/\n\
\n\
Markdown Content:\n\
# Example Domain\n\
\n\
This domain is for use in illustrative examples.";

    #[test]
    fn parse_reader_preamble() {
        let extraction = parse_reader_body(MOCK_BODY, ContentFormat::Markdown);
        assert_eq!(extraction.metadata.title.as_deref(), Some("Example Domain"));
        assert!(extraction.content.starts_with("# Example Domain"));
        assert!(!extraction.content.contains("URL Source:"));
        assert!(extraction.metadata.token_estimate > 0);
    }

    #[test]
    fn parse_body_without_preamble_keeps_everything() {
        let extraction = parse_reader_body("just some text", ContentFormat::PlainText);
        assert!(extraction.metadata.title.is_none());
        assert_eq!(extraction.content, "just some text");
        assert_eq!(extraction.format, ContentFormat::PlainText);
    }

    #[test]
    fn parse_empty_title_is_none() {
        let extraction = parse_reader_body("Title:\n\nMarkdown Content:\nbody", ContentFormat::Markdown);
        assert!(extraction.metadata.title.is_none());
        assert_eq!(extraction.content, "body");
    }
}
