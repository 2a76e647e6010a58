//! Core value types: queries, raw and normalised results, extraction
//! outcomes, and per-provider diagnostics.
//!
//! `SearchQuery` and `ScrapeRequest` are immutable per-call values.
//! `RawResult` and `ProviderOutcome` live only for one orchestrator
//! invocation; `NormalizedResult` and `ExtractionResult` are the only
//! values that escape to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifies a concrete provider client.
///
/// One variant per vendor; FxTwitter appears in both the search fan-out
/// (social search) and the scrape fallback chain (social extraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Brave Search API — keyword web search, default workhorse.
    Brave,
    /// Exa — neural/embeddings search with real relevance scores.
    Exa,
    /// Tavily — LLM-optimised keyword search.
    Tavily,
    /// FxTwitter — social-content search and post extraction.
    FxTwitter,
    /// Jina Reader — generic markdown extraction for any URL.
    Jina,
    /// Firecrawl — JS-rendering extraction for dynamic pages.
    Firecrawl,
}

impl ProviderId {
    /// Human-readable provider name, used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brave => "brave",
            Self::Exa => "exa",
            Self::Tavily => "tavily",
            Self::FxTwitter => "fxtwitter",
            Self::Jina => "jina",
            Self::Firecrawl => "firecrawl",
        }
    }

    /// Static priority used for aggregation tie-breaks and the `priority`
    /// strategy. Higher wins. Keyword search dominates by default; the
    /// social provider only matters when the query routes to it.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Brave => 40,
            Self::Exa => 30,
            Self::Tavily => 20,
            Self::FxTwitter => 10,
            Self::Jina => 40,
            Self::Firecrawl => 30,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive published-date filter for search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Only results published on or after this date.
    pub after: Option<NaiveDate>,
    /// Only results published on or before this date.
    pub before: Option<NaiveDate>,
}

/// An immutable search request, created once per agent search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Raw query text as the agent supplied it.
    pub text: String,
    /// BCP-47 style locale hint (e.g. `en-GB`), forwarded to providers
    /// that support it.
    pub locale: Option<String>,
    /// Desired result count after dedup and ranking; `None` defers to
    /// the configured default.
    pub max_results: Option<usize>,
    /// Restrict results to these domains (provider-side where supported).
    pub include_domains: Vec<String>,
    /// Exclude results from these domains.
    pub exclude_domains: Vec<String>,
    /// Published-date filter.
    pub date_range: Option<DateRange>,
    /// Explicit provider allow-list. When set, the router uses exactly
    /// these providers (in its own priority order) instead of signal
    /// detection.
    pub providers: Option<Vec<ProviderId>>,
}

impl SearchQuery {
    /// Create a query with just the raw text; everything else defaults.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: None,
            max_results: None,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            date_range: None,
            providers: None,
        }
    }

    /// Set a locale hint.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the desired result count.
    #[must_use]
    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = Some(n);
        self
    }

    /// Restrict to the given domains.
    #[must_use]
    pub fn with_include_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = domains;
        self
    }

    /// Set an explicit provider allow-list.
    #[must_use]
    pub fn with_providers(mut self, providers: Vec<ProviderId>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Set a published-date filter.
    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }
}

/// Output format for extracted page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    /// Markdown — the default for LLM consumption.
    Markdown,
    /// Raw HTML, boilerplate included.
    Html,
    /// Plain text with markup stripped.
    PlainText,
}

/// An immutable scrape request, created once per agent fetch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Target URL.
    pub url: String,
    /// Desired output format.
    pub format: ContentFormat,
    /// Retain image references in the extracted content.
    pub keep_images: bool,
    /// Return a link summary instead of full body text.
    pub link_summary: bool,
}

impl ScrapeRequest {
    /// Create a markdown-format request for `url` with default flags.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: ContentFormat::Markdown,
            keep_images: false,
            link_summary: false,
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: ContentFormat) -> Self {
        self.format = format;
        self
    }

    /// Retain image references.
    #[must_use]
    pub fn with_images(mut self) -> Self {
        self.keep_images = true;
        self
    }
}

/// A provider-specific search hit before deduplication and ranking.
///
/// Owned by the producing provider until handed to the aggregator; never
/// escapes to the caller.
#[derive(Debug, Clone)]
pub struct RawResult {
    /// Result title as the provider reported it.
    pub title: String,
    /// Result URL, not yet canonicalised.
    pub url: String,
    /// Text snippet or summary.
    pub snippet: String,
    /// Provider-native relevance score, on whatever scale the vendor
    /// uses. `None` for providers that only convey rank by position.
    pub score: Option<f64>,
    /// Published date, if the provider reports one.
    pub published: Option<NaiveDate>,
    /// Which provider produced this hit.
    pub provider: ProviderId,
}

/// A canonical post-dedup search result — the only result shape handed
/// back to the caller. Identity invariant: one per canonical URL within
/// a single response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Canonical URL (deduplication key).
    pub url: String,
    /// Retained title (highest-ranked contributor wins).
    pub title: String,
    /// Retained snippet.
    pub snippet: String,
    /// Provenance: every provider that returned this URL.
    pub providers: Vec<ProviderId>,
    /// Composite rank, higher is better. Comparable only within one
    /// response.
    pub rank: f64,
    /// Published date, if any contributor reported one.
    pub published: Option<NaiveDate>,
}

/// Metadata extracted alongside page content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Page title, when detectable.
    pub title: Option<String>,
    /// Detected content language (ISO 639-1), when reported.
    pub language: Option<String>,
    /// Rough token-count estimate for the extracted content.
    pub token_estimate: usize,
}

/// Outcome of a scrape call. Exactly one of `content`/`error` is set.
///
/// Fields are read-only; `success` and `failure` are the only ways to
/// build one in code, so the one-of invariant holds by construction.
/// Serde support exists for envelope transport and mirrors whatever the
/// constructors produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    content: Option<String>,
    format: ContentFormat,
    metadata: ExtractionMetadata,
    error: Option<String>,
}

impl ExtractionResult {
    /// Build a successful extraction.
    pub fn success(content: String, format: ContentFormat, metadata: ExtractionMetadata) -> Self {
        Self {
            content: Some(content),
            format,
            metadata,
            error: None,
        }
    }

    /// Build a failed extraction carrying a clean error message.
    pub fn failure(format: ContentFormat, error: String) -> Self {
        Self {
            content: None,
            format,
            metadata: ExtractionMetadata::default(),
            error: Some(error),
        }
    }

    /// Extracted content; `None` on failure.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Format of the content (echoes the request on failure).
    pub fn format(&self) -> ContentFormat {
        self.format
    }

    /// Content metadata; default-empty on failure.
    pub fn metadata(&self) -> &ExtractionMetadata {
        &self.metadata
    }

    /// Failure description; `None` on success. Never contains raw
    /// vendor HTML.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether content was extracted.
    pub fn is_success(&self) -> bool {
        self.content.is_some()
    }
}

/// The closed status taxonomy shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The provider call succeeded.
    Ok,
    /// Network-level timeout or cancellation.
    Timeout,
    /// HTTP 429 or a vendor-specific rate-limit signal.
    RateLimited,
    /// HTTP 401/403 — bad or missing credentials.
    AuthError,
    /// HTTP 5xx, edge-proxy gateway timeouts, or an HTML error page
    /// where structured content was expected.
    UpstreamError,
    /// Response body failed schema/structure validation.
    ParseError,
}

impl OutcomeStatus {
    /// Transient statuses are worth retrying; permanent ones are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::AuthError => "auth_error",
            Self::UpstreamError => "upstream_error",
            Self::ParseError => "parse_error",
        };
        f.write_str(s)
    }
}

/// Per-provider diagnostic record attached to every response envelope.
///
/// Used for observability and priority tie-breaks; never fed to an LLM
/// prompt directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOutcome {
    /// Which provider this records.
    pub provider: ProviderId,
    /// Wall-clock duration of the call, retries included.
    pub duration: Duration,
    /// Final status.
    pub status: OutcomeStatus,
    /// Clean error message for non-ok statuses.
    pub message: Option<String>,
}

impl ProviderOutcome {
    /// Record a successful call.
    pub fn ok(provider: ProviderId, duration: Duration) -> Self {
        Self {
            provider,
            duration,
            status: OutcomeStatus::Ok,
            message: None,
        }
    }

    /// Record a failed call.
    pub fn failed(
        provider: ProviderId,
        duration: Duration,
        status: OutcomeStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            duration,
            status,
            message: Some(message.into()),
        }
    }

    /// Whether the call succeeded.
    pub fn is_ok(&self) -> bool {
        self.status == OutcomeStatus::Ok
    }
}
