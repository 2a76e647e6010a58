//! Provider client implementations.
//!
//! One module per vendor. Each client owns its auth headers, payload
//! shape, and quirks, and maps every failure through the normaliser so
//! callers only ever see taxonomy statuses. Parsing is split from
//! fetching so the wire shapes are testable with fixture JSON.

pub mod brave;
pub mod exa;
pub mod firecrawl;
pub mod fxtwitter;
pub mod jina;
pub mod tavily;

pub use brave::BraveSearch;
pub use exa::ExaSearch;
pub use firecrawl::FirecrawlScraper;
pub use fxtwitter::FxTwitterClient;
pub use jina::JinaReader;
pub use tavily::TavilySearch;

use chrono::NaiveDate;

use crate::normalize;
use crate::provider::ProviderError;

/// Drain a response expected to carry JSON, running the full
/// status/content-type/body-shape checks. Returns the raw body for the
/// caller to deserialise.
pub(crate) async fn json_body(response: reqwest::Response) -> Result<String, ProviderError> {
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
    normalize::ensure_json(status, content_type.as_deref(), &body)?;
    Ok(body)
}

/// Best-effort parse of the vendor date formats seen in the wild — bare
/// dates and RFC 3339 timestamps both reduce to their first ten bytes.
pub(crate) fn parse_published(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
