//! Trait definitions for pluggable provider clients.
//!
//! Each vendor implements [`SearchProvider`], [`ScrapeProvider`], or both.
//! Implementations never let a vendor-shaped error cross this boundary:
//! every transport or parse failure is mapped through the normaliser
//! (`crate::normalize`) into a [`ProviderError`] carrying a taxonomy
//! status and a clean message.

use async_trait::async_trait;

use crate::types::{
    ContentFormat, ExtractionMetadata, OutcomeStatus, ProviderId, RawResult, ScrapeRequest,
    SearchQuery,
};

/// Capabilities a search provider can declare, matched against query
/// signals by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCapability {
    /// Classic keyword index.
    Keyword,
    /// Embedding/neural retrieval.
    Neural,
    /// Social-platform content.
    Social,
    /// Code-repository search.
    CodeRepository,
}

/// Capabilities a scrape provider can declare, used for fallback
/// ordering by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeCapability {
    /// Renders JavaScript before extraction.
    JsRendering,
    /// Understands social-platform post URLs.
    Social,
    /// Works on any URL; last-resort chain member.
    GenericFallback,
}

/// A provider-level failure, already normalised to the shared taxonomy.
///
/// `status` is never [`OutcomeStatus::Ok`]; the message is safe to log
/// and to surface in diagnostics (no credentials, no raw HTML bodies).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ProviderError {
    /// Taxonomy classification of the failure.
    pub status: OutcomeStatus,
    /// Clean, human-readable description.
    pub message: String,
}

impl ProviderError {
    /// Build an error with the given classification.
    pub fn new(status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a parse failure.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::ParseError, message)
    }

    /// Shorthand for an upstream failure.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::UpstreamError, message)
    }
}

/// Successful scrape payload, before the orchestrator wraps it into an
/// [`crate::types::ExtractionResult`]. Keeping content and metadata
/// together here means the one-of `{content, error}` invariant on the
/// public type holds by construction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Extracted content in `format`.
    pub content: String,
    /// Format of `content`.
    pub format: ContentFormat,
    /// Whatever metadata the provider surfaced.
    pub metadata: ExtractionMetadata,
}

/// A pluggable search provider backend.
///
/// All implementations must be `Send + Sync`; the orchestrator queries
/// them concurrently. Implementations handle their own auth headers,
/// payload shapes, and vendor-specific rate-limit codes.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Which provider this is.
    fn id(&self) -> ProviderId;

    /// Static capability set, used by the router for selection.
    fn capabilities(&self) -> &'static [SearchCapability];

    /// Perform a search and return raw, provider-ranked hits.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] with the taxonomy status already
    /// assigned. Implementations must not panic past this boundary.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, ProviderError>;
}

/// A pluggable content-extraction backend.
#[async_trait]
pub trait ScrapeProvider: Send + Sync {
    /// Which provider this is.
    fn id(&self) -> ProviderId;

    /// Static capability set, used by the router for fallback ordering.
    fn capabilities(&self) -> &'static [ScrapeCapability];

    /// Fetch and extract content from the request's URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] with the taxonomy status already
    /// assigned. Transient statuses (`timeout`, `rate_limited`) are
    /// retried by the orchestrator; permanent ones advance the chain.
    async fn fetch(&self, request: &ScrapeRequest) -> Result<Extraction, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockSearch {
        id: ProviderId,
        fail: bool,
    }

    #[async_trait]
    impl SearchProvider for MockSearch {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn capabilities(&self) -> &'static [SearchCapability] {
            &[SearchCapability::Keyword]
        }

        async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, ProviderError> {
            if self.fail {
                return Err(ProviderError::new(
                    OutcomeStatus::RateLimited,
                    "mock rate limit",
                ));
            }
            Ok(vec![RawResult {
                title: format!("hit for {}", query.text),
                url: "https://example.com".into(),
                snippet: String::new(),
                score: None,
                published: None,
                provider: self.id,
            }])
        }
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::new(OutcomeStatus::RateLimited, "429 from vendor");
        assert_eq!(err.to_string(), "rate_limited: 429 from vendor");
    }

    #[test]
    fn provider_error_shorthands() {
        assert_eq!(
            ProviderError::parse("bad json").status,
            OutcomeStatus::ParseError
        );
        assert_eq!(
            ProviderError::upstream("502").status,
            OutcomeStatus::UpstreamError
        );
    }

    #[tokio::test]
    async fn mock_provider_returns_results() {
        let provider = MockSearch {
            id: ProviderId::Brave,
            fail: false,
        };
        let results = provider
            .search(&SearchQuery::new("test"))
            .await
            .expect("should succeed");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider, ProviderId::Brave);
    }

    #[tokio::test]
    async fn mock_provider_error_carries_status() {
        let provider = MockSearch {
            id: ProviderId::Brave,
            fail: true,
        };
        let err = provider
            .search(&SearchQuery::new("test"))
            .await
            .unwrap_err();
        assert_eq!(err.status, OutcomeStatus::RateLimited);
    }

    #[test]
    fn trait_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SearchProvider>();
        assert_send_sync::<dyn ScrapeProvider>();
    }
}
