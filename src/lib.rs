//! # foray
//!
//! Provider aggregation layer for an LLM research agent.
//!
//! Turns one agent query into content gathered from multiple
//! independent, unreliable, rate-limited third-party services — web
//! search providers (keyword, neural, LLM-optimised, social) and
//! content extractors (generic reader, JS renderer, social) — and
//! returns a single deduplicated, ranked, uniformly-shaped result set.
//!
//! ## Design
//!
//! - Search fans out to every eligible provider concurrently, each
//!   under its own timeout, with an overall deadline bounding the lot
//! - Scraping walks an ordered fallback chain, retrying transient
//!   failures with backoff and advancing on permanent ones
//! - Results are deduplicated by canonical URL with provenance tracked,
//!   then combined under a selectable strategy (merge, round-robin,
//!   priority)
//! - Vendor errors are normalised to a closed taxonomy; a provider
//!   failing never aborts the rest, and an empty result set with
//!   diagnostics is a valid outcome, not an error
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> foray::Result<()> {
//! let foray = foray::Foray::new(foray::ForayConfig::default())?;
//! let response = foray.search(foray::SearchQuery::new("rust async runtimes")).await?;
//! for result in &response.results {
//!     println!("{}: {}", result.title, result.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod breaker;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod router;
pub mod types;

use std::sync::Mutex;

use breaker::{BreakerConfig, CircuitBreaker};
use registry::Registry;

pub use config::{AggregationStrategy, ForayConfig, ProviderSettings, ProvidersConfig};
pub use error::{ForayError, Result};
pub use orchestrator::{FetchResponse, SearchResponse};
pub use provider::{ScrapeProvider, SearchProvider};
pub use types::{
    ContentFormat, ExtractionResult, NormalizedResult, OutcomeStatus, ProviderId, ProviderOutcome,
    ScrapeRequest, SearchQuery,
};

/// The aggregation client.
///
/// Holds the long-lived pieces: configuration, the provider registry
/// (each provider carrying the shared connection pool and its
/// credentials), and the circuit breaker. Everything per-request is
/// created at call time and discarded with the response; `Foray` itself
/// is safe to share across concurrent requests.
pub struct Foray {
    config: ForayConfig,
    registry: Registry,
    breaker: Mutex<CircuitBreaker>,
}

impl Foray {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ForayError::Config`] if the configuration is invalid
    /// and [`ForayError::Http`] if the shared HTTP client cannot be
    /// constructed.
    pub fn new(config: ForayConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(&config)?;
        let registry = Registry::from_config(&config, client);
        Ok(Self {
            config,
            registry,
            breaker: Mutex::new(CircuitBreaker::new(BreakerConfig::default())),
        })
    }

    /// Build a client over an explicit provider set. The seam for tests
    /// and for embedders supplying their own provider implementations.
    pub fn with_registry(config: ForayConfig, registry: Registry) -> Self {
        Self {
            config,
            registry,
            breaker: Mutex::new(CircuitBreaker::new(BreakerConfig::default())),
        }
    }

    /// Search the web across every provider the router selects.
    ///
    /// Always returns a response when at least one provider is
    /// eligible — individual provider failures (and even all of them
    /// failing) surface as diagnostics on the envelope, never as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ForayError::Config`] only when the router cannot
    /// construct a provider list at all (nothing enabled or an
    /// allow-list naming no registered provider).
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
        let selected = router::select_search(&self.registry, &query);
        if selected.is_empty() {
            return Err(ForayError::Config(
                "no search providers eligible for this query".into(),
            ));
        }
        tracing::trace!(providers = selected.len(), "search fan-out");
        Ok(orchestrator::search::run_search(selected, &query, &self.config, &self.breaker).await)
    }

    /// Fetch and extract content from a URL via the fallback chain.
    ///
    /// # Errors
    ///
    /// Returns [`ForayError::Config`] only when no scrape provider is
    /// registered; exhaustion of the chain is reported through the
    /// failure [`ExtractionResult`] instead.
    pub async fn fetch(&self, request: ScrapeRequest) -> Result<FetchResponse> {
        let chain = router::select_scrape(&self.registry, &request);
        if chain.is_empty() {
            return Err(ForayError::Config(
                "no scrape providers eligible for this URL".into(),
            ));
        }
        tracing::trace!(chain = chain.len(), "scrape fallback chain");
        Ok(orchestrator::fetch::run_fetch(chain, &request, &self.config, &self.breaker).await)
    }
}
