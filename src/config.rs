//! Configuration with sensible defaults.
//!
//! [`ForayConfig`] controls which providers are enabled, credentials,
//! the default aggregation strategy, per-provider and overall timeouts,
//! and retry behaviour. Serde derives let the embedding application load
//! it from its own TOML/JSON config; nothing here reads the environment.

use serde::{Deserialize, Serialize};

use crate::error::ForayError;
use crate::types::ProviderId;

/// Strategy used to combine ranked lists from multiple search providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// Interleave by per-provider-normalised relevance score.
    Merge,
    /// Take index 0 from each provider, then index 1, and so on.
    RoundRobin,
    /// Exhaust the highest-priority provider first, then fill with
    /// non-duplicates from the rest.
    Priority,
}

/// Settings for a single provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Whether this provider participates at all.
    pub enabled: bool,
    /// API credential, where the vendor requires one.
    pub api_key: Option<String>,
    /// Base URL override. Intended for tests and self-hosted gateways;
    /// `None` uses the vendor default.
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Enabled with a credential.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: Some(key.into()),
            base_url: None,
        }
    }

    /// Enabled without a credential (keyless vendors).
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }
}

/// Per-provider settings table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Brave Search API (keyword).
    pub brave: ProviderSettings,
    /// Exa (neural).
    pub exa: ProviderSettings,
    /// Tavily (LLM-optimised keyword).
    pub tavily: ProviderSettings,
    /// FxTwitter (social search and extraction).
    pub fxtwitter: ProviderSettings,
    /// Jina Reader (generic extraction).
    pub jina: ProviderSettings,
    /// Firecrawl (JS-rendering extraction).
    pub firecrawl: ProviderSettings,
}

impl ProvidersConfig {
    /// Settings for a provider by id.
    pub fn get(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::Brave => &self.brave,
            ProviderId::Exa => &self.exa,
            ProviderId::Tavily => &self.tavily,
            ProviderId::FxTwitter => &self.fxtwitter,
            ProviderId::Jina => &self.jina,
            ProviderId::Firecrawl => &self.firecrawl,
        }
    }
}

/// Top-level configuration for the aggregation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForayConfig {
    /// Per-provider enablement and credentials.
    pub providers: ProvidersConfig,
    /// Default aggregation strategy when the caller does not choose one.
    pub strategy: AggregationStrategy,
    /// Default result count after dedup and ranking.
    pub max_results: usize,
    /// Per-provider call timeout in seconds, independent per provider.
    pub provider_timeout_secs: u64,
    /// Overall deadline in seconds bounding the whole search fan-out.
    pub overall_deadline_secs: u64,
    /// Retry attempts per scrape provider for transient failures.
    pub retry_attempts: u32,
    /// Base delay in milliseconds for exponential retry backoff.
    pub backoff_base_ms: u64,
    /// Custom User-Agent for reader-style fetches. `None` rotates
    /// through a built-in list.
    pub user_agent: Option<String>,
}

impl Default for ForayConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig {
                brave: ProviderSettings::enabled(),
                exa: ProviderSettings::enabled(),
                tavily: ProviderSettings::enabled(),
                fxtwitter: ProviderSettings::enabled(),
                jina: ProviderSettings::enabled(),
                firecrawl: ProviderSettings::enabled(),
            },
            strategy: AggregationStrategy::Merge,
            max_results: 10,
            provider_timeout_secs: 8,
            overall_deadline_secs: 15,
            retry_attempts: 2,
            backoff_base_ms: 250,
            user_agent: None,
        }
    }
}

impl ForayConfig {
    /// Validate this configuration.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `provider_timeout_secs` and `overall_deadline_secs` must be
    ///   greater than 0 (the deadline may be shorter than a provider
    ///   timeout — that is what makes it a backstop)
    /// - at least one search provider and one scrape provider enabled
    pub fn validate(&self) -> Result<(), ForayError> {
        if self.max_results == 0 {
            return Err(ForayError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.provider_timeout_secs == 0 {
            return Err(ForayError::Config(
                "provider_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.overall_deadline_secs == 0 {
            return Err(ForayError::Config(
                "overall_deadline_secs must be greater than 0".into(),
            ));
        }
        if !self.any_search_enabled() {
            return Err(ForayError::Config(
                "at least one search provider must be enabled".into(),
            ));
        }
        if !self.any_scrape_enabled() {
            return Err(ForayError::Config(
                "at least one scrape provider must be enabled".into(),
            ));
        }
        Ok(())
    }

    fn any_search_enabled(&self) -> bool {
        let p = &self.providers;
        p.brave.enabled || p.exa.enabled || p.tavily.enabled || p.fxtwitter.enabled
    }

    fn any_scrape_enabled(&self) -> bool {
        let p = &self.providers;
        p.jina.enabled || p.firecrawl.enabled || p.fxtwitter.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ForayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_results, 10);
        assert_eq!(config.provider_timeout_secs, 8);
        assert_eq!(config.strategy, AggregationStrategy::Merge);
    }

    #[test]
    fn zero_max_results_rejected() {
        let config = ForayConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn zero_provider_timeout_rejected() {
        let config = ForayConfig {
            provider_timeout_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("provider_timeout_secs"));
    }

    #[test]
    fn deadline_tighter_than_provider_timeout_is_valid() {
        let config = ForayConfig {
            provider_timeout_secs: 10,
            overall_deadline_secs: 5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_deadline_rejected() {
        let config = ForayConfig {
            overall_deadline_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overall_deadline_secs"));
    }

    #[test]
    fn all_search_providers_disabled_rejected() {
        let mut config = ForayConfig::default();
        config.providers.brave.enabled = false;
        config.providers.exa.enabled = false;
        config.providers.tavily.enabled = false;
        config.providers.fxtwitter.enabled = false;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search provider"));
    }

    #[test]
    fn all_scrape_providers_disabled_rejected() {
        let mut config = ForayConfig::default();
        config.providers.jina.enabled = false;
        config.providers.firecrawl.enabled = false;
        config.providers.fxtwitter.enabled = false;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scrape provider"));
    }

    #[test]
    fn fxtwitter_alone_satisfies_both_roles() {
        let mut config = ForayConfig::default();
        config.providers.brave.enabled = false;
        config.providers.exa.enabled = false;
        config.providers.tavily.enabled = false;
        config.providers.jina.enabled = false;
        config.providers.firecrawl.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn settings_lookup_by_id() {
        let mut config = ForayConfig::default();
        config.providers.exa = ProviderSettings::with_key("sk-test");
        assert_eq!(
            config.providers.get(ProviderId::Exa).api_key.as_deref(),
            Some("sk-test")
        );
        assert!(config.providers.get(ProviderId::Brave).enabled);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = ForayConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let decoded: ForayConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.max_results, config.max_results);
        assert_eq!(decoded.strategy, AggregationStrategy::Merge);
    }

    #[test]
    fn strategy_serde_snake_case() {
        let json = serde_json::to_string(&AggregationStrategy::RoundRobin).expect("serialize");
        assert_eq!(json, "\"round_robin\"");
    }
}
