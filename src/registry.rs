//! Provider registry: the compile-time-known set of provider clients.
//!
//! Built once from configuration and shared for the life of the
//! [`crate::Foray`] client. Provider instances are long-lived injected
//! dependencies (they hold the shared connection pool and credentials);
//! the registry itself is immutable after construction.

use std::sync::Arc;

use crate::config::ForayConfig;
use crate::provider::{ScrapeProvider, SearchProvider};
use crate::providers::{
    BraveSearch, ExaSearch, FirecrawlScraper, FxTwitterClient, JinaReader, TavilySearch,
};

/// The set of enabled provider clients.
pub struct Registry {
    search: Vec<Arc<dyn SearchProvider>>,
    scrape: Vec<Arc<dyn ScrapeProvider>>,
}

impl Registry {
    /// Instantiate enabled providers from config, wiring the shared
    /// HTTP client into each.
    pub fn from_config(config: &ForayConfig, client: reqwest::Client) -> Self {
        let mut search: Vec<Arc<dyn SearchProvider>> = Vec::new();
        let mut scrape: Vec<Arc<dyn ScrapeProvider>> = Vec::new();

        let p = &config.providers;
        if p.brave.enabled {
            search.push(Arc::new(BraveSearch::new(client.clone(), &p.brave)));
        }
        if p.exa.enabled {
            search.push(Arc::new(ExaSearch::new(client.clone(), &p.exa)));
        }
        if p.tavily.enabled {
            search.push(Arc::new(TavilySearch::new(client.clone(), &p.tavily)));
        }
        if p.fxtwitter.enabled {
            let fx = Arc::new(FxTwitterClient::new(client.clone(), &p.fxtwitter));
            search.push(fx.clone());
            scrape.push(fx);
        }
        if p.jina.enabled {
            scrape.push(Arc::new(JinaReader::new(client.clone(), &p.jina)));
        }
        if p.firecrawl.enabled {
            scrape.push(Arc::new(FirecrawlScraper::new(client.clone(), &p.firecrawl)));
        }

        Self { search, scrape }
    }

    /// Build a registry from explicit provider instances. The seam used
    /// by orchestrator tests with mock providers.
    pub fn with_providers(
        search: Vec<Arc<dyn SearchProvider>>,
        scrape: Vec<Arc<dyn ScrapeProvider>>,
    ) -> Self {
        Self { search, scrape }
    }

    /// All enabled search providers, in registration order.
    pub fn search_providers(&self) -> &[Arc<dyn SearchProvider>] {
        &self.search
    }

    /// All enabled scrape providers, in registration order.
    pub fn scrape_providers(&self) -> &[Arc<dyn ScrapeProvider>] {
        &self.scrape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderId;

    fn registry_from(config: &ForayConfig) -> Registry {
        let client = crate::http::build_client(config).expect("client");
        Registry::from_config(config, client)
    }

    #[test]
    fn default_config_registers_all_providers() {
        let registry = registry_from(&ForayConfig::default());
        assert_eq!(registry.search_providers().len(), 4);
        assert_eq!(registry.scrape_providers().len(), 3);
    }

    #[test]
    fn disabled_providers_are_not_registered() {
        let mut config = ForayConfig::default();
        config.providers.exa.enabled = false;
        config.providers.firecrawl.enabled = false;
        let registry = registry_from(&config);
        assert!(registry
            .search_providers()
            .iter()
            .all(|p| p.id() != ProviderId::Exa));
        assert!(registry
            .scrape_providers()
            .iter()
            .all(|p| p.id() != ProviderId::Firecrawl));
    }

    #[test]
    fn fxtwitter_registers_in_both_roles() {
        let registry = registry_from(&ForayConfig::default());
        assert!(registry
            .search_providers()
            .iter()
            .any(|p| p.id() == ProviderId::FxTwitter));
        assert!(registry
            .scrape_providers()
            .iter()
            .any(|p| p.id() == ProviderId::FxTwitter));
    }
}
