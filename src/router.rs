//! Provider routing: which providers to invoke for a given input.
//!
//! Routing is pure — it inspects the query or URL and decides an order,
//! never calling a provider. Search selection is inclusive (every
//! compatible provider joins the fan-out); scrape selection is an
//! ordered fallback chain.

use std::sync::Arc;

use url::Url;

use crate::provider::{ScrapeCapability, ScrapeProvider, SearchCapability, SearchProvider};
use crate::registry::Registry;
use crate::types::{ScrapeRequest, SearchQuery};

/// What a query's text says about where to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySignal {
    /// Ordinary prose — keyword and neural providers.
    Keyword,
    /// Nothing but handles/hashtags — social providers only.
    Social,
    /// Social markers mixed into prose — everything joins.
    Mixed,
}

/// Hosts whose URLs route to the social extractor first.
const SOCIAL_HOSTS: &[&str] = &["twitter.com", "x.com", "t.co"];

/// Classify query text by its social markers.
///
/// A token counts as social when it is an `@handle` or a `#hashtag`
/// (`@` or `#` followed by a word character). Email addresses and bare
/// punctuation do not count.
pub fn classify(text: &str) -> QuerySignal {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return QuerySignal::Keyword;
    }

    let social = tokens.iter().filter(|t| is_social_token(t)).count();
    if social == 0 {
        QuerySignal::Keyword
    } else if social == tokens.len() {
        QuerySignal::Social
    } else {
        QuerySignal::Mixed
    }
}

fn is_social_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some('@') | Some('#') => chars
            .next()
            .map(|c| c.is_alphanumeric() || c == '_')
            .unwrap_or(false),
        _ => false,
    }
}

/// Whether a URL belongs to a social platform the specialised extractor
/// understands.
pub fn is_social_url(raw: &str) -> bool {
    let Ok(parsed) = Url::parse(raw) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    SOCIAL_HOSTS
        .iter()
        .any(|s| host == *s || host.ends_with(&format!(".{s}")))
}

/// Select search providers for a query, highest priority first.
///
/// An explicit allow-list on the query overrides signal detection and
/// selects exactly those providers. Otherwise the query signal decides:
/// keyword/neural providers by default, social providers added (or
/// alone) when the text carries social markers.
pub fn select_search(registry: &Registry, query: &SearchQuery) -> Vec<Arc<dyn SearchProvider>> {
    let mut selected: Vec<Arc<dyn SearchProvider>> = match &query.providers {
        Some(allow) => registry
            .search_providers()
            .iter()
            .filter(|p| allow.contains(&p.id()))
            .cloned()
            .collect(),
        None => {
            let signal = classify(&query.text);
            registry
                .search_providers()
                .iter()
                .filter(|p| compatible(p.capabilities(), signal))
                .cloned()
                .collect()
        }
    };

    // Stable: equal priorities keep registration order.
    selected.sort_by_key(|p| std::cmp::Reverse(p.id().priority()));
    selected
}

fn compatible(capabilities: &[SearchCapability], signal: QuerySignal) -> bool {
    let social = capabilities.contains(&SearchCapability::Social);
    let general = capabilities
        .iter()
        .any(|c| matches!(c, SearchCapability::Keyword | SearchCapability::Neural));
    match signal {
        QuerySignal::Keyword => general,
        QuerySignal::Social => social,
        QuerySignal::Mixed => social || general,
    }
}

/// Select scrape providers for a request, as an ordered fallback chain.
///
/// Social URLs try the social extractor first; every chain ends with the
/// generic extractor followed by the JS-rendering extractor, so a
/// failure anywhere still has somewhere to go.
pub fn select_scrape(registry: &Registry, request: &ScrapeRequest) -> Vec<Arc<dyn ScrapeProvider>> {
    let social_first = is_social_url(&request.url);

    let mut chain: Vec<Arc<dyn ScrapeProvider>> = Vec::new();
    if social_first {
        push_tier(&mut chain, registry, ScrapeCapability::Social);
    }
    push_tier(&mut chain, registry, ScrapeCapability::GenericFallback);
    push_tier(&mut chain, registry, ScrapeCapability::JsRendering);
    chain
}

/// Append providers with `capability` (highest priority first),
/// skipping any already in the chain.
fn push_tier(
    chain: &mut Vec<Arc<dyn ScrapeProvider>>,
    registry: &Registry,
    capability: ScrapeCapability,
) {
    let mut tier: Vec<Arc<dyn ScrapeProvider>> = registry
        .scrape_providers()
        .iter()
        .filter(|p| p.capabilities().contains(&capability))
        .filter(|p| chain.iter().all(|c| c.id() != p.id()))
        .cloned()
        .collect();
    tier.sort_by_key(|p| std::cmp::Reverse(p.id().priority()));
    chain.extend(tier);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForayConfig;
    use crate::types::ProviderId;

    fn registry() -> Registry {
        let config = ForayConfig::default();
        let client = crate::http::build_client(&config).expect("client");
        Registry::from_config(&config, client)
    }

    #[test]
    fn plain_prose_classifies_keyword() {
        assert_eq!(classify("rust borrow checker errors"), QuerySignal::Keyword);
    }

    #[test]
    fn pure_handles_classify_social() {
        assert_eq!(classify("@rustlang"), QuerySignal::Social);
        assert_eq!(classify("#rustlang @foo"), QuerySignal::Social);
    }

    #[test]
    fn handles_in_prose_classify_mixed() {
        assert_eq!(
            classify("what did @rustlang announce today"),
            QuerySignal::Mixed
        );
        assert_eq!(classify("news about #async rust"), QuerySignal::Mixed);
    }

    #[test]
    fn emails_and_bare_punctuation_do_not_count() {
        assert_eq!(classify("mail user@example.com today"), QuerySignal::Keyword);
        assert_eq!(classify("c# vs f#"), QuerySignal::Keyword);
        assert_eq!(classify("@ #"), QuerySignal::Keyword);
    }

    #[test]
    fn empty_query_classifies_keyword() {
        assert_eq!(classify(""), QuerySignal::Keyword);
        assert_eq!(classify("   "), QuerySignal::Keyword);
    }

    #[test]
    fn social_urls_detected() {
        assert!(is_social_url("https://twitter.com/rustlang/status/123"));
        assert!(is_social_url("https://x.com/rustlang/status/123"));
        assert!(is_social_url("https://mobile.twitter.com/rustlang"));
        assert!(is_social_url("https://t.co/abc"));
        assert!(!is_social_url("https://example.com/x.com"));
        assert!(!is_social_url("https://notx.com/page"));
        assert!(!is_social_url("not a url"));
    }

    #[test]
    fn keyword_query_selects_general_providers_only() {
        let r = registry();
        let selected = select_search(&r, &SearchQuery::new("rust async"));
        let ids: Vec<ProviderId> = selected.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ProviderId::Brave, ProviderId::Exa, ProviderId::Tavily]);
    }

    #[test]
    fn social_query_selects_social_provider_only() {
        let r = registry();
        let selected = select_search(&r, &SearchQuery::new("@rustlang"));
        let ids: Vec<ProviderId> = selected.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ProviderId::FxTwitter]);
    }

    #[test]
    fn mixed_query_selects_everything() {
        let r = registry();
        let selected = select_search(&r, &SearchQuery::new("what is @rustlang saying"));
        assert_eq!(selected.len(), 4);
        // Priority order: Brave first, FxTwitter last.
        assert_eq!(selected[0].id(), ProviderId::Brave);
        assert_eq!(selected[3].id(), ProviderId::FxTwitter);
    }

    #[test]
    fn allow_list_overrides_signal_detection() {
        let r = registry();
        let query =
            SearchQuery::new("@rustlang").with_providers(vec![ProviderId::Exa, ProviderId::Brave]);
        let ids: Vec<ProviderId> = select_search(&r, &query).iter().map(|p| p.id()).collect();
        // Still priority-ordered, regardless of allow-list order.
        assert_eq!(ids, vec![ProviderId::Brave, ProviderId::Exa]);
    }

    #[test]
    fn allow_list_of_unregistered_provider_selects_nothing() {
        let mut config = ForayConfig::default();
        config.providers.exa.enabled = false;
        let client = crate::http::build_client(&config).expect("client");
        let r = Registry::from_config(&config, client);
        let query = SearchQuery::new("x").with_providers(vec![ProviderId::Exa]);
        assert!(select_search(&r, &query).is_empty());
    }

    #[test]
    fn generic_url_routes_reader_then_renderer() {
        let r = registry();
        let chain = select_scrape(&r, &ScrapeRequest::new("https://example.com/article"));
        let ids: Vec<ProviderId> = chain.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ProviderId::Jina, ProviderId::Firecrawl]);
    }

    #[test]
    fn social_url_routes_social_extractor_first() {
        let r = registry();
        let chain = select_scrape(&r, &ScrapeRequest::new("https://x.com/rustlang/status/1"));
        let ids: Vec<ProviderId> = chain.iter().map(|p| p.id()).collect();
        assert_eq!(
            ids,
            vec![ProviderId::FxTwitter, ProviderId::Jina, ProviderId::Firecrawl]
        );
    }

    #[test]
    fn routing_never_calls_providers() {
        // Selection over a registry of real clients must complete
        // without any async context — it is a pure decision.
        let r = registry();
        let _ = select_search(&r, &SearchQuery::new("query"));
        let _ = select_scrape(&r, &ScrapeRequest::new("https://example.com"));
    }
}
