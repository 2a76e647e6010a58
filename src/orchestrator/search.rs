//! Concurrent multi-provider search fan-out.
//!
//! Every selected provider runs under its own timeout; an overall
//! deadline additionally bounds the whole fan-out, cancelling stragglers
//! and recording them as `timeout`. Zero successful providers is a
//! valid outcome, not an error — the caller gets an empty result list
//! with full diagnostics.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use url::Url;

use crate::breaker::CircuitBreaker;
use crate::config::ForayConfig;
use crate::provider::{ProviderError, SearchProvider};
use crate::types::{OutcomeStatus, ProviderId, ProviderOutcome, RawResult, SearchQuery};

use super::aggregate::aggregate;
use super::SearchResponse;

/// Run the fan-out over router-selected providers and aggregate.
///
/// `providers` must be in router order (highest priority first); that
/// order drives both the aggregation strategies and the order of the
/// returned outcome list. Completion order never matters.
pub async fn run_search(
    providers: Vec<Arc<dyn SearchProvider>>,
    query: &SearchQuery,
    config: &ForayConfig,
    breaker: &Mutex<CircuitBreaker>,
) -> SearchResponse {
    // Open circuits are skipped entirely: not attempted, no outcome.
    let attempted: Vec<Arc<dyn SearchProvider>> = providers
        .into_iter()
        .filter(|p| {
            let allow = breaker
                .lock()
                .map(|mut b| b.should_attempt(p.id()))
                .unwrap_or(true);
            if !allow {
                tracing::debug!(provider = %p.id(), "circuit open, skipping provider");
            }
            allow
        })
        .collect();

    let per_provider = Duration::from_secs(config.provider_timeout_secs);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(config.overall_deadline_secs);

    let mut in_flight: FuturesUnordered<_> = attempted
        .iter()
        .enumerate()
        .map(|(slot, provider)| {
            let provider = provider.clone();
            async move {
                let started = Instant::now();
                let result = match tokio::time::timeout(per_provider, provider.search(query)).await
                {
                    Ok(inner) => inner,
                    Err(_) => Err(ProviderError::new(
                        OutcomeStatus::Timeout,
                        "provider timeout elapsed",
                    )),
                };
                (slot, result, started.elapsed())
            }
        })
        .collect();

    // Collected per router slot so output order is independent of
    // completion order.
    let mut collected: Vec<Option<(Result<Vec<RawResult>, ProviderError>, Duration)>> =
        (0..attempted.len()).map(|_| None).collect();

    loop {
        match tokio::time::timeout_at(deadline, in_flight.next()).await {
            Ok(Some((slot, result, duration))) => {
                collected[slot] = Some((result, duration));
            }
            Ok(None) => break,
            Err(_) => {
                // Overall deadline elapsed; dropping the stream cancels
                // every in-flight call.
                tracing::warn!("overall search deadline elapsed, cancelling stragglers");
                break;
            }
        }
    }
    drop(in_flight);

    let mut outcomes: Vec<ProviderOutcome> = Vec::with_capacity(attempted.len());
    let mut provider_lists: Vec<(ProviderId, Vec<RawResult>)> = Vec::new();

    for (provider, slot) in attempted.iter().zip(collected) {
        let id = provider.id();
        match slot {
            Some((Ok(results), duration)) => {
                let kept: Vec<RawResult> = results
                    .into_iter()
                    .filter(|r| passes_domain_filters(&r.url, query))
                    .collect();
                tracing::debug!(provider = %id, count = kept.len(), "provider returned results");
                record(breaker, id, true);
                outcomes.push(ProviderOutcome::ok(id, duration));
                provider_lists.push((id, kept));
            }
            Some((Err(err), duration)) => {
                tracing::warn!(provider = %id, error = %err, "provider query failed");
                record(breaker, id, false);
                outcomes.push(ProviderOutcome::failed(id, duration, err.status, err.message));
            }
            None => {
                record(breaker, id, false);
                outcomes.push(ProviderOutcome::failed(
                    id,
                    Duration::from_secs(config.overall_deadline_secs),
                    OutcomeStatus::Timeout,
                    "cancelled at overall deadline",
                ));
            }
        }
    }

    let limit = query.max_results.unwrap_or(config.max_results);
    let results = aggregate(config.strategy, provider_lists, limit);

    SearchResponse { results, outcomes }
}

fn record(breaker: &Mutex<CircuitBreaker>, id: ProviderId, success: bool) {
    if let Ok(mut b) = breaker.lock() {
        if success {
            b.record_success(id);
        } else {
            b.record_failure(id);
        }
    }
}

/// Client-side enforcement of the query's domain filters; providers
/// that support them server-side just return less to throw away.
fn passes_domain_filters(raw_url: &str, query: &SearchQuery) -> bool {
    if query.include_domains.is_empty() && query.exclude_domains.is_empty() {
        return true;
    }
    let Some(host) = Url::parse(raw_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    else {
        return query.include_domains.is_empty();
    };

    let matches = |domain: &String| {
        let d = domain.to_ascii_lowercase();
        host == d || host.ends_with(&format!(".{d}"))
    };

    if query.exclude_domains.iter().any(matches) {
        return false;
    }
    query.include_domains.is_empty() || query.include_domains.iter().any(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_with(include: &[&str], exclude: &[&str]) -> SearchQuery {
        let mut q = SearchQuery::new("test");
        q.include_domains = include.iter().map(|s| s.to_string()).collect();
        q.exclude_domains = exclude.iter().map(|s| s.to_string()).collect();
        q
    }

    #[test]
    fn no_filters_pass_everything() {
        let q = SearchQuery::new("test");
        assert!(passes_domain_filters("https://anywhere.com/x", &q));
        assert!(passes_domain_filters("garbage", &q));
    }

    #[test]
    fn include_filter_matches_host_and_subdomains() {
        let q = query_with(&["rust-lang.org"], &[]);
        assert!(passes_domain_filters("https://rust-lang.org/", &q));
        assert!(passes_domain_filters("https://doc.rust-lang.org/book", &q));
        assert!(!passes_domain_filters("https://rust-lang.org.evil.com/", &q));
        assert!(!passes_domain_filters("https://example.com/", &q));
    }

    #[test]
    fn exclude_filter_wins_over_include() {
        let q = query_with(&["example.com"], &["example.com"]);
        assert!(!passes_domain_filters("https://example.com/", &q));
    }

    #[test]
    fn unparseable_url_fails_include_filter() {
        let q = query_with(&["example.com"], &[]);
        assert!(!passes_domain_filters("not a url", &q));
    }
}
