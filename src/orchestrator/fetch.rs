//! Sequential scrape fallback chain.
//!
//! Providers are tried strictly in router order, advancing only on
//! failure and returning as soon as one succeeds. Transient failures
//! (`timeout`, `rate_limited`) get a bounded retry loop with
//! exponential backoff and jitter before the chain advances; permanent
//! failures advance immediately. Exhausting the chain yields a failure
//! extraction carrying the last provider's error, with every attempted
//! provider's outcome preserved.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::breaker::CircuitBreaker;
use crate::config::ForayConfig;
use crate::provider::{ProviderError, ScrapeProvider};
use crate::types::{ExtractionResult, OutcomeStatus, ProviderOutcome, ScrapeRequest};

use super::FetchResponse;

/// Walk the fallback chain for one scrape request.
pub async fn run_fetch(
    chain: Vec<Arc<dyn ScrapeProvider>>,
    request: &ScrapeRequest,
    config: &ForayConfig,
    breaker: &Mutex<CircuitBreaker>,
) -> FetchResponse {
    let per_provider = Duration::from_secs(config.provider_timeout_secs);
    let mut outcomes: Vec<ProviderOutcome> = Vec::new();
    let mut last_error: Option<ProviderError> = None;

    for provider in chain {
        let id = provider.id();

        let allowed = breaker
            .lock()
            .map(|mut b| b.should_attempt(id))
            .unwrap_or(true);
        if !allowed {
            tracing::debug!(provider = %id, "circuit open, skipping provider");
            continue;
        }

        let started = Instant::now();
        let mut attempt: u32 = 0;
        let error = loop {
            let result = match tokio::time::timeout(per_provider, provider.fetch(request)).await {
                Ok(inner) => inner,
                Err(_) => Err(ProviderError::new(
                    OutcomeStatus::Timeout,
                    "provider timeout elapsed",
                )),
            };

            match result {
                Ok(extraction) => {
                    tracing::debug!(provider = %id, "extraction succeeded");
                    if let Ok(mut b) = breaker.lock() {
                        b.record_success(id);
                    }
                    outcomes.push(ProviderOutcome::ok(id, started.elapsed()));
                    return FetchResponse {
                        extraction: ExtractionResult::success(
                            extraction.content,
                            extraction.format,
                            extraction.metadata,
                        ),
                        outcomes,
                    };
                }
                Err(err) if err.status.is_transient() && attempt < config.retry_attempts => {
                    attempt += 1;
                    let delay = backoff_delay(config.backoff_base_ms, attempt);
                    tracing::debug!(
                        provider = %id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        status = %err.status,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => break err,
            }
        };

        tracing::warn!(provider = %id, error = %error, "extraction failed, advancing chain");
        if let Ok(mut b) = breaker.lock() {
            b.record_failure(id);
        }
        outcomes.push(ProviderOutcome::failed(
            id,
            started.elapsed(),
            error.status,
            error.message.clone(),
        ));
        last_error = Some(error);
    }

    let message = match last_error {
        Some(err) => err.to_string(),
        None => "no scrape provider available".to_string(),
    };
    FetchResponse {
        extraction: ExtractionResult::failure(request.format, message),
        outcomes,
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt-1)` plus up to
/// half the base on top, capped at ten seconds.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exp = base_ms.saturating_mul(1 << (attempt - 1).min(16));
    let jitter = if base_ms > 0 {
        rand::thread_rng().gen_range(0..=base_ms / 2)
    } else {
        0
    };
    Duration::from_millis(exp.saturating_add(jitter).min(10_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        // Jitter adds at most base/2, so the floor still orders them.
        let d1 = backoff_delay(200, 1);
        let d3 = backoff_delay(200, 3);
        assert!(d1.as_millis() >= 200);
        assert!(d1.as_millis() <= 300);
        assert!(d3.as_millis() >= 800);
        assert!(d3.as_millis() <= 900);
    }

    #[test]
    fn backoff_is_capped() {
        assert!(backoff_delay(5_000, 12).as_millis() <= 10_000);
    }

    #[test]
    fn zero_base_means_no_delay() {
        assert_eq!(backoff_delay(0, 1), Duration::ZERO);
    }
}
