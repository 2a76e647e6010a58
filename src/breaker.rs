//! Per-provider circuit breaker.
//!
//! Tracks consecutive failures per provider and temporarily takes a
//! provider out of rotation when it keeps failing. After a cooldown the
//! circuit goes half-open and a single probe call decides whether to
//! restore or re-trip it. Owned by the [`crate::Foray`] client — there
//! is no global instance; tests and embedders get isolated state.
//!
//! State machine: Closed → (N consecutive failures) → Open →
//! (cooldown) → HalfOpen → success restores Closed / failure re-trips.

use std::collections::HashMap;
use std::time::Instant;

use crate::types::ProviderId;

/// Circuit state for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Healthy — calls flow.
    Closed,
    /// Tripped — calls are skipped until the cooldown elapses.
    Open,
    /// Cooldown elapsed — one probe call is allowed.
    HalfOpen,
}

#[derive(Debug, Clone)]
struct ProviderHealth {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
        }
    }
}

/// Breaker tuning.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Seconds to hold the circuit open before allowing a probe.
    pub cooldown_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

/// Per-provider circuit breaker.
///
/// Not internally synchronised; the owner wraps it in a mutex. Only the
/// orchestrator mutates it — router, aggregator, and deduplicator stay
/// pure.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    providers: HashMap<ProviderId, ProviderHealth>,
}

impl CircuitBreaker {
    /// Create a breaker with the given tuning.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
        }
    }

    /// Record a successful call: failure count resets, circuit closes.
    pub fn record_success(&mut self, provider: ProviderId) {
        let health = self.providers.entry(provider).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
    }

    /// Record a failed call; trips the circuit at the threshold.
    pub fn record_failure(&mut self, provider: ProviderId) {
        let health = self.providers.entry(provider).or_default();
        health.consecutive_failures += 1;
        health.last_failure_at = Some(Instant::now());
        if health.consecutive_failures >= self.config.failure_threshold {
            health.state = CircuitState::Open;
        }
    }

    /// Whether a call to this provider should be attempted now.
    ///
    /// Open circuits transition to half-open (and allow one probe) once
    /// the cooldown has elapsed.
    pub fn should_attempt(&mut self, provider: ProviderId) -> bool {
        let cooldown = self.config.cooldown_secs;
        let health = self.providers.entry(provider).or_default();
        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = health
                    .last_failure_at
                    .map_or(true, |t| t.elapsed().as_secs() >= cooldown);
                if elapsed {
                    health.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Current state for one provider (Closed if never seen).
    pub fn state(&self, provider: ProviderId) -> CircuitState {
        self.providers
            .get(&provider)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// Forget all tracked health.
    pub fn reset(&mut self) {
        self.providers.clear();
    }
}
