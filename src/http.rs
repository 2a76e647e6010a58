//! Shared HTTP client construction.
//!
//! One [`reqwest::Client`] is built per [`crate::Foray`] instance and
//! injected into every provider — it is the only state that outlives a
//! single request (its connection pool is safe for concurrent use).
//! Reader-style fetches rotate through realistic browser User-Agents.

use rand::seq::SliceRandom;
use std::time::Duration;

use crate::config::ForayConfig;
use crate::error::ForayError;

/// Realistic browser User-Agent strings for reader-style fetches.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build the shared [`reqwest::Client`] for provider calls.
///
/// The per-provider call timeout is enforced by the orchestrator with
/// `tokio::time::timeout`, so the client itself only carries a connect
/// timeout plus decompression and redirect policy.
///
/// # Errors
///
/// Returns [`ForayError::Http`] if the client cannot be constructed.
pub fn build_client(config: &ForayConfig) -> Result<reqwest::Client, ForayError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.provider_timeout_secs.min(10)))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ForayError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
