//! Error types for the foray crate.
//!
//! Only hard failures live here — everything a provider does wrong at
//! runtime is recovered into a [`crate::types::ProviderOutcome`] and never
//! propagates to the caller. Messages are stable strings with no API keys
//! or vendor response bodies embedded.

/// Errors that can propagate to the caller of [`crate::Foray`].
#[derive(Debug, thiserror::Error)]
pub enum ForayError {
    /// Invalid configuration, including the case where no provider is
    /// enabled for the requested operation. This is the single condition
    /// under which `search`/`fetch` return an error instead of an
    /// empty-with-diagnostics response.
    #[error("config error: {0}")]
    Config(String),

    /// The shared HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Convenience type alias for foray results.
pub type Result<T> = std::result::Result<T, ForayError>;
