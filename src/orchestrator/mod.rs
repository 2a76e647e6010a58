//! Request orchestration: concurrent search fan-out, sequential scrape
//! fallback, deduplication, and aggregation.
//!
//! The orchestrator owns partial-failure semantics: a provider failing
//! never aborts the others, and the caller always gets a result set
//! (possibly empty) plus one diagnostic per attempted provider.

pub mod aggregate;
pub mod dedup;
pub mod fetch;
pub mod search;
pub mod url_normalize;

use serde::{Deserialize, Serialize};

use crate::types::{ExtractionResult, NormalizedResult, ProviderOutcome};

/// Everything a search call hands back: deduplicated ranked results
/// plus per-provider diagnostics, in router order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Deduplicated, ranked results.
    pub results: Vec<NormalizedResult>,
    /// One record per attempted provider, in router order.
    pub outcomes: Vec<ProviderOutcome>,
}

/// Everything a fetch call hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    /// The extraction (success or failure; see
    /// [`ExtractionResult::is_success`]).
    pub extraction: ExtractionResult,
    /// One record per attempted provider, in chain order.
    pub outcomes: Vec<ProviderOutcome>,
}
