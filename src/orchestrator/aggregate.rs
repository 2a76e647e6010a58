//! Multi-provider result aggregation.
//!
//! Takes per-provider ranked lists (in router priority order — carried
//! as a `Vec`, never a map, so ordering can't depend on hash iteration)
//! and combines them under one of three strategies. All strategies are
//! deterministic for identical inputs: every sort key bottoms out in a
//! total ordering over provider priority and canonical URL.

use crate::config::AggregationStrategy;
use crate::types::{NormalizedResult, ProviderId, RawResult};

use super::dedup::{dedup_ranked, KeepPolicy, Ranked};

/// Aggregate per-provider result lists into one deduplicated ranking.
///
/// `provider_lists` must be in the router's provider order (highest
/// priority first); `round_robin` and `priority` consume that order
/// directly, and `merge` uses it for tie-breaks.
pub fn aggregate(
    strategy: AggregationStrategy,
    provider_lists: Vec<(ProviderId, Vec<RawResult>)>,
    limit: usize,
) -> Vec<NormalizedResult> {
    let mut merged = match strategy {
        AggregationStrategy::Merge => merge(provider_lists),
        AggregationStrategy::RoundRobin => round_robin(provider_lists),
        AggregationStrategy::Priority => priority(provider_lists),
    };
    merged.truncate(limit);
    merged
}

/// `merge`: interleave by relevance. Provider-native scores are
/// normalised to [0,1] per provider first, since vendors use
/// incompatible scales; providers without scores fall back to position
/// decay. Highest normalised score wins retained fields on duplicates.
fn merge(provider_lists: Vec<(ProviderId, Vec<RawResult>)>) -> Vec<NormalizedResult> {
    let mut candidates: Vec<Ranked> = Vec::new();
    for (_, results) in provider_lists {
        let ranks = normalise_scores(&results);
        for (result, rank) in results.into_iter().zip(ranks) {
            candidates.push(Ranked { result, rank });
        }
    }

    let mut merged = dedup_ranked(candidates, KeepPolicy::HighestRank);
    merged.sort_by(|a, b| {
        b.rank
            .partial_cmp(&a.rank)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| best_priority(b).cmp(&best_priority(a)))
            .then_with(|| a.url.cmp(&b.url))
    });
    merged
}

/// `round_robin`: index 0 from each provider in order, then index 1,
/// and so on. Used when no provider's relevance signal is trusted more
/// than another's. Output order is the interleave order; duplicates
/// keep their first-seen slot.
fn round_robin(provider_lists: Vec<(ProviderId, Vec<RawResult>)>) -> Vec<NormalizedResult> {
    let mut columns: Vec<std::vec::IntoIter<RawResult>> = provider_lists
        .into_iter()
        .map(|(_, results)| results.into_iter())
        .collect();

    let mut candidates: Vec<Ranked> = Vec::new();
    let mut emitted = true;
    while emitted {
        emitted = false;
        for column in &mut columns {
            if let Some(result) = column.next() {
                let rank = position_decay(candidates.len());
                candidates.push(Ranked { result, rank });
                emitted = true;
            }
        }
    }

    dedup_ranked(candidates, KeepPolicy::FirstSeen)
}

/// `priority`: everything from the highest-priority provider first (in
/// its own order), then non-duplicate fill from each next provider.
/// First-seen dedup over the concatenation gives exactly that.
fn priority(provider_lists: Vec<(ProviderId, Vec<RawResult>)>) -> Vec<NormalizedResult> {
    let mut candidates: Vec<Ranked> = Vec::new();
    for (_, results) in provider_lists {
        for result in results {
            let rank = position_decay(candidates.len());
            candidates.push(Ranked { result, rank });
        }
    }
    dedup_ranked(candidates, KeepPolicy::FirstSeen)
}

/// Normalise one provider's scores to [0,1].
///
/// Min-max over the provider's own list when it reports scores with any
/// spread; positional decay otherwise (no scores, or all identical).
fn normalise_scores(results: &[RawResult]) -> Vec<f64> {
    let scores: Vec<Option<f64>> = results.iter().map(|r| r.score).collect();
    let known: Vec<f64> = scores.iter().filter_map(|s| *s).collect();

    if known.len() == results.len() && !known.is_empty() {
        let min = known.iter().copied().fold(f64::INFINITY, f64::min);
        let max = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max > min {
            return known.iter().map(|s| (s - min) / (max - min)).collect();
        }
    }

    (0..results.len()).map(position_decay).collect()
}

/// Position decay: 1.0 at index 0, falling off hyperbolically.
fn position_decay(index: usize) -> f64 {
    1.0 / (1.0 + index as f64 * 0.1)
}

/// Highest provider priority among a result's provenance — the
/// deterministic tie-break after rank.
fn best_priority(result: &NormalizedResult) -> u8 {
    result
        .providers
        .iter()
        .map(|p| p.priority())
        .max()
        .unwrap_or(0)
}
