//! Deduplication by canonical URL with provenance union.
//!
//! Hits sharing a canonical URL collapse into one [`NormalizedResult`];
//! the set of contributing providers is unioned so the aggregator can
//! see cross-provider agreement. A single hash map keyed by canonical
//! URL keeps this O(n) in the total hit count.

use std::collections::HashMap;

use crate::types::{NormalizedResult, ProviderId, RawResult};

use super::url_normalize::canonicalize;

/// Which contributor's title/snippet/rank survive when duplicates meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepPolicy {
    /// Keep the contributor with the highest assigned rank; equal ranks
    /// fall back to provider priority. Used by the `merge` strategy.
    HighestRank,
    /// Keep the first-seen contributor's fields and rank; later
    /// duplicates only contribute provenance. Used by `round_robin` and
    /// `priority`, where the insertion order already encodes the
    /// strategy's intent.
    FirstSeen,
}

/// A raw hit paired with the rank the aggregation strategy assigned it.
#[derive(Debug, Clone)]
pub struct Ranked {
    /// The provider hit.
    pub result: RawResult,
    /// Strategy-assigned rank, higher is better.
    pub rank: f64,
}

struct Slot {
    merged: NormalizedResult,
    retained: ProviderId,
}

/// Deduplicate ranked hits, preserving first-seen output order.
///
/// Output order is insertion order; callers that want score order sort
/// afterwards. Provenance is unioned, published dates are kept from the
/// first contributor that has one, and the retained title/snippet/rank
/// follow `policy`.
pub fn dedup_ranked(candidates: Vec<Ranked>, policy: KeepPolicy) -> Vec<NormalizedResult> {
    let mut slots: Vec<Slot> = Vec::with_capacity(candidates.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(candidates.len());

    for Ranked { result, rank } in candidates {
        let key = canonicalize(&result.url);
        match index.get(&key) {
            None => {
                index.insert(key.clone(), slots.len());
                slots.push(Slot {
                    merged: NormalizedResult {
                        url: key,
                        title: result.title,
                        snippet: result.snippet,
                        providers: vec![result.provider],
                        rank,
                        published: result.published,
                    },
                    retained: result.provider,
                });
            }
            Some(&i) => {
                let slot = &mut slots[i];
                if !slot.merged.providers.contains(&result.provider) {
                    slot.merged.providers.push(result.provider);
                }
                if slot.merged.published.is_none() {
                    slot.merged.published = result.published;
                }
                if policy == KeepPolicy::HighestRank && supersedes(rank, &result, slot) {
                    slot.merged.title = result.title;
                    slot.merged.snippet = result.snippet;
                    slot.merged.rank = rank;
                    slot.retained = result.provider;
                }
            }
        }
    }

    slots.into_iter().map(|s| s.merged).collect()
}

/// Deduplicate raw hits without strategy-assigned ranks.
///
/// Retention follows provider priority (the highest-priority provider's
/// title/snippet win); ranks all come out 0 and are expected to be
/// overwritten by the caller.
pub fn dedup(results: Vec<RawResult>) -> Vec<NormalizedResult> {
    let candidates = results
        .into_iter()
        .map(|result| {
            let rank = f64::from(result.provider.priority());
            Ranked { result, rank }
        })
        .collect();
    let mut merged = dedup_ranked(candidates, KeepPolicy::HighestRank);
    for r in &mut merged {
        r.rank = 0.0;
    }
    merged
}

/// Whether an incoming duplicate should replace the retained fields
/// under [`KeepPolicy::HighestRank`]: strictly higher rank wins, equal
/// rank falls to provider priority.
fn supersedes(rank: f64, incoming: &RawResult, slot: &Slot) -> bool {
    if rank > slot.merged.rank {
        return true;
    }
    rank == slot.merged.rank && incoming.provider.priority() > slot.retained.priority()
}
