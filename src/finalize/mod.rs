//! Finalization of merged accumulator state into caller-visible results
//!
//! The finalizer runs once on the fully merged state. An empty state means
//! every record was skipped or produced no bigrams; that is reported as
//! `NoValidRecords`, separately from a broken state (`Invariant`).

pub mod formatter;

pub use formatter::{FormatType, OutputFormatter};

use crate::aggregation::{Accumulator, Bigram, BigramCounts, DistinctBigrams};
use crate::error::{BigramError, Result};
use crate::execution::{AggregationOutcome, MapStats};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Output shape requested from the finalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeMode {
    /// Every bigram with its count, unordered
    Full,
    /// The K most frequent bigrams
    TopK(usize),
    /// How many distinct bigrams share each count
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BigramCount {
    pub bigram: Bigram,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBucket {
    pub count: u64,
    pub num_bigrams: usize,
}

/// Finalized result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    Full { bigrams: Vec<BigramCount> },
    TopK { k: usize, bigrams: Vec<BigramCount> },
    Histogram { buckets: Vec<HistogramBucket> },
    Distinct { bigrams: Vec<Bigram> },
}

/// A finalized result together with the map-phase counters behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub stats: MapStats,
    pub result: Report,
}

/// Finalize a merged frequency state
pub fn finalize(
    outcome: AggregationOutcome<BigramCounts>,
    mode: FinalizeMode,
) -> Result<AggregationReport> {
    let AggregationOutcome { state, stats } = outcome;
    ensure_non_empty(&state, &stats)?;

    let result = match mode {
        FinalizeMode::Full => Report::Full {
            bigrams: full_table(state),
        },
        FinalizeMode::TopK(k) => Report::TopK {
            k,
            bigrams: top_k(&state, k),
        },
        FinalizeMode::Histogram => Report::Histogram {
            buckets: histogram(&state),
        },
    };

    Ok(AggregationReport { stats, result })
}

/// Finalize a merged distinct-bigram state into its sorted bigram list
pub fn finalize_distinct(
    outcome: AggregationOutcome<DistinctBigrams>,
) -> Result<AggregationReport> {
    let AggregationOutcome { state, stats } = outcome;
    ensure_non_empty(&state, &stats)?;

    Ok(AggregationReport {
        stats,
        result: Report::Distinct {
            bigrams: state.into_sorted(),
        },
    })
}

fn ensure_non_empty<A: Accumulator>(state: &A, stats: &MapStats) -> Result<()> {
    state.validate()?;
    if state.is_zero() {
        return Err(BigramError::no_valid_records(stats.skipped));
    }
    Ok(())
}

/// Every bigram with its count, in no particular order
pub fn full_table(state: BigramCounts) -> Vec<BigramCount> {
    state
        .into_map()
        .into_iter()
        .map(|(bigram, count)| BigramCount { bigram, count })
        .collect()
}

/// Ranking order: count descending, then bigram ascending
fn by_rank(a: &BigramCount, b: &BigramCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.bigram.cmp(&b.bigram))
}

/// The `k` highest-count bigrams, ties broken lexicographically
///
/// Returns every bigram when `k` exceeds the number of distinct bigrams.
pub fn top_k(state: &BigramCounts, k: usize) -> Vec<BigramCount> {
    let mut entries: Vec<BigramCount> = state
        .iter()
        .map(|(bigram, count)| BigramCount {
            bigram: bigram.clone(),
            count,
        })
        .collect();

    if k < entries.len() {
        if k > 0 {
            entries.select_nth_unstable_by(k - 1, by_rank);
        }
        entries.truncate(k);
    }
    entries.sort_unstable_by(by_rank);
    entries
}

/// Number of distinct bigrams per count, ascending by count
pub fn histogram(state: &BigramCounts) -> Vec<HistogramBucket> {
    let mut buckets: BTreeMap<u64, usize> = BTreeMap::new();
    for (_, count) in state.iter() {
        *buckets.entry(count).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(count, num_bigrams)| HistogramBucket { count, num_bigrams })
        .collect()
}
