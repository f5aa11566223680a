//! Bigram frequency accumulator
//!
//! `BigramCounts` maps each distinct bigram to the number of times it was
//! observed. Counts present in the map are always at least one.

use super::{Accumulator, Bigram};
use crate::error::{BigramError, ErrorCode, Result};
use std::collections::HashMap;
use stillwater::Semigroup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BigramCounts {
    counts: HashMap<Bigram, u64>,
}

impl BigramCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from raw counts, rejecting zero counts
    pub fn from_counts(counts: HashMap<Bigram, u64>) -> Result<Self> {
        let state = Self { counts };
        state.validate()?;
        Ok(state)
    }

    /// Count for `bigram`, zero when absent
    pub fn get(&self, bigram: &Bigram) -> u64 {
        self.counts.get(bigram).copied().unwrap_or(0)
    }

    /// Number of distinct bigrams
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of observations across all bigrams
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Bigram, u64)> {
        self.counts.iter().map(|(bigram, count)| (bigram, *count))
    }

    pub fn into_map(self) -> HashMap<Bigram, u64> {
        self.counts
    }

    /// Combine after validating both inputs
    ///
    /// Returns an `Invariant` error instead of panicking when either state
    /// holds a zero count.
    pub fn try_combine(self, other: Self) -> Result<Self> {
        self.validate()?;
        other.validate()?;
        Ok(self.combine(other))
    }
}

impl Accumulator for BigramCounts {
    type Input = Bigram;

    fn zero() -> Self {
        Self::default()
    }

    fn update(&mut self, bigram: Bigram) {
        let count = self.counts.entry(bigram).or_insert(0);
        *count = count.saturating_add(1);
    }

    fn is_zero(&self) -> bool {
        self.counts.is_empty()
    }

    fn validate(&self) -> Result<()> {
        match self.counts.iter().find(|(_, count)| **count == 0) {
            Some((bigram, _)) => Err(BigramError::invariant(
                ErrorCode::AGG_ZERO_COUNT,
                format!("bigram '{}' stored with a zero count", bigram),
            )),
            None => Ok(()),
        }
    }
}

impl Semigroup for BigramCounts {
    /// Sum counts key by key
    ///
    /// The smaller map is folded into the larger one; the result does not
    /// depend on which side is larger.
    fn combine(self, other: Self) -> Self {
        let (mut into, from) = if self.counts.len() >= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };

        assert_no_zero_count(&into);
        assert_no_zero_count(&from);

        for (bigram, count) in from.counts {
            let slot = into.counts.entry(bigram).or_insert(0);
            *slot = slot.saturating_add(count);
        }

        into
    }
}

fn assert_no_zero_count(state: &BigramCounts) {
    if let Some((bigram, _)) = state.counts.iter().find(|(_, count)| **count == 0) {
        panic!("cannot combine a state holding a zero count for '{}'", bigram);
    }
}

impl FromIterator<Bigram> for BigramCounts {
    fn from_iter<I: IntoIterator<Item = Bigram>>(iter: I) -> Self {
        let mut state = Self::zero();
        state.extend(iter);
        state
    }
}

impl Extend<Bigram> for BigramCounts {
    fn extend<I: IntoIterator<Item = Bigram>>(&mut self, iter: I) {
        for bigram in iter {
            self.update(bigram);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bigram(a: &str, b: &str) -> Bigram {
        Bigram::new(a, b).unwrap()
    }

    #[test]
    fn test_update_inserts_then_increments() {
        let mut state = BigramCounts::zero();
        state.update(bigram("the", "cat"));
        assert_eq!(state.get(&bigram("the", "cat")), 1);
        state.update(bigram("the", "cat"));
        assert_eq!(state.get(&bigram("the", "cat")), 2);
        assert_eq!(state.get(&bigram("cat", "the")), 0);
        assert_eq!(state.len(), 1);
        assert_eq!(state.total(), 2);
    }

    #[test]
    fn test_combine_sums_keys_from_both_sides() {
        let a: BigramCounts = vec![bigram("the", "cat"), bigram("cat", "sat")]
            .into_iter()
            .collect();
        let b: BigramCounts = vec![bigram("the", "cat"), bigram("cat", "ran")]
            .into_iter()
            .collect();

        let merged = a.combine(b);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(&bigram("the", "cat")), 2);
        assert_eq!(merged.get(&bigram("cat", "sat")), 1);
        assert_eq!(merged.get(&bigram("cat", "ran")), 1);
    }

    #[test]
    fn test_zero_is_identity() {
        let state: BigramCounts = vec![bigram("a", "b")].into_iter().collect();
        assert_eq!(state.clone().combine(BigramCounts::zero()), state);
        assert_eq!(BigramCounts::zero().combine(state.clone()), state);
    }

    #[test]
    fn test_combine_saturates() {
        let mut raw = HashMap::new();
        raw.insert(bigram("a", "b"), u64::MAX - 1);
        let a = BigramCounts::from_counts(raw.clone()).unwrap();
        let b = BigramCounts::from_counts(raw).unwrap();
        assert_eq!(a.combine(b).get(&bigram("a", "b")), u64::MAX);
    }

    #[test]
    fn test_from_counts_rejects_zero() {
        let mut raw = HashMap::new();
        raw.insert(bigram("a", "b"), 0);
        let err = BigramCounts::from_counts(raw).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AGG_ZERO_COUNT);
        assert!(matches!(err, BigramError::Invariant { .. }));
    }

    #[test]
    fn test_try_combine_reports_invariant_violation() {
        let mut broken = BigramCounts::zero();
        broken.counts.insert(bigram("x", "y"), 0);
        let good: BigramCounts = vec![bigram("a", "b")].into_iter().collect();

        let err = good.try_combine(broken).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AGG_ZERO_COUNT);
    }

    #[test]
    #[should_panic(expected = "zero count")]
    fn test_combine_panics_on_zero_count() {
        let mut broken = BigramCounts::zero();
        broken.counts.insert(bigram("x", "y"), 0);
        let mut bigger = BigramCounts::zero();
        bigger.update(bigram("a", "b"));
        bigger.update(bigram("c", "d"));
        let _ = bigger.combine(broken);
    }

    #[test]
    #[should_panic(expected = "zero count")]
    fn test_combine_panics_when_larger_side_holds_zero_count() {
        let mut broken = BigramCounts::zero();
        broken.update(bigram("a", "b"));
        broken.update(bigram("c", "d"));
        broken.counts.insert(bigram("x", "y"), 0);
        let mut small = BigramCounts::zero();
        small.update(bigram("a", "b"));
        let _ = broken.combine(small);
    }

    #[test]
    #[should_panic(expected = "zero count")]
    fn test_combine_panics_when_larger_side_is_the_argument() {
        let mut broken = BigramCounts::zero();
        broken.update(bigram("a", "b"));
        broken.update(bigram("c", "d"));
        broken.counts.insert(bigram("x", "y"), 0);
        let mut small = BigramCounts::zero();
        small.update(bigram("a", "b"));
        let _ = small.combine(broken);
    }
}
