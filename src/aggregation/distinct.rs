//! Distinct-bigram accumulator
//!
//! Tracks which bigrams occur at all, without counts. Combine is set union.

use super::{Accumulator, Bigram};
use std::collections::HashSet;
use stillwater::Semigroup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctBigrams {
    seen: HashSet<Bigram>,
}

impl DistinctBigrams {
    pub fn contains(&self, bigram: &Bigram) -> bool {
        self.seen.contains(bigram)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Distinct bigrams in lexicographic order
    pub fn into_sorted(self) -> Vec<Bigram> {
        let mut bigrams: Vec<Bigram> = self.seen.into_iter().collect();
        bigrams.sort();
        bigrams
    }
}

impl Accumulator for DistinctBigrams {
    type Input = Bigram;

    fn zero() -> Self {
        Self::default()
    }

    fn update(&mut self, bigram: Bigram) {
        self.seen.insert(bigram);
    }

    fn is_zero(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Semigroup for DistinctBigrams {
    fn combine(self, other: Self) -> Self {
        let (mut into, from) = if self.seen.len() >= other.seen.len() {
            (self, other)
        } else {
            (other, self)
        };
        into.seen.extend(from.seen);
        into
    }
}
