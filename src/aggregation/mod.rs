//! Mergeable accumulators for partitioned bigram aggregation
//!
//! Every accumulator exposes exactly three operations to an execution engine:
//! `zero`, `update` and `combine`. `combine` comes from `stillwater::Semigroup`
//! and must be associative and commutative with `zero()` as its identity, so
//! partition states can be merged in any order or grouping.

pub mod bigram;
pub mod counts;
pub mod distinct;


pub use bigram::Bigram;
pub use counts::BigramCounts;
pub use distinct::DistinctBigrams;
pub use stillwater::Semigroup;

use crate::error::Result;
use rayon::prelude::*;

/// The aggregation contract hosted by the execution engine
pub trait Accumulator: Semigroup + Send + Sized + 'static {
    /// A single observation folded into the state
    type Input;

    /// The identity state
    fn zero() -> Self;

    /// Fold one observation into the state
    fn update(&mut self, input: Self::Input);

    /// True when the state equals `zero()`
    fn is_zero(&self) -> bool;

    /// Check the representation invariants of the state
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Fold partition states sequentially, starting from the identity
pub fn aggregate_states<A, I>(states: I) -> A
where
    A: Accumulator,
    I: IntoIterator<Item = A>,
{
    states.into_iter().fold(A::zero(), |acc, state| acc.combine(state))
}

/// Merge partition states as a balanced tree on the rayon pool
///
/// Associativity guarantees the same result as `aggregate_states`.
pub fn parallel_aggregate<A: Accumulator>(states: Vec<A>) -> A {
    states.into_par_iter().reduce(A::zero, |a, b| a.combine(b))
}
