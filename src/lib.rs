//! # bigram-reduce
//!
//! Bigram frequency counting over a partitioned corpus with a mergeable
//! map-reduce accumulator.
//!
//! ## Usage
//!
//! ```bash
//! bigram-reduce count corpus.txt [--partitions N] [--topology tree] [--top K]
//! ```
//!
//! ## Modules
//!
//! - `aggregation` - The `zero` / `update` / `combine` accumulator contract and its implementations
//! - `tokenizer` - Record to bigram tokenization
//! - `execution` - Partitions and the local map-reduce driver
//! - `finalize` - Full table, top-K and histogram results, plus output formatting
//! - `config` - TOML and environment configuration
//! - `error` - Unified error type with stable error codes
//!
//! ## Example
//!
//! ```
//! use bigram_reduce::aggregation::{Accumulator, Bigram, BigramCounts, Semigroup};
//!
//! let mut a = BigramCounts::zero();
//! a.update(Bigram::new("the", "cat").unwrap());
//! let mut b = BigramCounts::zero();
//! b.update(Bigram::new("the", "cat").unwrap());
//!
//! let merged = a.combine(b);
//! assert_eq!(merged.get(&Bigram::new("the", "cat").unwrap()), 2);
//! ```

pub mod aggregation;
pub mod config;
pub mod error;
pub mod execution;
pub mod finalize;
pub mod tokenizer;

/// The six-line corpus used by the `demo` command
pub const DEMO_CORPUS: &[&str] = &[
    "the cat sat on the mat every day",
    "the cat ate a mouse every day",
    "the cat and the man became friends",
    "I like to eat pizza, but so does the cat.",
    "my cat has a meme coin named after him",
    "I eat pizza every day",
];
