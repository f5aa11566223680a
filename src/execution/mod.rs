//! Local map-reduce engine for bigram aggregation
//!
//! The driver streams each partition through a tokenizer into a fresh
//! accumulator (map phase) and folds partition states with `combine`
//! (reduce phase). Three merge topologies are supported; all of them yield
//! the same result because `combine` is associative and commutative.

pub mod map_phase;
pub mod partition;
pub mod reduce_phase;

pub use partition::{
    read_lines, share, split_records, FilePartition, InMemoryPartition, Partition, RecordStream,
    SharedPartition,
};

use crate::aggregation::Accumulator;
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use stillwater::Semigroup;

/// Shape of the reduce phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Map and fold partitions one after another
    Sequential,
    /// Map in parallel and merge as a balanced tree
    #[default]
    Tree,
    /// Map on bounded worker tasks and merge results as they arrive
    Streaming,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::Tree => "tree",
            Self::Streaming => "streaming",
        };
        f.write_str(name)
    }
}

/// Driver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub topology: Topology,
    /// Upper bound on partitions mapped at once
    pub max_parallel: usize,
    /// Extra attempts for a partition that fails with a transient error
    pub max_retries: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            max_parallel: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_retries: 2,
        }
    }
}

/// Counters collected during the map phase
///
/// Stats combine the same way accumulator states do, so they travel with
/// the state through every merge topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    pub partitions: u64,
    pub records: u64,
    pub skipped: u64,
    pub retries: u64,
}

impl Semigroup for MapStats {
    fn combine(self, other: Self) -> Self {
        Self {
            partitions: self.partitions.saturating_add(other.partitions),
            records: self.records.saturating_add(other.records),
            skipped: self.skipped.saturating_add(other.skipped),
            retries: self.retries.saturating_add(other.retries),
        }
    }
}

/// An accumulator state paired with the stats of the records behind it
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome<A> {
    pub state: A,
    pub stats: MapStats,
}

impl<A: Accumulator> AggregationOutcome<A> {
    pub fn zero() -> Self {
        Self {
            state: A::zero(),
            stats: MapStats::default(),
        }
    }
}

impl<A: Accumulator> Semigroup for AggregationOutcome<A> {
    fn combine(self, other: Self) -> Self {
        Self {
            state: self.state.combine(other.state),
            stats: self.stats.combine(other.stats),
        }
    }
}

/// Runs the map and reduce phases over a set of partitions
pub struct AggregationDriver<T> {
    tokenizer: Arc<T>,
    config: DriverConfig,
}

impl<T> Clone for AggregationDriver<T> {
    fn clone(&self) -> Self {
        Self {
            tokenizer: Arc::clone(&self.tokenizer),
            config: self.config.clone(),
        }
    }
}

impl<T: Tokenizer + 'static> AggregationDriver<T> {
    pub fn new(tokenizer: T, config: DriverConfig) -> Self {
        Self {
            tokenizer: Arc::new(tokenizer),
            config,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }
}
