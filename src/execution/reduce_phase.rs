//! Reduce phase: merge partition outcomes under the configured topology

use super::{AggregationDriver, AggregationOutcome, SharedPartition, Topology};
use crate::aggregation::{Accumulator, Bigram};
use crate::error::{BigramError, ErrorCode, Result};
use crate::tokenizer::Tokenizer;
use futures::stream::{FuturesUnordered, StreamExt};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stillwater::Semigroup;
use tokio::sync::Semaphore;
use tracing::{debug, info};

impl<T: Tokenizer + 'static> AggregationDriver<T> {
    /// Run the full aggregation under any topology
    pub async fn execute<A>(&self, partitions: &[SharedPartition]) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        match self.config.topology {
            Topology::Streaming => self.run_streaming(partitions).await,
            Topology::Sequential | Topology::Tree => {
                let driver = self.clone();
                let partitions = partitions.to_vec();
                tokio::task::spawn_blocking(move || driver.run(&partitions))
                    .await
                    .map_err(task_failed)?
            }
        }
    }

    /// Run the aggregation on the calling thread
    ///
    /// Supports the sequential and tree topologies; streaming needs an async
    /// runtime and goes through `execute`.
    pub fn run<A>(&self, partitions: &[SharedPartition]) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        info!(
            "Aggregating {} partition(s) with {} topology",
            partitions.len(),
            self.config.topology
        );

        let outcome = match self.config.topology {
            Topology::Sequential => self.run_sequential(partitions)?,
            Topology::Tree => self.run_tree(partitions)?,
            Topology::Streaming => {
                return Err(BigramError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    "streaming topology requires an async runtime",
                ))
            }
        };

        finish(outcome)
    }

    /// Left fold over partitions in order
    fn run_sequential<A>(&self, partitions: &[SharedPartition]) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        partitions
            .iter()
            .try_fold(AggregationOutcome::zero(), |acc, partition| {
                let outcome = self.map_with_retry::<A>(partition.as_ref())?;
                Ok(acc.combine(outcome))
            })
    }

    /// Parallel map with a tree-shaped merge on a bounded rayon pool
    fn run_tree<A>(&self, partitions: &[SharedPartition]) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_parallel.max(1))
            .build()
            .map_err(|e| {
                BigramError::partition_with_code(
                    ErrorCode::PARTITION_TASK_FAILED,
                    "failed to start worker pool",
                    None,
                )
                .with_source(e)
            })?;

        pool.install(|| {
            partitions
                .par_iter()
                .map(|partition| self.map_with_retry::<A>(partition.as_ref()))
                .try_reduce(AggregationOutcome::zero, |a, b| Ok(a.combine(b)))
        })
    }

    /// Map partitions on bounded blocking tasks, merging each result as soon
    /// as it arrives
    pub async fn run_streaming<A>(
        &self,
        partitions: &[SharedPartition],
    ) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        info!(
            "Aggregating {} partition(s) with streaming topology (max parallel: {})",
            partitions.len(),
            self.config.max_parallel
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let cancel = Arc::new(AtomicBool::new(false));
        let mut tasks = FuturesUnordered::new();

        for partition in partitions.iter().cloned() {
            let driver = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = Arc::clone(&cancel);
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    BigramError::partition_with_code(
                        ErrorCode::PARTITION_TASK_FAILED,
                        "worker pool closed",
                        Some(partition.id()),
                    )
                    .with_source(e)
                })?;
                tokio::task::spawn_blocking(move || {
                    driver.map_with_retry_until::<A>(partition.as_ref(), &cancel)
                })
                .await
                .map_err(task_failed)?
            }));
        }

        let mut merged = AggregationOutcome::zero();
        while let Some(joined) = tasks.next().await {
            let result = joined.map_err(task_failed).and_then(|r| r);
            match result {
                Ok(outcome) => {
                    debug!(
                        "Merged partial result ({} records)",
                        outcome.stats.records
                    );
                    merged = merged.combine(outcome);
                }
                Err(err) => {
                    // Aborting a task does not stop its blocking map work
                    cancel.store(true, Ordering::Relaxed);
                    for task in tasks.iter() {
                        task.abort();
                    }
                    return Err(err);
                }
            }
        }

        finish(merged)
    }
}

/// Check the merged state before handing it to the finalizer
fn finish<A: Accumulator>(outcome: AggregationOutcome<A>) -> Result<AggregationOutcome<A>> {
    outcome.state.validate()?;
    info!(
        "Aggregation complete: {} partition(s), {} record(s), {} skipped, {} retried",
        outcome.stats.partitions,
        outcome.stats.records,
        outcome.stats.skipped,
        outcome.stats.retries
    );
    Ok(outcome)
}

fn task_failed(err: tokio::task::JoinError) -> BigramError {
    BigramError::partition_with_code(
        ErrorCode::PARTITION_TASK_FAILED,
        "partition task did not complete",
        None,
    )
    .with_source(err)
}
