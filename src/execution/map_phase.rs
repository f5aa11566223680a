//! Map phase: one partition through the tokenizer into a fresh accumulator

use super::{AggregationDriver, AggregationOutcome, MapStats, Partition};
use crate::aggregation::{Accumulator, Bigram};
use crate::error::{BigramError, ErrorCode, Result};
use crate::tokenizer::Tokenizer;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

impl<T: Tokenizer + 'static> AggregationDriver<T> {
    /// Map one partition in a single attempt
    ///
    /// Records that fail to tokenize are skipped and counted. A failure to
    /// read the partition aborts the attempt and discards its state.
    pub fn map_partition<A>(&self, partition: &dyn Partition) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        self.map_partition_until(partition, &AtomicBool::new(false))
    }

    /// Map one partition, stopping before the next record once `cancel` is set
    pub(crate) fn map_partition_until<A>(
        &self,
        partition: &dyn Partition,
        cancel: &AtomicBool,
    ) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        let id = partition.id();
        let mut state = A::zero();
        let mut stats = MapStats {
            partitions: 1,
            ..MapStats::default()
        };

        debug!("Mapping partition {}", id);

        for (index, record) in partition.records()?.enumerate() {
            if cancel.load(Ordering::Relaxed) {
                debug!("Partition {} cancelled after {} records", id, stats.records);
                return Err(BigramError::partition_with_code(
                    ErrorCode::PARTITION_CANCELLED,
                    "cancelled",
                    Some(id),
                ));
            }
            let record = record.map_err(|e| BigramError::from(e).with_partition(id))?;
            stats.records += 1;

            match self.tokenizer.bigrams(&record) {
                Ok(bigrams) => {
                    for bigram in bigrams {
                        state.update(bigram);
                    }
                }
                Err(err) if err.is_recoverable() => {
                    stats.skipped += 1;
                    let err = err.with_record(index);
                    warn!(
                        partition = id,
                        code = err.code(),
                        "Skipping record: {}",
                        err.user_message()
                    );
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            "Partition {} mapped: {} records, {} skipped",
            id, stats.records, stats.skipped
        );

        Ok(AggregationOutcome { state, stats })
    }

    /// Map one partition, re-running it from `zero()` on transient failures
    ///
    /// A failed attempt's state is dropped before the next attempt starts, so
    /// only the successful attempt ever reaches `combine`.
    pub fn map_with_retry<A>(&self, partition: &dyn Partition) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        self.map_with_retry_until(partition, &AtomicBool::new(false))
    }

    pub(crate) fn map_with_retry_until<A>(
        &self,
        partition: &dyn Partition,
        cancel: &AtomicBool,
    ) -> Result<AggregationOutcome<A>>
    where
        A: Accumulator<Input = Bigram>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            match self.map_partition_until::<A>(partition, cancel) {
                Ok(mut outcome) => {
                    outcome.stats.retries = u64::from(attempt);
                    return Ok(outcome);
                }
                Err(err) if err.is_recoverable() && attempt < max_retries => {
                    attempt += 1;
                    warn!(
                        partition = partition.id(),
                        "Partition attempt {} failed, retrying: {}",
                        attempt,
                        err
                    );
                }
                Err(err) if err.is_recoverable() => {
                    return Err(BigramError::partition_with_code(
                        ErrorCode::PARTITION_RETRIES_EXHAUSTED,
                        format!("gave up after {} attempt(s)", attempt + 1),
                        Some(partition.id()),
                    )
                    .with_source(err));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
