//! Partition sources for the map phase
//!
//! A partition is an opaque, disjoint slice of the record stream. The driver
//! only ever asks a partition for a fresh pass over its records, so re-running
//! a partition after a failure starts from the beginning.

use crate::error::{BigramError, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A stream of raw records; an `Err` item fails the whole partition
pub type RecordStream<'a> = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send + 'a>;

/// Partition handle shared between worker tasks
pub type SharedPartition = Arc<dyn Partition>;

pub trait Partition: Send + Sync {
    /// Engine-assigned partition id
    fn id(&self) -> usize;

    /// Open a new pass over the partition's records
    fn records(&self) -> Result<RecordStream<'_>>;
}

/// Records held in memory
#[derive(Debug, Clone)]
pub struct InMemoryPartition {
    id: usize,
    records: Vec<Vec<u8>>,
}

impl InMemoryPartition {
    pub fn new(id: usize, records: Vec<Vec<u8>>) -> Self {
        Self { id, records }
    }

    pub fn from_lines<I, S>(id: usize, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = lines
            .into_iter()
            .map(|line| line.into().into_bytes())
            .collect();
        Self { id, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Partition for InMemoryPartition {
    fn id(&self) -> usize {
        self.id
    }

    fn records(&self) -> Result<RecordStream<'_>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }
}

/// One newline-delimited file, read lazily on every pass
#[derive(Debug, Clone)]
pub struct FilePartition {
    id: usize,
    path: PathBuf,
}

impl FilePartition {
    pub fn new(id: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Partition for FilePartition {
    fn id(&self) -> usize {
        self.id
    }

    fn records(&self) -> Result<RecordStream<'_>> {
        let file = File::open(&self.path).map_err(|e| {
            BigramError::from(e)
                .with_partition(self.id)
                .with_context(self.path.display())
        })?;
        Ok(Box::new(read_lines(BufReader::new(file))))
    }
}

/// Split a reader into newline-delimited records, dropping a trailing `\r`
pub fn read_lines<R>(reader: R) -> impl Iterator<Item = io::Result<Vec<u8>>> + Send
where
    R: BufRead + Send,
{
    reader.split(b'\n').map(|line| {
        line.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            bytes
        })
    })
}

/// Split records into at most `count` contiguous in-memory partitions
///
/// Always returns at least one partition, even for an empty input.
pub fn split_records(records: Vec<Vec<u8>>, count: usize) -> Vec<InMemoryPartition> {
    let count = count.max(1);
    if records.is_empty() {
        return vec![InMemoryPartition::new(0, Vec::new())];
    }

    let chunk_size = records.len().div_ceil(count);
    let mut partitions = Vec::with_capacity(count);
    let mut records = records.into_iter().peekable();
    let mut id = 0;
    while records.peek().is_some() {
        let chunk: Vec<Vec<u8>> = records.by_ref().take(chunk_size).collect();
        partitions.push(InMemoryPartition::new(id, chunk));
        id += 1;
    }
    partitions
}

/// Erase concrete partition types for the driver
pub fn share<P: Partition + 'static>(partitions: Vec<P>) -> Vec<SharedPartition> {
    partitions
        .into_iter()
        .map(|p| Arc::new(p) as SharedPartition)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect(partition: &dyn Partition) -> Vec<Vec<u8>> {
        partition
            .records()
            .unwrap()
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_split_records_is_contiguous_and_disjoint() {
        let records: Vec<Vec<u8>> = (0..10).map(|i| vec![b'a' + i]).collect();
        let partitions = split_records(records.clone(), 3);

        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[0].len(), 4);
        assert_eq!(partitions[2].len(), 2);

        let rejoined: Vec<Vec<u8>> = partitions.iter().flat_map(|p| collect(p)).collect();
        assert_eq!(rejoined, records);
    }

    #[test]
    fn test_split_more_partitions_than_records() {
        let partitions = split_records(vec![b"x".to_vec(), b"y".to_vec()], 8);
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[1].id(), 1);
    }

    #[test]
    fn test_split_empty_input() {
        let partitions = split_records(Vec::new(), 4);
        assert_eq!(partitions.len(), 1);
        assert!(partitions[0].is_empty());
    }

    #[test]
    fn test_file_partition_rereads_on_every_pass() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "the cat sat\r\nthe cat ran\n").unwrap();

        let partition = FilePartition::new(5, file.path());
        let first = collect(&partition);
        let second = collect(&partition);

        assert_eq!(first, vec![b"the cat sat".to_vec(), b"the cat ran".to_vec()]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_not_recoverable() {
        let partition = FilePartition::new(2, "/definitely/not/here.txt");
        let err = partition.records().err().unwrap();
        assert_eq!(err.code(), crate::error::ErrorCode::PARTITION_NOT_FOUND);
        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("Partition 2"));
    }
}
