use crate::aggregator::FileReport;
use serde::{Deserialize, Serialize};
use wordfreq_chunker::SkippedFile;

/// Statistics about one distributed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Worker slots
    pub workers: usize,

    /// Rounds of the distribution loop, the final retire-only round included
    pub rounds: u64,

    pub chunks_dispatched: u64,

    /// Chunk data bytes sent (padding excluded)
    pub bytes_dispatched: u64,

    /// Bytes re-read because a chunk was cut back to a boundary
    pub bytes_trimmed: u64,

    /// Chunks handed to each slot, slot 1 first
    pub chunks_per_slot: Vec<u64>,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl RunStats {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            chunks_per_slot: vec![0; workers],
            ..Default::default()
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
    pub stats: RunStats,
}
