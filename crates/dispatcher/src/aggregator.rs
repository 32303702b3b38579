use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wordfreq_chunker::FileSet;
use wordfreq_protocol::ChunkResult;

/// Running totals for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccumulator {
    pub word_count: u64,
    pub consonant_word_count: u64,

    /// Chunk results merged so far
    pub chunks: u64,
}

/// Final counts for one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file_index: u32,
    pub path: PathBuf,
    pub word_count: u64,
    pub consonant_word_count: u64,
}

/// Merges chunk results by file index. Addition only, so the order in which
/// results arrive does not matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultAggregator {
    files: Vec<FileAccumulator>,
}

impl ResultAggregator {
    pub fn new(file_count: usize) -> Self {
        Self {
            files: vec![FileAccumulator::default(); file_count],
        }
    }

    pub fn absorb(&mut self, result: ChunkResult) -> Result<(), ProtocolError> {
        let acc = self
            .files
            .get_mut(result.file_index as usize)
            .ok_or(ProtocolError::UnknownFile {
                file_index: result.file_index,
            })?;
        acc.word_count += result.word_count;
        acc.consonant_word_count += result.consonant_word_count;
        acc.chunks += 1;
        Ok(())
    }

    pub fn accumulator(&self, file_index: u32) -> Option<&FileAccumulator> {
        self.files.get(file_index as usize)
    }

    pub fn accumulators(&self) -> &[FileAccumulator] {
        &self.files
    }

    /// Totals for every file, in file set order
    pub fn report(&self, files: &FileSet) -> Vec<FileReport> {
        files
            .iter()
            .zip(&self.files)
            .enumerate()
            .map(|(index, (entry, acc))| FileReport {
                file_index: index as u32,
                path: entry.path.clone(),
                word_count: acc.word_count,
                consonant_word_count: acc.consonant_word_count,
            })
            .collect()
    }
}
