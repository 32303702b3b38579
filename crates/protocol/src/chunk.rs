use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Output of the chunk producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A boundary-aligned span of one input file
    Data(ChunkData),

    /// Input exhausted. Once produced, every later request yields `End` again.
    End,
}

impl Chunk {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn into_data(self) -> Option<ChunkData> {
        match self {
            Self::Data(data) => Some(data),
            Self::End => None,
        }
    }
}

/// Bytes of one file between `start_offset` (inclusive) and `end_offset` (exclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    /// Position of the file in the file set
    pub file_index: u32,

    pub start_offset: u64,

    pub end_offset: u64,

    /// Exactly `end_offset - start_offset` bytes, never padded
    pub bytes: Bytes,
}

impl ChunkData {
    pub fn new(file_index: u32, start_offset: u64, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            file_index,
            start_offset,
            end_offset: start_offset + bytes.len() as u64,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Counts a worker computed for one chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkResult {
    pub file_index: u32,

    /// Number of words in the chunk
    pub word_count: u64,

    /// Number of words with at least two instances of the same consonant
    pub consonant_word_count: u64,
}

impl ChunkResult {
    pub fn new(file_index: u32, word_count: u64, consonant_word_count: u64) -> Self {
        Self {
            file_index,
            word_count,
            consonant_word_count,
        }
    }

    pub fn empty(file_index: u32) -> Self {
        Self::new(file_index, 0, 0)
    }
}
