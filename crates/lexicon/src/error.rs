use thiserror::Error;

/// Result type for lexical analysis
pub type Result<T> = std::result::Result<T, LexiconError>;

/// Errors raised by the lexical counter.
///
/// Malformed UTF-8 is not an error: it is recovered inside the counter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexiconError {
    /// Chunk header and data disagree
    #[error("Corrupt chunk for file {file_index}: {reason}")]
    CorruptChunk { file_index: u32, reason: String },
}

impl LexiconError {
    pub fn corrupt_chunk(file_index: u32, reason: impl Into<String>) -> Self {
        Self::CorruptChunk {
            file_index,
            reason: reason.into(),
        }
    }
}
