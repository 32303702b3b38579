use std::path::PathBuf;
use thiserror::Error;

/// Result type for chunk production
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while producing chunks
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every input file was skipped (or none was given)
    #[error("No readable input files")]
    NoInputFiles,

    /// More files than a chunk header can address
    #[error("Too many input files: {0}")]
    TooManyFiles(usize),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// File is shorter than when it was probed
    #[error("File {} changed while reading: expected {expected} bytes, hit end at offset {offset}", .path.display())]
    FileChanged {
        path: PathBuf,
        expected: u64,
        offset: u64,
    },

    /// A single word (or codepoint) does not fit in one chunk
    #[error(
        "Word at offset {offset} of file {file_index} is longer than the chunk size ({chunk_size} bytes); use a larger chunk size"
    )]
    UnsplittableWord {
        file_index: u32,
        offset: u64,
        chunk_size: usize,
    },
}

impl ChunkerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
