use serde::{Deserialize, Serialize};

/// Chunk size used when none is configured
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Largest accepted chunk size; keeps every payload frame bounded
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Configuration for chunk production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Upper bound on the bytes of one chunk, and the exact payload size on the wire
    pub chunk_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkerConfig {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(format!(
                "chunk_size ({}) cannot exceed {MAX_CHUNK_SIZE}",
                self.chunk_size
            ));
        }

        Ok(())
    }
}
