//! # Wordfreq Chunker
//!
//! Dispatcher-side chunk production: splits a set of input files into byte
//! spans that never cut a UTF-8 codepoint or a word in two.
//!
//! ## Pipeline
//!
//! ```text
//! paths
//!   │
//!   ├──> FileSet::probe        open + size, skip unreadable inputs
//!   │
//!   └──> ChunkProducer::next_chunk
//!          ├─> FileCursor      one open handle, monotone offset
//!          ├─> read ≤ chunk_size bytes
//!          ├─> trim a truncated codepoint
//!          ├─> trim back to the last word boundary (unless at end of file)
//!          └─> give the trimmed bytes back, emit Chunk::Data
//!
//!        ... Chunk::End forever once the last file is consumed
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordfreq_chunker::{ChunkProducer, ChunkerConfig, FileSet};
//! use wordfreq_protocol::Chunk;
//!
//! let (files, skipped) = FileSet::probe(["book.txt"]);
//! assert!(skipped.is_empty());
//!
//! let mut producer = ChunkProducer::new(files, ChunkerConfig::default()).unwrap();
//! while let Chunk::Data(chunk) = producer.next_chunk().unwrap() {
//!     println!("file {} [{}..{})", chunk.file_index, chunk.start_offset, chunk.end_offset);
//! }
//! ```

pub mod boundary;
mod config;
mod cursor;
mod error;
mod file_set;
mod producer;

pub use config::{ChunkerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use cursor::FileCursor;
pub use error::{ChunkerError, Result};
pub use file_set::{FileEntry, FileSet, SkippedFile};
pub use producer::{ChunkProducer, ProducerStats};
