use crate::boundary;
use crate::config::ChunkerConfig;
use crate::cursor::FileCursor;
use crate::error::{ChunkerError, Result};
use crate::file_set::FileSet;
use bytes::Bytes;
use serde::Serialize;
use std::io::{self, Read, Seek, SeekFrom};
use wordfreq_lexicon::WordClassifier;
use wordfreq_protocol::{Chunk, ChunkData};

/// Counters kept by the producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProducerStats {
    pub chunks: u64,

    /// Bytes handed out in chunks
    pub bytes: u64,

    /// Bytes read and then given back to re-align a chunk
    pub trimmed_bytes: u64,

    pub files_completed: u64,
}

/// Turns the file set into boundary-aligned chunks, one at a time
#[derive(Debug)]
pub struct ChunkProducer {
    files: FileSet,
    cursor: FileCursor,
    config: ChunkerConfig,
    classifier: WordClassifier,
    buf: Vec<u8>,
    stats: ProducerStats,
}

impl ChunkProducer {
    pub fn new(files: FileSet, config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        if files.is_empty() {
            return Err(ChunkerError::NoInputFiles);
        }
        // The wire carries the file index as a signed 32-bit integer.
        if files.len() > i32::MAX as usize {
            return Err(ChunkerError::TooManyFiles(files.len()));
        }

        log::debug!(
            "Chunking {} files ({} bytes) with chunk size {}",
            files.len(),
            files.total_bytes(),
            config.chunk_size
        );

        Ok(Self {
            files,
            cursor: FileCursor::new(),
            config,
            classifier: WordClassifier::new(),
            buf: Vec::with_capacity(config.chunk_size),
            stats: ProducerStats::default(),
        })
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    pub fn cursor(&self) -> &FileCursor {
        &self.cursor
    }

    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted(&self.files)
    }

    /// Next chunk, or `Chunk::End` once every file has been consumed.
    ///
    /// A chunk never ends inside a codepoint or a word, except the last chunk
    /// of a file, which ends where the file does. Bytes read past the cut are
    /// given back to the file so the next chunk starts at the cut.
    pub fn next_chunk(&mut self) -> Result<Chunk> {
        loop {
            let index = self.cursor.active();
            let Some(entry) = self.files.get(index) else {
                return Ok(Chunk::End);
            };

            let start = self.cursor.offset();
            let remaining = entry.len.saturating_sub(start);
            if remaining == 0 {
                self.finish_file();
                continue;
            }

            // Bounded by chunk_size, so it fits in usize.
            let want = remaining.min(self.config.chunk_size as u64) as usize;
            let reaches_eof = want as u64 == remaining;

            self.buf.clear();
            self.buf.resize(want, 0);
            let file = self.cursor.handle(&entry.path)?;
            match file.read_exact(&mut self.buf) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(ChunkerError::FileChanged {
                        path: entry.path.clone(),
                        expected: entry.len,
                        offset: start,
                    });
                }
                Err(err) => return Err(err.into()),
            }

            let keep = if reaches_eof {
                want
            } else {
                boundary::align(&self.buf, &self.classifier).ok_or(
                    ChunkerError::UnsplittableWord {
                        file_index: index as u32,
                        offset: start,
                        chunk_size: self.config.chunk_size,
                    },
                )?
            };

            let trimmed = want - keep;
            if trimmed > 0 {
                file.seek(SeekFrom::Current(-(trimmed as i64)))?;
                self.stats.trimmed_bytes += trimmed as u64;
            }

            let chunk = ChunkData::new(
                index as u32,
                start,
                Bytes::copy_from_slice(&self.buf[..keep]),
            );
            log::debug!(
                "Chunk file={} [{}..{}) trimmed={}",
                chunk.file_index,
                chunk.start_offset,
                chunk.end_offset,
                trimmed
            );

            self.cursor.advance(keep as u64);
            self.stats.chunks += 1;
            self.stats.bytes += keep as u64;
            if reaches_eof {
                self.finish_file();
            }

            return Ok(Chunk::Data(chunk));
        }
    }

    fn finish_file(&mut self) {
        if let Some(entry) = self.files.get(self.cursor.active()) {
            log::debug!("Finished {}", entry.path.display());
        }
        self.cursor.next_file();
        self.stats.files_completed += 1;
    }
}
