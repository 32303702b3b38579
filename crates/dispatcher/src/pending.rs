use crate::error::{ProtocolError, Result};
use crate::transport::Rank;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use wordfreq_protocol::{ChunkData, ChunkResult, ReplyAssembler};

/// A posted receive: the reply a worker owes for one chunk
#[derive(Debug)]
pub struct PendingRequest {
    pub rank: Rank,
    pub file_index: u32,
    pub start_offset: u64,
    pub end_offset: u64,
    pub deadline: Instant,
    reply: ReplyAssembler,
}

/// Outstanding requests, at most one per worker slot
#[derive(Debug, Default)]
pub struct PendingRequests {
    by_rank: BTreeMap<Rank, PendingRequest>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, rank: Rank, chunk: &ChunkData, timeout: Duration) -> Result<()> {
        if self.by_rank.contains_key(&rank) {
            return Err(ProtocolError::DuplicateRequest { rank }.into());
        }
        self.by_rank.insert(
            rank,
            PendingRequest {
                rank,
                file_index: chunk.file_index,
                start_offset: chunk.start_offset,
                end_offset: chunk.end_offset,
                deadline: Instant::now() + timeout,
                reply: ReplyAssembler::new(),
            },
        );
        Ok(())
    }

    /// Feed one reply frame from `rank`. Returns the result once the reply is
    /// complete, releasing the request.
    pub fn accept(&mut self, rank: Rank, frame: Bytes) -> Result<Option<ChunkResult>> {
        let request = self
            .by_rank
            .get_mut(&rank)
            .ok_or(ProtocolError::UnexpectedReply { rank })?;

        let Some(result) = request.reply.push(frame)? else {
            return Ok(None);
        };
        if result.file_index != request.file_index {
            return Err(ProtocolError::FileIndexMismatch {
                rank,
                expected: request.file_index,
                actual: result.file_index,
            }
            .into());
        }

        self.by_rank.remove(&rank);
        Ok(Some(result))
    }

    pub fn get(&self, rank: Rank) -> Option<&PendingRequest> {
        self.by_rank.get(&rank)
    }

    pub fn is_outstanding(&self, rank: Rank) -> bool {
        self.by_rank.contains_key(&rank)
    }

    /// Request whose deadline expires first
    pub fn earliest(&self) -> Option<&PendingRequest> {
        self.by_rank.values().min_by_key(|r| r.deadline)
    }

    pub fn len(&self) -> usize {
        self.by_rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_rank.is_empty()
    }
}
