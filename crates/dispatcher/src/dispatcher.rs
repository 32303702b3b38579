use crate::aggregator::FileReport;
use crate::error::{ProtocolError, Result};
use crate::state::DispatcherState;
use crate::stats::RunStats;
use crate::transport::{Endpoint, Message, Rank};
use std::time::{Duration, Instant};
use tokio::time::timeout_at;
use wordfreq_chunker::ChunkProducer;
use wordfreq_protocol::{encode_assignment, encode_work_flag, Chunk};

/// Rank 0: hands chunks to workers round by round and merges their replies.
///
/// Each round offers one chunk to every active slot, in slot order, then waits
/// for all replies posted in that round. A slot offered `Chunk::End` is told
/// there is no more work and retired. The run ends when every slot is retired.
#[derive(Debug)]
pub struct Dispatcher {
    endpoint: Endpoint,
    state: DispatcherState,
    chunk_size: usize,
    reply_timeout: Duration,
}

impl Dispatcher {
    pub fn new(endpoint: Endpoint, producer: ChunkProducer, reply_timeout: Duration) -> Result<Self> {
        let workers = endpoint.world_size().saturating_sub(1);
        if workers == 0 {
            return Err(ProtocolError::NoWorkers.into());
        }

        let chunk_size = producer.config().chunk_size;
        Ok(Self {
            endpoint,
            state: DispatcherState::new(producer, workers),
            chunk_size,
            reply_timeout,
        })
    }

    pub fn state(&self) -> &DispatcherState {
        &self.state
    }

    pub async fn run(mut self) -> Result<(Vec<FileReport>, RunStats)> {
        let started = Instant::now();
        log::info!(
            "Dispatching {} files ({} bytes) to {} workers, chunk size {}",
            self.state.producer.files().len(),
            self.state.producer.files().total_bytes(),
            self.state.slots.len(),
            self.chunk_size
        );

        while !self.state.all_retired() {
            self.run_round().await?;
        }

        let producer_stats = self.state.producer.stats();
        let mut stats = self.state.stats;
        stats.bytes_trimmed = producer_stats.trimmed_bytes;
        stats.time_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "All workers retired after {} rounds, {} chunks",
            stats.rounds,
            stats.chunks_dispatched
        );
        let files = self.state.aggregator.report(self.state.producer.files());
        Ok((files, stats))
    }

    async fn run_round(&mut self) -> Result<()> {
        self.state.stats.rounds += 1;
        for rank in self.state.active_ranks() {
            self.assign(rank).await?;
        }

        let posted = self.state.pending.len();
        self.wait_all().await?;
        log::debug!("Round {} done, {posted} replies merged", self.state.stats.rounds);
        Ok(())
    }

    async fn assign(&mut self, rank: Rank) -> Result<()> {
        match self.state.producer.next_chunk()? {
            Chunk::End => {
                self.endpoint.send(rank, encode_work_flag(false)).await?;
                self.state.retire(rank);
                log::debug!("Worker {rank} retired");
            }
            Chunk::Data(chunk) => {
                let frames = encode_assignment(&chunk, self.chunk_size)?;
                self.endpoint.send(rank, encode_work_flag(true)).await?;
                self.endpoint.send_all(rank, frames).await?;
                self.state.pending.post(rank, &chunk, self.reply_timeout)?;
                self.state.record_chunk(rank, chunk.len());
            }
        }
        Ok(())
    }

    /// Block until every request posted this round has been answered
    async fn wait_all(&mut self) -> Result<()> {
        while let Some(earliest) = self
            .state
            .pending
            .earliest()
            .map(|r| (r.deadline, r.rank, r.file_index))
        {
            let (deadline, rank, file_index) = earliest;
            let envelope = match timeout_at(deadline, self.endpoint.recv_any()).await {
                Ok(envelope) => envelope?,
                Err(_) => {
                    return Err(ProtocolError::Unresponsive {
                        rank,
                        file_index,
                        timeout_ms: self.reply_timeout.as_millis() as u64,
                    }
                    .into())
                }
            };

            match envelope.message {
                Message::Frame(frame) => {
                    if let Some(result) = self.state.pending.accept(envelope.source, frame)? {
                        log::debug!(
                            "Worker {} counted {} words ({} consonant-repeat) in file {}",
                            envelope.source,
                            result.word_count,
                            result.consonant_word_count,
                            result.file_index
                        );
                        self.state.aggregator.absorb(result)?;
                    }
                }
                Message::Hangup => {
                    if let Some(request) = self.state.pending.get(envelope.source) {
                        return Err(ProtocolError::Disconnected {
                            rank: envelope.source,
                            file_index: request.file_index,
                        }
                        .into());
                    }
                    log::debug!("Worker {} hung up", envelope.source);
                }
            }
        }
        Ok(())
    }
}
