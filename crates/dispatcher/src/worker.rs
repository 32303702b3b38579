use crate::error::{DispatchError, Result};
use crate::transport::{Endpoint, DISPATCHER_RANK};
use serde::Serialize;
use wordfreq_lexicon::LexicalCounter;
use wordfreq_protocol::{decode_assignment, decode_work_flag, encode_reply};

/// What one worker did before it was retired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub chunks: u64,
    pub bytes: u64,
    pub words: u64,
}

/// Worker protocol: receive a work flag; on `true` receive the chunk header and
/// payload, count, reply; on `false` return.
pub async fn run_worker(mut endpoint: Endpoint, counter: LexicalCounter) -> Result<WorkerStats> {
    let rank = endpoint.rank();
    let mut stats = WorkerStats::default();

    loop {
        let flag = endpoint.recv_frame_from(DISPATCHER_RANK).await?;
        if !decode_work_flag(&flag)? {
            break;
        }

        let frames = [
            endpoint.recv_frame_from(DISPATCHER_RANK).await?,
            endpoint.recv_frame_from(DISPATCHER_RANK).await?,
            endpoint.recv_frame_from(DISPATCHER_RANK).await?,
            endpoint.recv_frame_from(DISPATCHER_RANK).await?,
        ];
        let chunk = decode_assignment(frames)?;
        let bytes = chunk.len() as u64;

        // Counting is CPU bound; keep it off the async executor.
        let result = tokio::task::spawn_blocking(move || counter.process(&chunk))
            .await
            .map_err(|err| DispatchError::WorkerTask(err.to_string()))??;

        endpoint
            .send_all(DISPATCHER_RANK, encode_reply(&result)?)
            .await?;

        stats.chunks += 1;
        stats.bytes += bytes;
        stats.words += result.word_count;
    }

    log::debug!(
        "Worker {rank} retired after {} chunks ({} bytes, {} words)",
        stats.chunks,
        stats.bytes,
        stats.words
    );
    Ok(stats)
}
