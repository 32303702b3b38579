use crate::transport::Rank;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Chunker error: {0}")]
    Chunker(#[from] wordfreq_chunker::ChunkerError),

    #[error("Wire error: {0}")]
    Wire(#[from] wordfreq_protocol::WireError),

    #[error("Lexicon error: {0}")]
    Lexicon(#[from] wordfreq_lexicon::LexiconError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker task failed: {0}")]
    WorkerTask(String),
}

impl DispatchError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Dispatcher and workers disagree about the state of the conversation.
/// Always fatal for the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Worker {rank} did not reply within {timeout_ms} ms (chunk of file {file_index})")]
    Unresponsive {
        rank: Rank,
        file_index: u32,
        timeout_ms: u64,
    },

    #[error("Worker {rank} hung up with a chunk of file {file_index} outstanding")]
    Disconnected { rank: Rank, file_index: u32 },

    #[error("Worker {rank} sent a frame with no request outstanding")]
    UnexpectedReply { rank: Rank },

    #[error("Worker {rank} answered for file {actual}, chunk was from file {expected}")]
    FileIndexMismatch {
        rank: Rank,
        expected: u32,
        actual: u32,
    },

    #[error("Worker {rank} already has a request outstanding")]
    DuplicateRequest { rank: Rank },

    #[error("Result for unknown file {file_index}")]
    UnknownFile { file_index: u32 },

    #[error("No workers: at least 2 processes are required")]
    NoWorkers,
}

/// Failures of the message substrate itself
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Unknown peer rank {0}")]
    UnknownPeer(Rank),

    #[error("Peer {0} is no longer accepting frames")]
    Closed(Rank),

    #[error("Peer {0} hung up")]
    Disconnected(Rank),

    #[error("Inbox closed")]
    InboxClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn worker {rank}: {reason}")]
    Spawn { rank: Rank, reason: String },

    #[error("Worker {rank} exited with {status}")]
    WorkerExit { rank: Rank, status: String },

    #[error("Invalid worker environment: {0}")]
    Environment(String),
}
