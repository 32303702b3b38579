//! # Wordfreq Dispatcher
//!
//! Distributed word counting: one dispatcher (rank 0) and `W` workers
//! (ranks `1..=W`) that share nothing but framed messages.
//!
//! ## Flow
//!
//! ```text
//! FileSet ──> ChunkProducer ──> Dispatcher ══ frames ══> worker (LexicalCounter)
//!                                   ▲                          │
//!                                   └────── ChunkResult ═══════┘
//!                                   │
//!                                   └──> ResultAggregator ──> Vec<FileReport>
//! ```
//!
//! Each round the dispatcher offers one chunk to every active worker slot and
//! posts a receive carrying the slot's rank and a reply deadline. The round
//! ends when every posted receive has been answered; a missed deadline or a
//! hang-up is a [`ProtocolError`]. Slots that are offered no more work are
//! retired, and the run ends when all of them are.
//!
//! Workers run either as tasks of the current process ([`run_local`]) or as
//! child processes speaking length-prefixed frames over stdio ([`run_spawned`]).
//!
//! ## Example
//!
//! ```no_run
//! use wordfreq_chunker::FileSet;
//! use wordfreq_dispatcher::{run_local, DispatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> wordfreq_dispatcher::Result<()> {
//!     let (files, skipped) = FileSet::probe(["a.txt", "b.txt"]);
//!     let config = DispatchConfig::default().with_processes(4);
//!     let report = run_local(files, skipped, &config).await?;
//!
//!     for file in report.files {
//!         println!("{}: {} words", file.path.display(), file.word_count);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod config;
mod dispatcher;
mod error;
mod limits;
mod pending;
mod process;
mod runner;
mod state;
mod stats;
mod transport;
mod worker;

pub use aggregator::{FileAccumulator, FileReport, ResultAggregator};
pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, ProtocolError, Result, TransportError};
pub use limits::{
    processes_from_env, reply_timeout_from_env, MAX_PROCESSES, MIN_PROCESSES, PROCESSES_ENV,
    REPLY_TIMEOUT_ENV,
};
pub use pending::{PendingRequest, PendingRequests};
pub use process::{ChildWorld, PipeSink, WorkerCommand, RANK_ENV, WORLD_SIZE_ENV};
pub use runner::{run_local, run_spawned, serve_stdio_worker};
pub use state::{DispatcherState, SlotStatus, WorkerSlot};
pub use stats::{RunReport, RunStats};
pub use transport::{
    local_world, ChannelSink, Endpoint, Envelope, FrameSink, Message, Rank, DISPATCHER_RANK,
};
pub use worker::{run_worker, WorkerStats};
