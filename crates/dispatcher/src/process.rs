//! Workers as child processes.
//!
//! The dispatcher re-executes a worker command once per rank. Frames travel
//! length-prefixed over the child's stdin (dispatcher → worker) and stdout
//! (worker → dispatcher); stderr is inherited for logs.

use crate::error::TransportError;
use crate::transport::{Endpoint, Envelope, FrameSink, Message, Rank, DISPATCHER_RANK};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Mutex};
use wordfreq_protocol::framing::{read_frame, write_frame};

/// Rank of a worker child, set by the dispatcher
pub const RANK_ENV: &str = "WORDFREQ_RANK";

/// Total number of ranks, set by the dispatcher
pub const WORLD_SIZE_ENV: &str = "WORDFREQ_WORLD_SIZE";

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Sink writing length-prefixed frames to a pipe
pub struct PipeSink {
    peer: Rank,
    writer: Mutex<Option<BoxedWriter>>,
}

impl fmt::Debug for PipeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeSink").field("peer", &self.peer).finish()
    }
}

impl PipeSink {
    pub fn new<W>(peer: Rank, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            peer,
            writer: Mutex::new(Some(Box::new(writer))),
        }
    }
}

#[async_trait]
impl FrameSink for PipeSink {
    async fn send(&self, _source: Rank, frame: Bytes) -> Result<(), TransportError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::Closed(self.peer))?;
        write_frame(writer, &frame).await.map_err(|err| {
            log::debug!("Write to rank {} failed: {err}", self.peer);
            TransportError::Closed(self.peer)
        })
    }

    fn hang_up(&self, _source: Rank) {
        // Closing the pipe is the hang-up; the reader sees end of stream.
        if let Ok(mut guard) = self.writer.try_lock() {
            guard.take();
        }
    }
}

/// Pump frames from a pipe into an inbox, then report the hang-up
pub async fn forward_frames<R>(source: Rank, mut reader: R, inbox: mpsc::Sender<Envelope>)
where
    R: AsyncRead + Unpin,
{
    loop {
        let message = match read_frame(&mut reader).await {
            Ok(Some(frame)) => Message::Frame(frame),
            Ok(None) => Message::Hangup,
            Err(err) => {
                log::warn!("Stream from rank {source} failed: {err}");
                Message::Hangup
            }
        };
        let hangup = message == Message::Hangup;
        if inbox.send(Envelope { source, message }).await.is_err() || hangup {
            return;
        }
    }
}

/// How to start one worker process
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Running worker children; killed if dropped before [`ChildWorld::wait`]
#[derive(Debug)]
pub struct ChildWorld {
    children: Vec<(Rank, Child)>,
}

impl ChildWorld {
    /// Start `world_size - 1` workers and return the dispatcher endpoint wired to them
    pub fn spawn(
        command: &WorkerCommand,
        world_size: usize,
        capacity: usize,
    ) -> Result<(Endpoint, Self), TransportError> {
        let (inbox_tx, inbox_rx) = mpsc::channel(capacity.max(1));
        let mut peers: HashMap<Rank, Arc<dyn FrameSink>> = HashMap::new();
        let mut children = Vec::with_capacity(world_size.saturating_sub(1));

        for rank in 1..world_size {
            let mut child = Command::new(&command.program)
                .args(&command.args)
                .env(RANK_ENV, rank.to_string())
                .env(WORLD_SIZE_ENV, world_size.to_string())
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .spawn()
                .map_err(|err| TransportError::Spawn {
                    rank,
                    reason: err.to_string(),
                })?;

            let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
                return Err(TransportError::Spawn {
                    rank,
                    reason: "child pipes unavailable".to_string(),
                });
            };

            log::debug!("Spawned worker {rank} (pid {:?})", child.id());
            tokio::spawn(forward_frames(rank, stdout, inbox_tx.clone()));
            peers.insert(rank, Arc::new(PipeSink::new(rank, stdin)));
            children.push((rank, child));
        }

        let endpoint = Endpoint::new(DISPATCHER_RANK, world_size, peers, inbox_rx);
        Ok((endpoint, Self { children }))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Wait for every child; a non-zero exit is an error
    pub async fn wait(mut self) -> Result<(), TransportError> {
        let mut first_error = None;
        for (rank, child) in &mut self.children {
            let status = child.wait().await?;
            if !status.success() {
                log::warn!("Worker {rank} exited with {status}");
                first_error.get_or_insert(TransportError::WorkerExit {
                    rank: *rank,
                    status: status.to_string(),
                });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Endpoint of a worker child, talking to the dispatcher over stdin/stdout
pub fn stdio_endpoint() -> Result<Endpoint, TransportError> {
    let rank = env_rank(RANK_ENV)?;
    let world_size = env_rank(WORLD_SIZE_ENV)?;
    if rank == DISPATCHER_RANK || rank >= world_size {
        return Err(TransportError::Environment(format!(
            "rank {rank} outside 1..{world_size}"
        )));
    }

    let (inbox_tx, inbox_rx) = mpsc::channel(8);
    tokio::spawn(forward_frames(DISPATCHER_RANK, tokio::io::stdin(), inbox_tx));

    let mut peers: HashMap<Rank, Arc<dyn FrameSink>> = HashMap::new();
    peers.insert(
        DISPATCHER_RANK,
        Arc::new(PipeSink::new(DISPATCHER_RANK, tokio::io::stdout())),
    );
    Ok(Endpoint::new(rank, world_size, peers, inbox_rx))
}

fn env_rank(name: &str) -> Result<usize, TransportError> {
    let raw = std::env::var(name)
        .map_err(|_| TransportError::Environment(format!("{name} is not set")))?;
    raw.trim()
        .parse()
        .map_err(|_| TransportError::Environment(format!("{name}={raw:?} is not a rank")))
}
