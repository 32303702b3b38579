//! Point-to-point frame transport between ranks.
//!
//! Every rank owns one [`Endpoint`]: a set of sinks (one per peer it may send
//! to) and a single inbox fed by all of those peers. Ranks share nothing but
//! the frames themselves. Rank 0 is the dispatcher; workers only talk to it.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

pub type Rank = usize;

pub const DISPATCHER_RANK: Rank = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Frame(Bytes),

    /// The sender is gone; nothing else will arrive from it
    Hangup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub source: Rank,
    pub message: Message,
}

/// Delivery of frames to one peer's inbox
#[async_trait]
pub trait FrameSink: Send + Sync + fmt::Debug {
    async fn send(&self, source: Rank, frame: Bytes) -> Result<(), TransportError>;

    /// Tell the peer `source` will not send again. Best effort; may run in `Drop`.
    fn hang_up(&self, source: Rank);
}

/// Sink backed by an in-process channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    peer: Rank,
    tx: mpsc::Sender<Envelope>,
}

impl ChannelSink {
    pub fn new(peer: Rank, tx: mpsc::Sender<Envelope>) -> Self {
        Self { peer, tx }
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send(&self, source: Rank, frame: Bytes) -> Result<(), TransportError> {
        self.tx
            .send(Envelope {
                source,
                message: Message::Frame(frame),
            })
            .await
            .map_err(|_| TransportError::Closed(self.peer))
    }

    fn hang_up(&self, source: Rank) {
        let envelope = Envelope {
            source,
            message: Message::Hangup,
        };
        match self.tx.try_send(envelope) {
            Ok(()) | Err(mpsc::error::TrySendError::Closed(_)) => {}
            Err(mpsc::error::TrySendError::Full(envelope)) => {
                // Inbox is full: deliver once it drains, if a runtime is still around.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let tx = self.tx.clone();
                    handle.spawn(async move {
                        let _ = tx.send(envelope).await;
                    });
                }
            }
        }
    }
}

/// One rank's view of the world
pub struct Endpoint {
    rank: Rank,
    world_size: usize,
    peers: HashMap<Rank, Arc<dyn FrameSink>>,
    inbox: mpsc::Receiver<Envelope>,
    /// Envelopes pulled from the inbox while waiting for a different source
    stash: VecDeque<Envelope>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut peers: Vec<_> = self.peers.keys().copied().collect();
        peers.sort_unstable();
        f.debug_struct("Endpoint")
            .field("rank", &self.rank)
            .field("world_size", &self.world_size)
            .field("peers", &peers)
            .field("stashed", &self.stash.len())
            .finish()
    }
}

impl Endpoint {
    pub fn new(
        rank: Rank,
        world_size: usize,
        peers: HashMap<Rank, Arc<dyn FrameSink>>,
        inbox: mpsc::Receiver<Envelope>,
    ) -> Self {
        Self {
            rank,
            world_size,
            peers,
            inbox,
            stash: VecDeque::new(),
        }
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks, dispatcher included
    pub fn world_size(&self) -> usize {
        self.world_size
    }

    pub async fn send(&self, dest: Rank, frame: Bytes) -> Result<(), TransportError> {
        let sink = self
            .peers
            .get(&dest)
            .ok_or(TransportError::UnknownPeer(dest))?;
        sink.send(self.rank, frame).await
    }

    /// Send frames in order
    pub async fn send_all<I>(&self, dest: Rank, frames: I) -> Result<(), TransportError>
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send,
    {
        for frame in frames {
            self.send(dest, frame).await?;
        }
        Ok(())
    }

    /// Next envelope from any source, stashed ones first
    pub async fn recv_any(&mut self) -> Result<Envelope, TransportError> {
        if let Some(envelope) = self.stash.pop_front() {
            return Ok(envelope);
        }
        self.inbox.recv().await.ok_or(TransportError::InboxClosed)
    }

    /// Next message from `source`; messages from other ranks are kept for later
    pub async fn recv_from(&mut self, source: Rank) -> Result<Message, TransportError> {
        if let Some(pos) = self.stash.iter().position(|e| e.source == source) {
            if let Some(envelope) = self.stash.remove(pos) {
                return Ok(envelope.message);
            }
        }

        loop {
            let envelope = self
                .inbox
                .recv()
                .await
                .ok_or(TransportError::Disconnected(source))?;
            if envelope.source == source {
                return Ok(envelope.message);
            }
            self.stash.push_back(envelope);
        }
    }

    /// Next frame from `source`; a hang-up is an error
    pub async fn recv_frame_from(&mut self, source: Rank) -> Result<Bytes, TransportError> {
        match self.recv_from(source).await? {
            Message::Frame(frame) => Ok(frame),
            Message::Hangup => Err(TransportError::Disconnected(source)),
        }
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        for sink in self.peers.values() {
            sink.hang_up(self.rank);
        }
    }
}

/// In-process star: rank 0 can reach every worker, every worker can reach rank 0
pub fn local_world(world_size: usize, capacity: usize) -> (Endpoint, Vec<Endpoint>) {
    let capacity = capacity.max(1);
    let (dispatcher_tx, dispatcher_rx) = mpsc::channel(capacity);

    let mut dispatcher_peers: HashMap<Rank, Arc<dyn FrameSink>> = HashMap::new();
    let mut workers = Vec::with_capacity(world_size.saturating_sub(1));

    for rank in 1..world_size {
        let (tx, rx) = mpsc::channel(capacity);
        dispatcher_peers.insert(rank, Arc::new(ChannelSink::new(rank, tx)));

        let mut peers: HashMap<Rank, Arc<dyn FrameSink>> = HashMap::new();
        peers.insert(
            DISPATCHER_RANK,
            Arc::new(ChannelSink::new(DISPATCHER_RANK, dispatcher_tx.clone())),
        );
        workers.push(Endpoint::new(rank, world_size, peers, rx));
    }

    let dispatcher = Endpoint::new(DISPATCHER_RANK, world_size, dispatcher_peers, dispatcher_rx);
    (dispatcher, workers)
}
