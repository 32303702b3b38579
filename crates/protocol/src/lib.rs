//! # Wordfreq Protocol
//!
//! Vocabulary shared by the dispatcher and its workers: the [`Chunk`] produced
//! from input files, the [`ChunkResult`] a worker sends back, and the byte-level
//! encoding of both.
//!
//! ## Message order
//!
//! ```text
//! dispatcher ──> worker   (one round)
//!     1. work flag        1 byte   (0 = retire, 1 = chunk follows)
//!     2. file index       i32 BE
//!     3. start offset     i64 BE
//!     4. end offset       i64 BE
//!     5. payload          exactly chunk_size bytes, zero padded
//!
//! worker ──> dispatcher
//!     1. file index       i32 BE
//!     2. word count       i64 BE
//!     3. consonant words  i64 BE
//! ```
//!
//! Every numbered item is one frame. Over in-process channels a frame is a
//! [`bytes::Bytes`] value; over byte streams (child process pipes) frames are
//! length prefixed by [`framing`].

mod chunk;
pub mod framing;
mod wire;

pub use chunk::{Chunk, ChunkData, ChunkResult};
pub use wire::{
    decode_assignment, decode_reply, decode_work_flag, encode_assignment, encode_reply,
    encode_work_flag, ReplyAssembler, Result, WireError, ASSIGNMENT_FRAMES, REPLY_FRAMES,
};
