use crate::chunk::{ChunkData, ChunkResult};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Result type for wire encoding and decoding
pub type Result<T> = std::result::Result<T, WireError>;

/// Frames following a `true` work flag
pub const ASSIGNMENT_FRAMES: usize = 4;

/// Frames of a worker reply
pub const REPLY_FRAMES: usize = 3;

/// Errors raised while encoding or decoding frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A fixed-width field arrived with the wrong number of bytes
    #[error("Frame '{field}' has {actual} bytes, expected {expected}")]
    FrameLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Work flag byte other than 0 or 1
    #[error("Invalid work flag byte: {0:#04x}")]
    InvalidFlag(u8),

    /// A numeric field does not fit the wire representation
    #[error("Field '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: i128 },

    /// Chunk data larger than the negotiated chunk size
    #[error("Chunk of {len} bytes exceeds chunk size {chunk_size}")]
    PayloadTooLarge { len: usize, chunk_size: usize },

    /// Header and payload disagree
    #[error("Corrupt chunk for file {file_index}: {reason}")]
    CorruptChunk { file_index: u32, reason: String },

    /// More reply frames than a reply holds
    #[error("Reply already complete, unexpected extra frame")]
    ReplyOverflow,
}

impl WireError {
    fn corrupt(file_index: u32, reason: impl Into<String>) -> Self {
        Self::CorruptChunk {
            file_index,
            reason: reason.into(),
        }
    }
}

pub fn encode_work_flag(work: bool) -> Bytes {
    Bytes::from_static(if work { b"\x01" } else { b"\x00" })
}

pub fn decode_work_flag(frame: &[u8]) -> Result<bool> {
    expect_len(frame, 1, "work_flag")?;
    match frame[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(WireError::InvalidFlag(other)),
    }
}

/// Encode a chunk as the four frames following the work flag.
///
/// The payload frame is always `chunk_size` bytes; bytes past the chunk data are zero.
pub fn encode_assignment(
    chunk: &ChunkData,
    chunk_size: usize,
) -> Result<[Bytes; ASSIGNMENT_FRAMES]> {
    if chunk.len() > chunk_size {
        return Err(WireError::PayloadTooLarge {
            len: chunk.len(),
            chunk_size,
        });
    }

    let file_index = to_i32(chunk.file_index, "file_index")?;
    let start = to_i64(chunk.start_offset, "start_offset")?;
    let end = to_i64(chunk.end_offset, "end_offset")?;

    let mut payload = BytesMut::zeroed(chunk_size);
    payload[..chunk.len()].copy_from_slice(&chunk.bytes);

    Ok([
        encode_i32(file_index),
        encode_i64(start),
        encode_i64(end),
        payload.freeze(),
    ])
}

/// Decode the four frames following a `true` work flag into chunk data.
///
/// The payload is sliced down to `end - start` bytes after checking that the
/// header fits inside it and that the padding is zero.
pub fn decode_assignment(frames: [Bytes; ASSIGNMENT_FRAMES]) -> Result<ChunkData> {
    let [index_frame, start_frame, end_frame, payload] = frames;

    let raw_index = decode_i32(&index_frame, "file_index")?;
    let file_index = u32::try_from(raw_index).map_err(|_| WireError::OutOfRange {
        field: "file_index",
        value: i128::from(raw_index),
    })?;
    let start = decode_i64(&start_frame, "start_offset")?;
    let end = decode_i64(&end_frame, "end_offset")?;

    if start < 0 {
        return Err(WireError::corrupt(
            file_index,
            format!("negative start offset {start}"),
        ));
    }
    if end < start {
        return Err(WireError::corrupt(
            file_index,
            format!("end offset {end} precedes start offset {start}"),
        ));
    }

    let data_len = usize::try_from(end - start).map_err(|_| WireError::OutOfRange {
        field: "chunk_length",
        value: i128::from(end - start),
    })?;
    if data_len > payload.len() {
        return Err(WireError::corrupt(
            file_index,
            format!("{data_len} data bytes declared, payload holds {}", payload.len()),
        ));
    }
    if payload[data_len..].iter().any(|&b| b != 0) {
        return Err(WireError::corrupt(
            file_index,
            "non-zero padding after chunk data",
        ));
    }

    Ok(ChunkData {
        file_index,
        start_offset: start as u64,
        end_offset: end as u64,
        bytes: payload.slice(..data_len),
    })
}

pub fn encode_reply(result: &ChunkResult) -> Result<[Bytes; REPLY_FRAMES]> {
    Ok([
        encode_i32(to_i32(result.file_index, "file_index")?),
        encode_i64(to_i64(result.word_count, "word_count")?),
        encode_i64(to_i64(result.consonant_word_count, "consonant_word_count")?),
    ])
}

pub fn decode_reply(frames: &[Bytes; REPLY_FRAMES]) -> Result<ChunkResult> {
    let raw_index = decode_i32(&frames[0], "file_index")?;
    let words = decode_i64(&frames[1], "word_count")?;
    let consonant_words = decode_i64(&frames[2], "consonant_word_count")?;

    Ok(ChunkResult {
        file_index: from_signed(raw_index.into(), "file_index")?,
        word_count: from_signed(words, "word_count")?,
        consonant_word_count: from_signed(consonant_words, "consonant_word_count")?,
    })
}

/// Collects reply frames as they arrive, one reply per outstanding request
#[derive(Debug, Default, Clone)]
pub struct ReplyAssembler {
    frames: Vec<Bytes>,
}

impl ReplyAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames received so far
    pub fn received(&self) -> usize {
        self.frames.len()
    }

    /// Push the next frame; returns the decoded result once the last frame arrives.
    pub fn push(&mut self, frame: Bytes) -> Result<Option<ChunkResult>> {
        if self.frames.len() >= REPLY_FRAMES {
            return Err(WireError::ReplyOverflow);
        }
        self.frames.push(frame);
        if self.frames.len() < REPLY_FRAMES {
            return Ok(None);
        }

        let frames: [Bytes; REPLY_FRAMES] = [
            self.frames[0].clone(),
            self.frames[1].clone(),
            self.frames[2].clone(),
        ];
        decode_reply(&frames).map(Some)
    }
}

fn expect_len(frame: &[u8], expected: usize, field: &'static str) -> Result<()> {
    if frame.len() != expected {
        return Err(WireError::FrameLength {
            field,
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

fn encode_i32(value: i32) -> Bytes {
    let mut buf = BytesMut::with_capacity(4);
    buf.put_i32(value);
    buf.freeze()
}

fn encode_i64(value: i64) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_i64(value);
    buf.freeze()
}

fn decode_i32(frame: &[u8], field: &'static str) -> Result<i32> {
    expect_len(frame, 4, field)?;
    let mut raw = frame;
    Ok(raw.get_i32())
}

fn decode_i64(frame: &[u8], field: &'static str) -> Result<i64> {
    expect_len(frame, 8, field)?;
    let mut raw = frame;
    Ok(raw.get_i64())
}

fn to_i32(value: u32, field: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| WireError::OutOfRange {
        field,
        value: i128::from(value),
    })
}

fn to_i64(value: u64, field: &'static str) -> Result<i64> {
    i64::try_from(value).map_err(|_| WireError::OutOfRange {
        field,
        value: i128::from(value),
    })
}

fn from_signed<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T> {
    T::try_from(value).map_err(|_| WireError::OutOfRange {
        field,
        value: i128::from(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn work_flag_accepts_only_zero_and_one() {
        assert_eq!(decode_work_flag(&encode_work_flag(true)), Ok(true));
        assert_eq!(decode_work_flag(&encode_work_flag(false)), Ok(false));
        assert_eq!(decode_work_flag(&[7]), Err(WireError::InvalidFlag(7)));
        assert!(matches!(
            decode_work_flag(&[]),
            Err(WireError::FrameLength { expected: 1, .. })
        ));
    }

    #[test]
    fn assignment_payload_is_padded_to_chunk_size() {
        let chunk = ChunkData::new(1, 4096, &b"llama gato "[..]);
        let frames = encode_assignment(&chunk, 32).unwrap();

        assert_eq!(&frames[0][..], &[0, 0, 0, 1]);
        assert_eq!(frames[3].len(), 32);
        assert_eq!(&frames[3][..11], b"llama gato ");
        assert!(frames[3][11..].iter().all(|&b| b == 0));

        let decoded = decode_assignment(frames).unwrap();
        assert_eq!(decoded, chunk);
    }

    #[test]
    fn assignment_rejects_oversized_chunk() {
        let chunk = ChunkData::new(0, 0, &b"abcdef"[..]);
        assert_eq!(
            encode_assignment(&chunk, 4),
            Err(WireError::PayloadTooLarge {
                len: 6,
                chunk_size: 4
            })
        );
    }

    #[test]
    fn decode_rejects_header_beyond_payload() {
        let chunk = ChunkData::new(0, 10, &b"ab "[..]);
        let [index, start, _, payload] = encode_assignment(&chunk, 8).unwrap();
        let bogus_end = encode_i64(100);

        let err = decode_assignment([index, start, bogus_end, payload]).unwrap_err();
        assert!(matches!(err, WireError::CorruptChunk { file_index: 0, .. }));
    }

    #[test]
    fn decode_rejects_reversed_offsets() {
        let frames = [
            encode_i32(0),
            encode_i64(50),
            encode_i64(40),
            Bytes::from_static(&[0; 8]),
        ];
        assert!(matches!(
            decode_assignment(frames),
            Err(WireError::CorruptChunk { .. })
        ));
    }

    #[test]
    fn decode_rejects_garbage_padding() {
        let frames = [
            encode_i32(3),
            encode_i64(0),
            encode_i64(2),
            Bytes::from_static(b"ab\0x"),
        ];
        assert!(matches!(
            decode_assignment(frames),
            Err(WireError::CorruptChunk { file_index: 3, .. })
        ));
    }

    #[test]
    fn reply_assembler_completes_on_third_frame() {
        let result = ChunkResult::new(4, 120, 17);
        let frames = encode_reply(&result).unwrap();

        let mut assembler = ReplyAssembler::new();
        assert_eq!(assembler.push(frames[0].clone()), Ok(None));
        assert_eq!(assembler.push(frames[1].clone()), Ok(None));
        assert_eq!(assembler.received(), 2);
        assert_eq!(assembler.push(frames[2].clone()), Ok(Some(result)));
        assert_eq!(
            assembler.push(frames[2].clone()),
            Err(WireError::ReplyOverflow)
        );
    }

    #[test]
    fn reply_rejects_negative_counts() {
        let frames = [encode_i32(0), encode_i64(-1), encode_i64(0)];
        assert!(matches!(
            decode_reply(&frames),
            Err(WireError::OutOfRange {
                field: "word_count",
                ..
            })
        ));
    }
}
