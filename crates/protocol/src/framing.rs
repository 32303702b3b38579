//! Length-prefixed frames over byte streams.
//!
//! Each frame is a big-endian `u32` length followed by that many bytes. Used
//! for the pipes between the dispatcher and worker child processes.

use bytes::{Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted on a stream (a 64 MiB payload plus slack)
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024 + 1024;

pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if frame.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame of {} bytes exceeds {MAX_FRAME_LEN}", frame.len()),
        ));
    }
    // MAX_FRAME_LEN fits in u32.
    writer.write_u32(frame.len() as u32).await?;
    writer.write_all(frame).await?;
    writer.flush().await
}

/// Read one frame. `Ok(None)` means the peer closed the stream between frames.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Bytes>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    };
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("announced frame of {len} bytes exceeds {MAX_FRAME_LEN}"),
        ));
    }

    let mut buf = BytesMut::zeroed(len);
    reader.read_exact(&mut buf).await?;
    Ok(Some(buf.freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_survive_a_duplex_stream() {
        let (mut client, mut server) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            write_frame(&mut client, b"\x01").await.unwrap();
            write_frame(&mut client, b"").await.unwrap();
            write_frame(&mut client, &[7u8; 100]).await.unwrap();
        });

        assert_eq!(read_frame(&mut server).await.unwrap().as_deref(), Some(&b"\x01"[..]));
        assert_eq!(read_frame(&mut server).await.unwrap().as_deref(), Some(&b""[..]));
        let big = read_frame(&mut server).await.unwrap().unwrap();
        assert_eq!(big.len(), 100);
        assert!(big.iter().all(|&b| b == 7));

        writer.await.unwrap();
        assert_eq!(read_frame(&mut server).await.unwrap(), None);
    }

    #[tokio::test]
    async fn oversized_announcement_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(16);
        client.write_u32(u32::MAX).await.unwrap();

        let err = read_frame(&mut server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
