//! Reads one length-delimited frame at a time from an async byte stream.
//!
//! # End of stream vs. truncation
//!
//! TCP signals a clean close by a `read` that returns zero bytes.  Where that
//! happens decides what it means:
//!
//! - before the first byte of a length prefix → the peer finished cleanly,
//!   [`read_frame`] returns `Ok(None)`;
//! - anywhere inside a prefix or body → the frame was cut off, the result is
//!   a [`FramingError`] and never a partial record.
//!
//! A zero-length frame (`0x00`) is a valid all-defaults `SensorState`, not an
//! end-of-stream marker.  Waiting for data is never an error.

use std::io;
use std::time::Duration;

use sensorlink_core::{
    check_frame_len, decode_body, decode_length_prefix, FramingError, SensorState, MAX_VARINT_LEN,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time;

use crate::infrastructure::network::error::ReceiveError;

/// Reads exactly one frame from `reader`.
///
/// Blocks until the first prefix byte arrives.  Once it has, `read_timeout`
/// (if set) bounds the time to receive the rest of the frame.
///
/// Wrap raw sockets in a `tokio::io::BufReader`: the prefix is read one byte
/// at a time.
///
/// # Errors
///
/// - [`ReceiveError::Framing`] for a truncated, oversized or malformed frame.
/// - [`ReceiveError::Io`] if the transport fails.
/// - [`ReceiveError::Timeout`] if a started frame stalls past `read_timeout`.
pub async fn read_frame<R>(
    reader: &mut R,
    max_len: usize,
    read_timeout: Option<Duration>,
) -> Result<Option<SensorState>, ReceiveError>
where
    R: AsyncRead + Unpin,
{
    let first = match read_byte(reader).await? {
        Some(byte) => byte,
        None => return Ok(None),
    };

    let rest = read_rest(reader, first, max_len);
    let state = match read_timeout {
        Some(limit) => time::timeout(limit, rest)
            .await
            .map_err(|_| ReceiveError::Timeout(limit))??,
        None => rest.await?,
    };
    Ok(Some(state))
}

async fn read_rest<R>(
    reader: &mut R,
    first: u8,
    max_len: usize,
) -> Result<SensorState, ReceiveError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = Vec::with_capacity(MAX_VARINT_LEN);
    prefix.push(first);
    let (len, _) = loop {
        if let Some(parsed) = decode_length_prefix(&prefix)? {
            break parsed;
        }
        match read_byte(reader).await? {
            Some(byte) => prefix.push(byte),
            None => {
                return Err(FramingError::TruncatedPrefix {
                    received: prefix.len(),
                }
                .into())
            }
        }
    };
    check_frame_len(len, max_len)?;

    let mut body = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut body[filled..]).await?;
        if n == 0 {
            return Err(FramingError::Truncated {
                declared: len,
                received: filled,
            }
            .into());
        }
        filled += n;
    }

    Ok(decode_body(&body)?)
}

/// Reads a single byte; `Ok(None)` on a clean close.
async fn read_byte<R>(reader: &mut R) -> io::Result<Option<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte).await {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sensorlink_core::{encode_frame, MAX_FRAME_LEN};
    use tokio::io::AsyncWriteExt;
    use tokio_test::io::Builder;

    fn sample() -> SensorState {
        SensorState::new(32.5, 1.0, 21.0, true, 75)
    }

    #[tokio::test]
    async fn test_reads_single_frame_then_end_of_stream() {
        // Arrange
        let bytes = encode_frame(&sample());
        let mut reader = Builder::new().read(&bytes).build();

        // Act
        let first = read_frame(&mut reader, MAX_FRAME_LEN, None).await.unwrap();
        let second = read_frame(&mut reader, MAX_FRAME_LEN, None).await.unwrap();

        // Assert
        assert_eq!(first, Some(sample()));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_empty_stream_is_end_of_stream() {
        let mut reader = Builder::new().build();

        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_frame_split_across_many_reads() {
        // Arrange – deliver the frame one byte per read.
        let bytes = encode_frame(&sample());
        let mut builder = Builder::new();
        for b in &bytes {
            builder.read(std::slice::from_ref(b));
        }
        let mut reader = builder.build();

        // Act
        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await.unwrap();

        // Assert
        assert_eq!(result, Some(sample()));
    }

    #[tokio::test]
    async fn test_zero_length_frame_is_a_default_record_not_eof() {
        let mut reader = Builder::new().read(&[0x00]).build();

        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await.unwrap();

        assert_eq!(result, Some(SensorState::default()));
    }

    #[tokio::test]
    async fn test_truncated_body_fails_without_partial_record() {
        // Arrange
        let bytes = encode_frame(&sample());
        let declared = bytes.len() - 1;
        let mut reader = Builder::new().read(&bytes[..bytes.len() - 4]).build();

        // Act
        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await;

        // Assert
        match result {
            Err(ReceiveError::Framing(FramingError::Truncated { declared: d, received })) => {
                assert_eq!(d, declared);
                assert_eq!(received, declared - 4);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_eof_inside_prefix_is_truncated_prefix() {
        let mut reader = Builder::new().read(&[0x80]).build();

        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await;

        assert!(matches!(
            result,
            Err(ReceiveError::Framing(FramingError::TruncatedPrefix { received: 1 }))
        ));
    }

    #[tokio::test]
    async fn test_oversized_prefix_is_rejected_before_reading_body() {
        // 300-byte body declared; limit 64; body bytes never requested.
        let mut reader = Builder::new().read(&[0xAC, 0x02]).build();

        let result = read_frame(&mut reader, 64, None).await;

        assert!(matches!(
            result,
            Err(ReceiveError::Framing(FramingError::FrameTooLarge { len: 300, max: 64 }))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_framing_error() {
        let mut reader = Builder::new().read(&[0x02, 0x0D, 0x00]).build();

        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await;

        assert!(matches!(result, Err(ReceiveError::Framing(FramingError::Malformed(_)))));
    }

    #[tokio::test]
    async fn test_transport_error_is_io() {
        let mut reader = Builder::new()
            .read_error(io::Error::from(io::ErrorKind::ConnectionReset))
            .build();

        let result = read_frame(&mut reader, MAX_FRAME_LEN, None).await;

        assert!(matches!(
            result,
            Err(ReceiveError::Io(e)) if e.kind() == io::ErrorKind::ConnectionReset
        ));
    }

    #[tokio::test]
    async fn test_stalled_frame_times_out() {
        // Arrange – send the prefix and half the body, then keep the stream open.
        let bytes = encode_frame(&sample());
        let (mut peer, mut reader) = tokio::io::duplex(64);
        peer.write_all(&bytes[..bytes.len() / 2]).await.unwrap();

        // Act
        let result = read_frame(&mut reader, MAX_FRAME_LEN, Some(Duration::from_millis(50))).await;

        // Assert
        assert!(matches!(result, Err(ReceiveError::Timeout(_))));
        drop(peer);
    }

    #[tokio::test]
    async fn test_idle_stream_is_not_bounded_by_read_timeout() {
        // Arrange – nothing arrives for longer than the read timeout.
        let (mut peer, mut reader) = tokio::io::duplex(64);
        let bytes = encode_frame(&sample());
        let writer = tokio::spawn(async move {
            time::sleep(Duration::from_millis(100)).await;
            peer.write_all(&bytes).await.unwrap();
            peer
        });

        // Act
        let result = read_frame(&mut reader, MAX_FRAME_LEN, Some(Duration::from_millis(20))).await;

        // Assert
        assert_eq!(result.unwrap(), Some(sample()));
        drop(writer.await.unwrap());
    }
}
