//! Length-delimited frame codec for [`SensorState`].
//!
//! Wire format:
//! ```text
//! [len: varint, 1..=10 bytes][body: len bytes, protobuf-encoded SensorState]
//! ```
//! `len` is a protobuf base-128 varint (little-endian groups of 7 bits, high
//! bit set on every byte except the last).  This is byte-for-byte the layout
//! produced by protobuf's `writeDelimitedTo` and consumed by
//! `parseDelimitedFrom`.
//!
//! Encoding is deterministic: fields are written in tag order and proto3
//! default values are omitted, so equal records always produce identical
//! bytes.

use prost::Message;
use thiserror::Error;

use crate::protocol::messages::SensorState;

/// Largest byte count a varint length prefix can occupy.
pub const MAX_VARINT_LEN: usize = 10;

/// Default upper bound on a frame body.
///
/// A fully populated `SensorState` is under 32 bytes; anything near this
/// limit is a corrupted or hostile prefix.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FramingError {
    /// The buffer does not yet hold a complete frame.
    ///
    /// Only returned by the buffer API; more bytes may complete the frame.
    #[error("incomplete frame: need at least {needed} bytes, got {available}")]
    Incomplete { needed: usize, available: usize },

    /// The stream ended before the declared frame was complete.
    #[error("truncated frame: declared {declared} body bytes, received {received}")]
    Truncated { declared: usize, received: usize },

    /// The stream ended inside the length prefix.
    #[error("truncated length prefix after {received} byte(s)")]
    TruncatedPrefix { received: usize },

    /// The length prefix is longer than ten bytes or does not fit in `usize`.
    #[error("length prefix overflows")]
    LengthOverflow,

    /// The declared body length exceeds the configured limit.
    #[error("frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    /// The body is not a valid `SensorState` encoding.
    #[error("malformed frame body: {0}")]
    Malformed(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `state` into a length-delimited frame.
///
/// # Examples
///
/// ```rust
/// use sensorlink_core::{decode_frame, encode_frame, SensorState};
///
/// let state = SensorState::new(32.5, 1.0, 21.0, true, 75);
/// let bytes = encode_frame(&state);
/// let (decoded, consumed) = decode_frame(&bytes).unwrap();
/// assert_eq!(decoded, state);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_frame(state: &SensorState) -> Vec<u8> {
    state.encode_length_delimited_to_vec()
}

/// Decodes one frame from the beginning of `bytes` using [`MAX_FRAME_LEN`].
///
/// Returns the record and the number of bytes consumed (prefix + body) so the
/// caller can advance its read cursor.
///
/// # Errors
///
/// [`FramingError::Incomplete`] if `bytes` ends before the frame does; any
/// other variant means the data can never form a valid frame.
pub fn decode_frame(bytes: &[u8]) -> Result<(SensorState, usize), FramingError> {
    decode_frame_with_limit(bytes, MAX_FRAME_LEN)
}

/// Same as [`decode_frame`] with a caller-chosen body limit.
///
/// # Errors
///
/// See [`decode_frame`].
pub fn decode_frame_with_limit(
    bytes: &[u8],
    max_len: usize,
) -> Result<(SensorState, usize), FramingError> {
    let (len, prefix_len) = decode_length_prefix(bytes)?.ok_or(FramingError::Incomplete {
        needed: bytes.len() + 1,
        available: bytes.len(),
    })?;
    check_frame_len(len, max_len)?;

    let total = prefix_len + len;
    if bytes.len() < total {
        return Err(FramingError::Incomplete {
            needed: total,
            available: bytes.len(),
        });
    }

    let state = decode_body(&bytes[prefix_len..total])?;
    Ok((state, total))
}

/// Parses a varint length prefix from the beginning of `bytes`.
///
/// Returns `Ok(Some((body_len, prefix_len)))` when a complete prefix is
/// present and `Ok(None)` when more bytes are needed.
///
/// # Errors
///
/// [`FramingError::LengthOverflow`] when ten bytes are available without a
/// terminating byte, or the value does not fit in `usize`.
pub fn decode_length_prefix(bytes: &[u8]) -> Result<Option<(usize, usize)>, FramingError> {
    let window = &bytes[..bytes.len().min(MAX_VARINT_LEN)];
    match window.iter().position(|b| b & 0x80 == 0) {
        Some(last) => {
            let mut prefix = &window[..=last];
            let len = prost::encoding::decode_varint(&mut prefix)
                .map_err(|_| FramingError::LengthOverflow)?;
            let len = usize::try_from(len).map_err(|_| FramingError::LengthOverflow)?;
            Ok(Some((len, last + 1)))
        }
        None if window.len() == MAX_VARINT_LEN => Err(FramingError::LengthOverflow),
        None => Ok(None),
    }
}

/// Decodes a frame body (without its length prefix).
///
/// # Errors
///
/// [`FramingError::Malformed`] if `body` is not a valid protobuf encoding of
/// `SensorState`.
pub fn decode_body(body: &[u8]) -> Result<SensorState, FramingError> {
    SensorState::decode(body).map_err(|e| FramingError::Malformed(e.to_string()))
}

/// Rejects body lengths above `max_len`.
///
/// # Errors
///
/// [`FramingError::FrameTooLarge`].
pub fn check_frame_len(len: usize, max_len: usize) -> Result<(), FramingError> {
    if len > max_len {
        return Err(FramingError::FrameTooLarge { len, max: max_len });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
