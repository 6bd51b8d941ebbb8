//! Error types of the client network layer.
//!
//! [`SendError`](crate::application::SendError) lives in the application
//! layer next to the `StateSender` trait that returns it.

use std::time::Duration;

use sensorlink_core::FramingError;
use thiserror::Error;

use crate::application::ErrorKind;

/// Errors that can occur while establishing a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The TCP connection could not be established (unreachable, refused, DNS).
    #[error("failed to connect to {target}: {source}")]
    ConnectFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },
    /// The handshake did not complete within the connect timeout.
    #[error("connecting to {target} timed out after {after:?}")]
    TimedOut { target: String, after: Duration },
    /// A `disconnect` or a newer `connect` superseded this attempt while its
    /// handshake was in flight.
    #[error("connection to {target} abandoned by a later connect or disconnect")]
    Aborted { target: String },
}

/// Errors that terminate a receive loop.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The stream carried a truncated or malformed frame.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),
    /// The transport failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    /// A frame was started but not completed within the read timeout.
    #[error("frame not completed within {0:?}")]
    Timeout(Duration),
}

impl ReceiveError {
    /// The category reported to the event sink.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReceiveError::Framing(_) => ErrorKind::Framing,
            ReceiveError::Io(_) | ReceiveError::Timeout(_) => ErrorKind::Io,
        }
    }
}
