//! Network infrastructure for the client application.
//!
//! Owns the TCP session with the sensor server and moves [`SensorState`]
//! frames in both directions.
//!
//! Architecture:
//! - [`ConnectionManager`] owns the single active [`Connection`]: it connects
//!   (closing any previous session first), publishes the connection for
//!   senders, and tears it down on `disconnect`.
//! - Each [`Connection`] starts a [`ReceiveLoop`] task on its read half.  The
//!   loop reads one frame at a time with [`read_frame`] and hands each record
//!   to the [`SensorEventSink`] in wire order.
//! - Sends go through [`Connection::send`], which serializes writers with an
//!   async mutex so concurrent submits never interleave partial frames.
//!
//! ```text
//! UI ── submit ──> ConnectionManager::send ──> Connection::send ──> socket
//! socket ──> ReceiveLoop ──> read_frame ──> SensorEventSink::on_received ──> UI
//! ```
//!
//! [`SensorState`]: sensorlink_core::SensorState
//! [`SensorEventSink`]: crate::application::SensorEventSink

use std::time::Duration;

use sensorlink_core::MAX_FRAME_LEN;

pub mod connection;
pub mod error;
pub mod frame_reader;
pub mod manager;
pub mod receive_loop;

pub use connection::Connection;
pub use error::{ConnectionError, ReceiveError};
pub use frame_reader::read_frame;
pub use manager::ConnectionManager;
pub use receive_loop::{ReceiveLoop, ReceiveOutcome, ReceiveState};

/// Default server port.
pub const DEFAULT_PORT: u16 = 6666;

/// Configuration for the client's network connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Server host name or IP address.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// Upper bound on the TCP handshake.
    pub connect_timeout: Duration,
    /// Upper bound on writing and flushing one frame.
    pub write_timeout: Duration,
    /// Upper bound on completing a frame once its first byte has arrived.
    ///
    /// `None` waits indefinitely.  Idle time between frames is never bounded.
    pub read_timeout: Option<Duration>,
    /// Largest accepted inbound frame body in bytes.
    pub max_frame_len: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            read_timeout: None,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
