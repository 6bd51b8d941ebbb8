//! Consumer-side collaborator: where inbound records and errors go.
//!
//! The network layer never holds UI state.  It calls a [`SensorEventSink`]
//! once per decoded inbound frame and once per failure, and the UI decides
//! what to display.
//!
//! # Threading contract
//!
//! Sink methods are called from background tasks (the receive loop, connect
//! and send tasks), never from the UI thread.  They must return quickly and
//! must not block: the receive loop delivers the next record only after
//! `on_received` returns.  A UI that needs its updates on its own thread
//! should use [`ChannelSink`], which forwards every event over an `mpsc`
//! channel for the UI loop to drain.

use std::fmt;

use sensorlink_core::SensorState;
use tokio::sync::mpsc;
use tracing::warn;

/// Category of a failure reported through [`SensorEventSink::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connecting to the server failed (unreachable, refused, timed out).
    Connection,
    /// An inbound frame was truncated or malformed; the connection is unusable.
    Framing,
    /// Writing an outbound frame failed.
    Send,
    /// The transport failed while reading.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Framing => "framing",
            ErrorKind::Send => "send",
            ErrorKind::Io => "i/o",
        };
        f.write_str(name)
    }
}

/// Receives inbound records and error reports from the exchange core.
#[cfg_attr(test, mockall::automock)]
pub trait SensorEventSink: Send + Sync {
    /// Called once per successfully decoded inbound frame, in wire order.
    fn on_received(&self, state: SensorState);

    /// Called on connection, framing, send and transport failures.
    fn on_error(&self, kind: ErrorKind, message: &str);
}

/// An event forwarded by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// A record arrived from the server.
    Received(SensorState),
    /// A failure was reported.
    Error { kind: ErrorKind, message: String },
}

/// Sink that marshals every event onto an unbounded `mpsc` channel.
///
/// Unbounded so that `on_received` never blocks the receive loop; the
/// consumer is expected to drain the channel continuously.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SensorEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the UI loop drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SensorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: SensorEvent) {
        if self.tx.send(event).is_err() {
            warn!("sensor event dropped: receiver closed");
        }
    }
}

impl SensorEventSink for ChannelSink {
    fn on_received(&self, state: SensorState) {
        self.forward(SensorEvent::Received(state));
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        self.forward(SensorEvent::Error {
            kind,
            message: message.to_string(),
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_received_state() {
        // Arrange
        let (sink, mut rx) = ChannelSink::new();
        let state = SensorState::new(32.5, 1.0, 21.0, true, 75);

        // Act
        sink.on_received(state);

        // Assert
        assert_eq!(rx.try_recv().unwrap(), SensorEvent::Received(state));
    }

    #[test]
    fn test_channel_sink_forwards_error_with_kind_and_message() {
        let (sink, mut rx) = ChannelSink::new();

        sink.on_error(ErrorKind::Framing, "truncated frame");

        assert_eq!(
            rx.try_recv().unwrap(),
            SensorEvent::Error {
                kind: ErrorKind::Framing,
                message: "truncated frame".to_string()
            }
        );
    }

    #[test]
    fn test_channel_sink_preserves_order() {
        let (sink, mut rx) = ChannelSink::new();
        for fuel in [1, 2, 3] {
            sink.on_received(SensorState::default().with_fuel_level(fuel));
        }

        let order: Vec<i32> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| match e {
                SensorEvent::Received(s) => s.fuel_level(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_channel_sink_does_not_panic_after_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);

        sink.on_received(SensorState::default());
        sink.on_error(ErrorKind::Io, "gone");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Connection.to_string(), "connection");
        assert_eq!(ErrorKind::Io.to_string(), "i/o");
    }
}
