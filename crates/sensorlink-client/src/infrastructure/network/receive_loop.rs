//! The background task that reads inbound frames and dispatches them.
//!
//! # State machine
//!
//! ```text
//!            ┌───────────── frame decoded ─────────────┐
//!            ▼                                         │
//! Running ─> Idle ── frame decoded ──> Delivering ─────┘
//!            │
//!            ├── EndOfStream  ─┐
//!            ├── cancelled    ─┼──> Stopped(outcome)
//!            └── error        ─┘
//! ```
//!
//! The current state is published on a `watch` channel so the owning
//! [`Connection`](super::Connection) can report it and wait for the end.
//!
//! # Guarantees
//!
//! - Records reach the sink in exactly the order they were read, one at a
//!   time: the next read starts only after `on_received` returns.
//! - Cancellation is checked before every read and races every read, so no
//!   record is delivered after the token fires.
//! - A framing or transport error is reported once through `on_error` and
//!   ends the loop.  The loop never tries to resynchronize a corrupted stream.
//! - A clean end of stream and a cancellation end the loop without calling
//!   `on_error`.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::{ErrorKind, SensorEventSink};
use crate::infrastructure::network::frame_reader::read_frame;

/// Observable state of a receive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    /// Started, not yet waiting on the stream.
    Running,
    /// Waiting for the next frame.
    Idle,
    /// Handing a decoded record to the sink.
    Delivering,
    /// Finished; no further records will be delivered.
    Stopped(ReceiveOutcome),
}

impl ReceiveState {
    /// The outcome, once the loop has stopped.
    pub fn outcome(&self) -> Option<ReceiveOutcome> {
        match self {
            ReceiveState::Stopped(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// Why a receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The peer closed the stream at a frame boundary.
    EndOfStream,
    /// The cancellation token fired.
    Cancelled,
    /// A framing, transport or timeout error was reported to the sink.
    Failed(ErrorKind),
}

/// Reads frames from `reader` until the stream ends, fails or is cancelled.
pub struct ReceiveLoop<R> {
    reader: R,
    sink: Arc<dyn SensorEventSink>,
    cancel: CancellationToken,
    state_tx: watch::Sender<ReceiveState>,
    max_frame_len: usize,
    read_timeout: Option<Duration>,
    session: Uuid,
}

impl<R> ReceiveLoop<R>
where
    R: AsyncRead + Unpin,
{
    /// Creates a loop and the receiver its state is published on.
    pub fn new(
        reader: R,
        sink: Arc<dyn SensorEventSink>,
        cancel: CancellationToken,
        max_frame_len: usize,
        read_timeout: Option<Duration>,
    ) -> (Self, watch::Receiver<ReceiveState>) {
        let (state_tx, state_rx) = watch::channel(ReceiveState::Running);
        let this = Self {
            reader,
            sink,
            cancel,
            state_tx,
            max_frame_len,
            read_timeout,
            session: Uuid::nil(),
        };
        (this, state_rx)
    }

    /// Tags log lines with a connection session id.
    pub fn with_session(mut self, session: Uuid) -> Self {
        self.session = session;
        self
    }

    /// Drives the loop to completion.
    pub async fn run(mut self) -> ReceiveOutcome {
        let session = self.session;
        debug!(%session, "receive loop started");

        let outcome = loop {
            if self.cancel.is_cancelled() {
                break ReceiveOutcome::Cancelled;
            }
            self.state_tx.send_replace(ReceiveState::Idle);

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break ReceiveOutcome::Cancelled,
                result = read_frame(&mut self.reader, self.max_frame_len, self.read_timeout) => {
                    result
                }
            };

            match result {
                Ok(Some(state)) => {
                    if self.cancel.is_cancelled() {
                        break ReceiveOutcome::Cancelled;
                    }
                    self.state_tx.send_replace(ReceiveState::Delivering);
                    self.sink.on_received(state);
                }
                Ok(None) => {
                    info!(%session, "server closed the stream");
                    break ReceiveOutcome::EndOfStream;
                }
                Err(e) => {
                    let kind = e.kind();
                    warn!(%session, error = %e, "receive loop stopped on error");
                    self.sink.on_error(kind, &e.to_string());
                    break ReceiveOutcome::Failed(kind);
                }
            }
        };

        debug!(%session, ?outcome, "receive loop stopped");
        self.state_tx.send_replace(ReceiveState::Stopped(outcome));
        outcome
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
