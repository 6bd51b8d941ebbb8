//! SubmitStateUseCase: the producer side of the exchange.
//!
//! A UI builds a [`SensorState`] and calls [`SubmitStateUseCase::submit`].
//! The use case hands the record to a [`StateSender`] (the connection
//! manager in production), reports any failure to the event sink so the user
//! sees it, and returns the same failure to the caller.
//!
//! A UI thread that must not await can call
//! [`SubmitStateUseCase::spawn_submit`], which runs the send on a Tokio
//! worker and returns a `JoinHandle`.  Independent spawned sends may reach
//! the socket in any order; [`SubmitStateUseCase::spawn_outbox`] keeps FIFO
//! order by draining a queue on one task.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sensorlink_core::SensorState;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::event_sink::{ErrorKind, SensorEventSink};

/// Errors that can occur while sending a record.
#[derive(Debug, Error)]
pub enum SendError {
    /// No connection is established.
    #[error("not connected to a server")]
    NotConnected,
    /// The connection has been closed.
    #[error("connection is closed")]
    Closed,
    /// Writing or flushing the frame failed.
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
    /// The write did not complete within the configured timeout.
    #[error("write timed out after {0:?}")]
    TimedOut(Duration),
}

/// Anything that can put one record on the wire.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateSender: Send + Sync {
    /// Encodes and writes `state`, returning once it is flushed to the transport.
    async fn send_state(&self, state: SensorState) -> Result<(), SendError>;
}

/// The Submit State use case.
pub struct SubmitStateUseCase {
    sender: Arc<dyn StateSender>,
    sink: Arc<dyn SensorEventSink>,
}

impl SubmitStateUseCase {
    pub fn new(sender: Arc<dyn StateSender>, sink: Arc<dyn SensorEventSink>) -> Self {
        Self { sender, sink }
    }

    /// Triggers one send of `state`.
    ///
    /// # Errors
    ///
    /// Returns the [`SendError`] from the sender after reporting it to the sink
    /// as [`ErrorKind::Send`].  No retry is attempted.
    pub async fn submit(&self, state: SensorState) -> Result<(), SendError> {
        debug!(%state, "submitting sensor state");
        match self.sender.send_state(state).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.sink.on_error(ErrorKind::Send, &e.to_string());
                Err(e)
            }
        }
    }

    /// Runs [`submit`](Self::submit) on a background task.
    pub fn spawn_submit(self: &Arc<Self>, state: SensorState) -> JoinHandle<Result<(), SendError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.submit(state).await })
    }

    /// Starts a task that submits queued records one at a time, in the order
    /// they were queued.
    ///
    /// Failures are reported to the sink and do not stop the queue.  The task
    /// ends once every sender half has been dropped and the queue is drained.
    pub fn spawn_outbox(self: &Arc<Self>) -> (mpsc::UnboundedSender<SensorState>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(state) = rx.recv().await {
                // Already reported to the sink by `submit`.
                let _ = this.submit(state).await;
            }
            debug!("outbox closed");
        });
        (tx, handle)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
