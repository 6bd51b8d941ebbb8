//! One live TCP session with the sensor server.
//!
//! A `Connection` is created by [`ConnectionManager`](super::ConnectionManager)
//! after a successful connect.  On creation it splits the stream:
//!
//! - the read half moves into a [`ReceiveLoop`] task;
//! - the write half stays here behind an async `Mutex`, which is the single
//!   writer discipline that keeps concurrent sends from interleaving frames.
//!
//! The receive task only holds a `Weak` reference back to the connection, so
//! dropping the last `Arc<Connection>` does not leak the session.  When the
//! loop ends on its own (stream end, error) it closes the connection; when it
//! ends because [`Connection::close`] cancelled it, the close is already in
//! progress.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sensorlink_core::{encode_frame, SensorState};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::{SendError, SensorEventSink};
use crate::infrastructure::network::receive_loop::{ReceiveLoop, ReceiveOutcome, ReceiveState};
use crate::infrastructure::network::ConnectionConfig;

/// A live session: the write half, the receive loop's controls, and metadata.
pub struct Connection {
    id: Uuid,
    peer_addr: SocketAddr,
    writer: Mutex<Option<OwnedWriteHalf>>,
    write_timeout: Duration,
    cancel: CancellationToken,
    closed: AtomicBool,
    receive_state: watch::Receiver<ReceiveState>,
}

impl Connection {
    /// Takes ownership of `stream` and starts its receive loop.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the peer address cannot be read (the socket
    /// is already unusable).
    pub fn open(
        stream: TcpStream,
        config: &ConnectionConfig,
        sink: Arc<dyn SensorEventSink>,
    ) -> io::Result<Arc<Self>> {
        let peer_addr = stream.peer_addr()?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!(%peer_addr, "could not disable Nagle's algorithm: {e}");
        }
        let id = Uuid::new_v4();
        let (read_half, write_half) = stream.into_split();
        let cancel = CancellationToken::new();

        let (receive_loop, receive_state) = ReceiveLoop::new(
            BufReader::new(read_half),
            sink,
            cancel.clone(),
            config.max_frame_len,
            config.read_timeout,
        );

        let conn = Arc::new(Self {
            id,
            peer_addr,
            writer: Mutex::new(Some(write_half)),
            write_timeout: config.write_timeout,
            cancel,
            closed: AtomicBool::new(false),
            receive_state,
        });

        let weak = Arc::downgrade(&conn);
        tokio::spawn(async move {
            let outcome = receive_loop.with_session(id).run().await;
            if outcome != ReceiveOutcome::Cancelled {
                if let Some(conn) = weak.upgrade() {
                    if let Err(e) = conn.close().await {
                        debug!(session = %id, "close after receive loop exit failed: {e}");
                    }
                }
            }
        });

        info!(session = %id, %peer_addr, "connection established");
        Ok(conn)
    }

    /// Session id used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Returns `true` once [`close`](Self::close) has run, explicitly or
    /// because the receive loop ended.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Current state of the receive loop.
    pub fn receive_state(&self) -> ReceiveState {
        *self.receive_state.borrow()
    }

    /// Waits until the receive loop has stopped and returns why.
    pub async fn wait_receive_stopped(&self) -> ReceiveOutcome {
        let mut rx = self.receive_state.clone();
        let stopped = rx.wait_for(|s| s.outcome().is_some()).await;
        stopped
            .ok()
            .and_then(|state| state.outcome())
            // The sender only disappears without a Stopped state if the
            // task was torn down with the runtime.
            .unwrap_or(ReceiveOutcome::Cancelled)
    }

    /// Encodes `state` and writes it as one frame, flushed before returning.
    ///
    /// Concurrent callers are serialized on the write half.  A failed or
    /// timed-out write may have left a partial frame on the wire, so the
    /// write half is dropped and later sends return [`SendError::Closed`];
    /// the receive loop keeps running.
    ///
    /// # Errors
    ///
    /// [`SendError::Closed`], [`SendError::Io`] or [`SendError::TimedOut`].
    pub async fn send(&self, state: SensorState) -> Result<(), SendError> {
        let frame = encode_frame(&state);
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(SendError::Closed)?;

        let write = async {
            writer.write_all(&frame).await?;
            writer.flush().await
        };
        let result = match time::timeout(self.write_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SendError::Io(e)),
            Err(_) => Err(SendError::TimedOut(self.write_timeout)),
        };

        match result {
            Ok(()) => {
                debug!(session = %self.id, bytes = frame.len(), "frame sent");
                Ok(())
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "send failed; write half discarded");
                guard.take();
                Err(e)
            }
        }
    }

    /// Closes the session.  Idempotent.
    ///
    /// Cancels the receive loop (which then drops the read half) and shuts
    /// down the write half.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from shutting down the write half, other than
    /// `NotConnected` (the peer already went away).
    pub async fn close(&self) -> io::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.cancel.cancel();
        info!(session = %self.id, peer_addr = %self.peer_addr, "closing connection");

        let writer = self.writer.lock().await.take();
        match writer {
            Some(mut w) => match w.shutdown().await {
                Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
