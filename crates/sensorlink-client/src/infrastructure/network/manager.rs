//! ConnectionManager: owns the single active session with the server.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sensorlink_core::SensorState;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time;
use tracing::{debug, info, warn};

use crate::application::{ErrorKind, SendError, SensorEventSink, StateSender};
use crate::infrastructure::network::connection::Connection;
use crate::infrastructure::network::error::ConnectionError;
use crate::infrastructure::network::ConnectionConfig;

/// The connection manager.
///
/// Holds at most one live [`Connection`].  Connecting again closes the
/// previous session before the new handshake starts, so a reconnect never
/// leaks a socket or leaves an orphaned receive loop behind.
///
/// All methods are `async` and safe to call from any task; the active slot is
/// guarded by an async mutex that is never held across a handshake.
pub struct ConnectionManager {
    config: ConnectionConfig,
    sink: Arc<dyn SensorEventSink>,
    active: Mutex<Option<Arc<Connection>>>,
    /// Bumped by every connect and disconnect; a handshake that finishes
    /// after a newer bump is discarded.
    attempt: AtomicU64,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig, sink: Arc<dyn SensorEventSink>) -> Self {
        Self {
            config,
            sink,
            active: Mutex::new(None),
            attempt: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Connects to the host and port from the configuration.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect).
    pub async fn connect_configured(&self) -> Result<Arc<Connection>, ConnectionError> {
        let host = self.config.host.clone();
        self.connect(&host, self.config.port).await
    }

    /// Opens a new session with `host:port` and starts its receive loop.
    ///
    /// Any existing session is closed first.  The handshake is bounded by
    /// `connect_timeout` and runs without holding the active slot, so
    /// `send`, `current` and `disconnect` stay responsive meanwhile.  A
    /// `disconnect` or a newer `connect` issued during the handshake wins:
    /// this attempt then closes its socket and returns
    /// [`ConnectionError::Aborted`].
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the server is unreachable, refuses the
    /// connection, or the timeout elapses.  These are also reported to the
    /// sink as [`ErrorKind::Connection`].  No retry is attempted.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Arc<Connection>, ConnectionError> {
        let attempt = self.attempt.fetch_add(1, Ordering::AcqRel) + 1;
        let previous = self.active.lock().await.take();
        if let Some(previous) = previous {
            info!(session = %previous.id(), "closing previous connection before reconnecting");
            if let Err(e) = previous.close().await {
                warn!(session = %previous.id(), "error closing previous connection: {e}");
            }
        }

        let target = format!("{host}:{port}");
        info!(%target, "connecting to server");
        let stream = self.handshake(&target, TcpStream::connect((host, port))).await?;

        let conn = Connection::open(stream, &self.config, Arc::clone(&self.sink)).map_err(|source| {
            self.report(ConnectionError::ConnectFailed {
                target: target.clone(),
                source,
            })
        })?;
        self.install(conn, attempt, target).await
    }

    /// Awaits `connect` under `connect_timeout`, reporting failures.
    async fn handshake<F>(&self, target: &str, connect: F) -> Result<TcpStream, ConnectionError>
    where
        F: Future<Output = io::Result<TcpStream>>,
    {
        match time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(self.report(ConnectionError::ConnectFailed {
                target: target.to_string(),
                source,
            })),
            Err(_) => Err(self.report(ConnectionError::TimedOut {
                target: target.to_string(),
                after: self.config.connect_timeout,
            })),
        }
    }

    /// Publishes `conn` unless a later connect or disconnect superseded
    /// `attempt`, in which case `conn` is closed.
    async fn install(
        &self,
        conn: Arc<Connection>,
        attempt: u64,
        target: String,
    ) -> Result<Arc<Connection>, ConnectionError> {
        let mut active = self.active.lock().await;
        if self.attempt.load(Ordering::Acquire) != attempt {
            drop(active);
            info!(session = %conn.id(), %target, "connect superseded; closing new session");
            if let Err(e) = conn.close().await {
                debug!(session = %conn.id(), "close of superseded session failed: {e}");
            }
            return Err(ConnectionError::Aborted { target });
        }
        *active = Some(Arc::clone(&conn));
        Ok(conn)
    }

    /// Closes the active session, if any, and abandons a connect still in
    /// its handshake.  Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from shutting the socket down.
    pub async fn disconnect(&self) -> io::Result<()> {
        self.attempt.fetch_add(1, Ordering::AcqRel);
        let conn = self.active.lock().await.take();
        match conn {
            Some(conn) => conn.close().await,
            None => Ok(()),
        }
    }

    /// The active session, unless it has already been closed.
    pub async fn current(&self) -> Option<Arc<Connection>> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|conn| !conn.is_closed())
            .cloned()
    }

    /// Sends `state` on the active session.
    ///
    /// The slot lock is released before writing, so a slow send does not
    /// hold up other senders beyond the connection's own write lock.
    ///
    /// # Errors
    ///
    /// [`SendError::NotConnected`] when there is no session, otherwise the
    /// error from [`Connection::send`].
    pub async fn send(&self, state: SensorState) -> Result<(), SendError> {
        let conn = self
            .active
            .lock()
            .await
            .clone()
            .ok_or(SendError::NotConnected)?;
        conn.send(state).await
    }

    fn report(&self, err: ConnectionError) -> ConnectionError {
        warn!(error = %err, "connection attempt failed");
        self.sink.on_error(ErrorKind::Connection, &err.to_string());
        err
    }
}

#[async_trait]
impl StateSender for ConnectionManager {
    async fn send_state(&self, state: SensorState) -> Result<(), SendError> {
        self.send(state).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
