//! Raw TCP client: connection supervisor, correlation, reconnection.
//!
//! # Responsibilities
//! - Own one persistent connection per backend (host, port)
//! - Correlate concurrent in-flight requests to replies by UUID
//! - Fail every outstanding request the moment the connection drops
//! - Reconnect with capped exponential backoff
//!
//! # Design Decisions
//! - A single supervisor task owns the socket; reads, writes, and the
//!   remove-all-on-disconnect sweep all happen on it, so the only shared
//!   state is the pending map (whose per-entry removals are atomic)
//! - Writes go through one mpsc queue: concurrent send() calls can never
//!   interleave partial frames on the wire, and sends issued while the
//!   connection is still being established are flushed once it is up
//! - When a connect cycle exhausts its attempt budget, queued work fails
//!   with a connection error and the next send() wakes a fresh cycle

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time;
use uuid::Uuid;

use crate::config::TransportConfig;
use crate::observability::metrics;
use crate::transport::backoff::calculate_backoff;
use crate::transport::error::TransportError;
use crate::transport::frame::{FrameDecoder, RequestFrame, ResponseFrame};

/// Connection lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Closing = 3,
}

impl From<u8> for ConnectionState {
    fn from(val: u8) -> Self {
        match val {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Closing,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// One frame queued for the writer.
struct Outbound {
    id: Uuid,
    bytes: Vec<u8>,
}

/// Why the I/O loop ended.
enum IoExit {
    PeerClosed,
    Io(String),
    Protocol(String),
    ClientDropped,
    Shutdown,
}

impl IoExit {
    fn describe(&self) -> String {
        match self {
            IoExit::PeerClosed => "backend closed the connection".to_string(),
            IoExit::Io(e) => format!("socket error: {}", e),
            IoExit::Protocol(e) => format!("unrecoverable framing error: {}", e),
            IoExit::ClientDropped => "client dropped".to_string(),
            IoExit::Shutdown => "gateway shutting down".to_string(),
        }
    }
}

struct Inner {
    /// Logical service label for logs and metrics.
    service: &'static str,
    /// "host:port" of the backend.
    addr: String,
    config: TransportConfig,
    /// In-flight requests awaiting a correlated reply.
    pending: DashMap<Uuid, oneshot::Sender<Result<Value, TransportError>>>,
    state: AtomicU8,
}

impl Inner {
    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Relaxed);
        metrics::record_connection_state(self.service, state == ConnectionState::Connected);
    }

    fn record_pending(&self) {
        metrics::record_pending_requests(self.service, self.pending.len());
    }
}

/// Async request/response client over one persistent TCP connection.
///
/// Cheap to clone; all clones share the connection and pending set.
#[derive(Clone)]
pub struct TcpClient {
    inner: Arc<Inner>,
    outbound: mpsc::Sender<Outbound>,
}

impl TcpClient {
    /// Create the client and spawn its connection supervisor.
    ///
    /// The supervisor connects eagerly; if the backend is not up yet the
    /// first connect cycle fails quietly and the next send() retriggers it.
    pub fn new(
        service: &'static str,
        addr: String,
        config: TransportConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.outbound_queue);
        let inner = Arc::new(Inner {
            service,
            addr,
            config,
            pending: DashMap::new(),
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
        });

        tokio::spawn(supervisor(inner.clone(), rx, shutdown));

        Self {
            inner,
            outbound: tx,
        }
    }

    /// Send one request payload and await the correlated reply.
    ///
    /// The payload is wrapped as `{id, payload}`; the reply's `data` field
    /// is returned as-is. See [`TransportError`] for the failure modes.
    pub async fn send(&self, payload: Value) -> Result<Value, TransportError> {
        let started = Instant::now();
        let result = self.send_inner(payload).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_rpc(self.inner.service, outcome, started);
        result
    }

    async fn send_inner(&self, payload: Value) -> Result<Value, TransportError> {
        let id = Uuid::new_v4();
        let bytes = RequestFrame::new(id, payload).encode()?;

        let (waiter_tx, waiter_rx) = oneshot::channel();
        self.inner.pending.insert(id, waiter_tx);
        self.inner.record_pending();

        if self.outbound.send(Outbound { id, bytes }).await.is_err() {
            self.inner.pending.remove(&id);
            self.inner.record_pending();
            return Err(TransportError::Connection(
                "transport is shut down".to_string(),
            ));
        }

        let deadline = Duration::from_secs(self.inner.config.request_timeout_secs);
        match time::timeout(deadline, waiter_rx).await {
            Ok(Ok(result)) => result,
            // Supervisor exited without resolving us; treated as a drop.
            Ok(Err(_)) => Err(TransportError::Connection(
                "connection task exited".to_string(),
            )),
            Err(_) => {
                // Remove our entry so a late reply is discarded, not matched.
                self.inner.pending.remove(&id);
                self.inner.record_pending();
                Err(TransportError::Timeout(deadline))
            }
        }
    }

    /// Logical service label this client fronts.
    pub fn service(&self) -> &'static str {
        self.inner.service
    }

    /// Current connection lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.load(Ordering::Relaxed).into()
    }

    /// Number of requests currently awaiting a reply.
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.len()
    }
}

enum Establish {
    Connected(TcpStream),
    Exhausted,
    Shutdown,
}

/// Connection supervisor: connect → run I/O → fail pending → reconnect.
async fn supervisor(
    inner: Arc<Inner>,
    mut outbound: mpsc::Receiver<Outbound>,
    mut shutdown: broadcast::Receiver<()>,
) {
    // A frame that arrived while we were parked, carried into the next
    // connection so it is written first.
    let mut carry: Option<Outbound> = None;

    loop {
        inner.set_state(ConnectionState::Connecting);
        let stream = match establish(&inner, &mut shutdown).await {
            Establish::Connected(stream) => stream,
            Establish::Shutdown => {
                close_for_shutdown(&inner);
                return;
            }
            Establish::Exhausted => {
                tracing::warn!(
                    service = inner.service,
                    addr = %inner.addr,
                    "Connect attempts exhausted; failing queued requests"
                );
                inner.set_state(ConnectionState::Disconnected);
                carry = None;
                while outbound.try_recv().is_ok() {}
                fail_all_pending(&inner, "connection attempts exhausted");

                // Park until new work (or shutdown) retriggers a cycle.
                tokio::select! {
                    frame = outbound.recv() => match frame {
                        Some(frame) => {
                            carry = Some(frame);
                            continue;
                        }
                        None => return,
                    },
                    _ = shutdown.recv() => {
                        close_for_shutdown(&inner);
                        return;
                    }
                }
            }
        };

        inner.set_state(ConnectionState::Connected);
        tracing::info!(
            service = inner.service,
            addr = %inner.addr,
            "Backend connection established"
        );

        let exit = io_loop(&inner, stream, &mut outbound, carry.take(), &mut shutdown).await;

        match exit {
            IoExit::ClientDropped => {
                inner.set_state(ConnectionState::Disconnected);
                fail_all_pending(&inner, &exit.describe());
                return;
            }
            IoExit::Shutdown => {
                close_for_shutdown(&inner);
                return;
            }
            _ => {
                tracing::warn!(
                    service = inner.service,
                    addr = %inner.addr,
                    reason = %exit.describe(),
                    "Backend connection lost; reconnecting"
                );
                inner.set_state(ConnectionState::Disconnected);
                fail_all_pending(&inner, &exit.describe());
            }
        }
    }
}

/// One connect cycle: bounded attempts with backoff between them.
async fn establish(inner: &Inner, shutdown: &mut broadcast::Receiver<()>) -> Establish {
    let config = &inner.config;
    let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

    for attempt in 1..=config.max_connect_attempts {
        tokio::select! {
            result = time::timeout(connect_timeout, TcpStream::connect(&inner.addr)) => {
                match result {
                    Ok(Ok(stream)) => {
                        let _ = stream.set_nodelay(true);
                        return Establish::Connected(stream);
                    }
                    Ok(Err(e)) => tracing::debug!(
                        service = inner.service,
                        addr = %inner.addr,
                        attempt,
                        error = %e,
                        "Connect attempt failed"
                    ),
                    Err(_) => tracing::debug!(
                        service = inner.service,
                        addr = %inner.addr,
                        attempt,
                        "Connect attempt timed out"
                    ),
                }
            }
            _ = shutdown.recv() => return Establish::Shutdown,
        }

        if attempt < config.max_connect_attempts {
            let delay = calculate_backoff(
                attempt,
                config.reconnect_base_delay_ms,
                config.reconnect_max_delay_ms,
            );
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = shutdown.recv() => return Establish::Shutdown,
            }
        }
    }

    Establish::Exhausted
}

/// Pump one established connection until it fails or the client goes away.
async fn io_loop(
    inner: &Inner,
    stream: TcpStream,
    outbound: &mut mpsc::Receiver<Outbound>,
    carry: Option<Outbound>,
    shutdown: &mut broadcast::Receiver<()>,
) -> IoExit {
    let (mut reader, mut writer) = stream.into_split();
    let mut decoder = FrameDecoder::new(inner.config.max_frame_bytes);
    let mut read_buf = vec![0u8; 16 * 1024];

    if let Some(frame) = carry {
        if let Err(exit) = write_frame(inner, &mut writer, frame).await {
            return exit;
        }
    }

    loop {
        tokio::select! {
            read = reader.read(&mut read_buf) => match read {
                Ok(0) => return IoExit::PeerClosed,
                Ok(n) => match decoder.push(&read_buf[..n]) {
                    Ok(lines) => {
                        for line in lines {
                            dispatch_reply(inner, &line);
                        }
                    }
                    Err(e) => return IoExit::Protocol(e.to_string()),
                },
                Err(e) => return IoExit::Io(e.to_string()),
            },
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(exit) = write_frame(inner, &mut writer, frame).await {
                        return exit;
                    }
                }
                None => return IoExit::ClientDropped,
            },
            _ = shutdown.recv() => return IoExit::Shutdown,
        }
    }
}

async fn write_frame(
    inner: &Inner,
    writer: &mut OwnedWriteHalf,
    frame: Outbound,
) -> Result<(), IoExit> {
    // The caller may already have given up (timeout, or a fail-all sweep
    // between enqueue and write). Writing such a frame would only provoke
    // a reply nobody is waiting for.
    if !inner.pending.contains_key(&frame.id) {
        tracing::trace!(
            service = inner.service,
            id = %frame.id,
            "Dropping stale outbound frame"
        );
        return Ok(());
    }

    writer
        .write_all(&frame.bytes)
        .await
        .map_err(|e| IoExit::Io(e.to_string()))?;
    writer.flush().await.map_err(|e| IoExit::Io(e.to_string()))
}

/// Match one reply line against the pending set.
fn dispatch_reply(inner: &Inner, line: &[u8]) {
    let frame = match ResponseFrame::decode(line) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(
                service = inner.service,
                error = %e,
                "Discarding malformed reply frame"
            );
            return;
        }
    };

    let id = match Uuid::parse_str(&frame.id) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(
                service = inner.service,
                id = %frame.id,
                "Discarding reply with unrecognized id format"
            );
            return;
        }
    };

    match inner.pending.remove(&id) {
        Some((_, waiter)) => {
            // The waiter may have timed out between remove and here; a
            // failed send just means nobody is listening anymore.
            let _ = waiter.send(frame.into_result());
            inner.record_pending();
        }
        None => {
            tracing::debug!(
                service = inner.service,
                id = %frame.id,
                "Late or unknown reply discarded"
            );
        }
    }
}

/// Fail every outstanding request with a connection error.
fn fail_all_pending(inner: &Inner, reason: &str) {
    let ids: Vec<Uuid> = inner.pending.iter().map(|entry| *entry.key()).collect();
    let mut failed = 0usize;
    for id in ids {
        if let Some((_, waiter)) = inner.pending.remove(&id) {
            let _ = waiter.send(Err(TransportError::Connection(reason.to_string())));
            failed += 1;
        }
    }
    inner.record_pending();
    if failed > 0 {
        tracing::warn!(
            service = inner.service,
            failed,
            reason,
            "Failed outstanding requests"
        );
    }
}

fn close_for_shutdown(inner: &Inner) {
    inner.set_state(ConnectionState::Closing);
    fail_all_pending(inner, "gateway shutting down");
    inner.set_state(ConnectionState::Disconnected);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_u8() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Closing,
        ] {
            assert_eq!(ConnectionState::from(state as u8), state);
        }
    }

    #[tokio::test]
    async fn send_fails_fast_when_backend_absent() {
        let config = TransportConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 1,
            max_connect_attempts: 1,
            reconnect_base_delay_ms: 10,
            reconnect_max_delay_ms: 20,
            ..TransportConfig::default()
        };
        let (shutdown_tx, _) = broadcast::channel(1);
        // Port 1 is essentially never listening.
        let client = TcpClient::new(
            "test-service",
            "127.0.0.1:1".to_string(),
            config,
            shutdown_tx.subscribe(),
        );

        let err = client
            .send(serde_json::json!({ "type": "PING" }))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
        assert_eq!(client.pending_requests(), 0);
    }
}
