//! Shared utilities for integration testing: a scripted mock backend that
//! speaks the newline-delimited JSON protocol.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// What the scripted backend does with one request.
#[allow(dead_code)]
pub enum MockReply {
    /// Reply `{id, data}` immediately.
    Data(Value),
    /// Reply `{id, data}` after a delay (out-of-order tests).
    DelayedData(u64, Value),
    /// Reply `{id, error}`.
    Error(Value),
    /// Never reply.
    Silent,
    /// Close the connection without replying.
    Hangup,
    /// Write raw pre-encoded bytes (stale ids, malformed lines, ...).
    Raw(String),
}

/// Start a backend whose behavior is computed per request from the
/// correlation id and the request payload.
pub async fn start_mock_backend<F>(addr: SocketAddr, behavior: F)
where
    F: Fn(&str, &Value) -> MockReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let behavior = Arc::new(behavior);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let behavior = behavior.clone();
                    tokio::spawn(handle_connection(socket, behavior));
                }
                Err(_) => break,
            }
        }
    });
}

async fn handle_connection<F>(socket: TcpStream, behavior: Arc<F>)
where
    F: Fn(&str, &Value) -> MockReply + Send + Sync + 'static,
{
    let (read_half, write_half) = socket.into_split();
    let writer = Arc::new(Mutex::new(write_half));
    let mut lines = BufReader::new(read_half).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let frame: Value = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(_) => continue,
        };
        let id = frame
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let payload = frame.get("payload").cloned().unwrap_or(Value::Null);

        match behavior(&id, &payload) {
            MockReply::Data(data) => {
                write_line(&writer, ok_line(&id, data)).await;
            }
            MockReply::DelayedData(delay_ms, data) => {
                let writer = writer.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    write_line(&writer, ok_line(&id, data)).await;
                });
            }
            MockReply::Error(error) => {
                let line = format!("{}\n", json!({ "id": id, "error": error }));
                write_line(&writer, line).await;
            }
            MockReply::Silent => {}
            MockReply::Hangup => {
                let mut writer = writer.lock().await;
                let _ = writer.shutdown().await;
                return;
            }
            MockReply::Raw(raw) => {
                write_line(&writer, raw).await;
            }
        }
    }
}

#[allow(dead_code)]
pub fn ok_line(id: &str, data: Value) -> String {
    format!("{}\n", json!({ "id": id, "data": data }))
}

async fn write_line(writer: &Arc<Mutex<OwnedWriteHalf>>, line: String) {
    let mut writer = writer.lock().await;
    let _ = writer.write_all(line.as_bytes()).await;
}
