//! Integration tests for the raw TCP transport client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use care_gateway::config::TransportConfig;
use care_gateway::lifecycle::Shutdown;
use care_gateway::transport::{TcpClient, TransportError};

mod common;
use common::MockReply;

fn fast_config() -> TransportConfig {
    TransportConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        max_connect_attempts: 3,
        reconnect_base_delay_ms: 20,
        reconnect_max_delay_ms: 100,
        ..TransportConfig::default()
    }
}

fn client(addr: SocketAddr, shutdown: &Shutdown, config: TransportConfig) -> TcpClient {
    TcpClient::new("test-backend", addr.to_string(), config, shutdown.subscribe())
}

#[tokio::test]
async fn request_reply_passthrough() {
    let addr: SocketAddr = "127.0.0.1:29401".parse().unwrap();
    common::start_mock_backend(addr, |_, payload| {
        assert_eq!(payload["type"], "GET_USER");
        assert_eq!(payload["data"]["id"], 7);
        MockReply::Data(json!({ "id": 7, "name": "Alice" }))
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let reply = client
        .send(json!({ "type": "GET_USER", "data": { "id": 7 } }))
        .await
        .unwrap();

    assert_eq!(reply, json!({ "id": 7, "name": "Alice" }));
    assert_eq!(client.pending_requests(), 0);
}

#[tokio::test]
async fn replies_match_by_id_regardless_of_order() {
    let addr: SocketAddr = "127.0.0.1:29402".parse().unwrap();
    // Echo the payload back, but delay request "A" so "B" replies first.
    common::start_mock_backend(addr, |_, payload| {
        let delay = payload["delayMs"].as_u64().unwrap_or(0);
        if delay > 0 {
            MockReply::DelayedData(delay, payload.clone())
        } else {
            MockReply::Data(payload.clone())
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let a = client.send(json!({ "name": "A", "delayMs": 150 }));
    let b = client.send(json!({ "name": "B" }));
    let (a, b) = tokio::join!(a, b);

    assert_eq!(a.unwrap()["name"], "A");
    assert_eq!(b.unwrap()["name"], "B");
}

#[tokio::test]
async fn many_concurrent_callers_each_get_their_reply() {
    let addr: SocketAddr = "127.0.0.1:29403".parse().unwrap();
    common::start_mock_backend(addr, |_, payload| {
        // Vary reply order across the batch.
        let n = payload["n"].as_u64().unwrap_or(0);
        MockReply::DelayedData((n % 7) * 15, payload.clone())
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let mut tasks = Vec::new();
    for n in 0..32u64 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let reply = client.send(json!({ "n": n })).await.unwrap();
            assert_eq!(reply["n"], n);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(client.pending_requests(), 0);
}

#[tokio::test]
async fn disconnect_fails_outstanding_then_reconnects() {
    let addr: SocketAddr = "127.0.0.1:29404".parse().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    common::start_mock_backend(addr, move |_, payload| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            MockReply::Hangup
        } else {
            MockReply::Data(payload.clone())
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    // First request: backend drops the connection before replying.
    let started = Instant::now();
    let err = client.send(json!({ "attempt": 1 })).await.unwrap_err();
    assert!(matches!(err, TransportError::Connection(_)));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "failure should be prompt, not a deadline expiry"
    );
    assert_eq!(client.pending_requests(), 0);

    // Second request rides the background reconnection; the caller does
    // nothing special.
    let reply = client.send(json!({ "attempt": 2 })).await.unwrap();
    assert_eq!(reply["attempt"], 2);
}

#[tokio::test]
async fn timeout_releases_request_and_late_reply_is_discarded() {
    let addr: SocketAddr = "127.0.0.1:29405".parse().unwrap();
    common::start_mock_backend(addr, |_, payload| {
        if payload["slow"].as_bool().unwrap_or(false) {
            // Reply well after the caller's deadline.
            MockReply::DelayedData(3_500, payload.clone())
        } else {
            MockReply::Data(payload.clone())
        }
    })
    .await;

    let config = TransportConfig {
        request_timeout_secs: 2,
        ..fast_config()
    };
    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, config);

    let started = Instant::now();
    let err = client.send(json!({ "slow": true })).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, TransportError::Timeout(_)));
    assert!(elapsed >= Duration::from_millis(1_900), "not before ~2s");
    assert!(elapsed < Duration::from_millis(3_000), "not much after 2s");
    assert_eq!(client.pending_requests(), 0, "timed-out entry is removed");

    // Wait for the stale reply to arrive, then confirm the connection still
    // works and nothing cross-resolves.
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    let reply = client.send(json!({ "slow": false, "tag": "after" })).await.unwrap();
    assert_eq!(reply["tag"], "after");
    assert_eq!(client.pending_requests(), 0);
}

#[tokio::test]
async fn unknown_reply_ids_are_ignored() {
    let addr: SocketAddr = "127.0.0.1:29406".parse().unwrap();
    common::start_mock_backend(addr, |id, payload| {
        // A stale reply nobody asked for, then the real one.
        let stale = json!({ "id": "00000000-0000-0000-0000-000000000000", "data": "stale" });
        let real = common::ok_line(id, payload.clone());
        MockReply::Raw(format!("{}\n{}", stale, real))
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let reply = client.send(json!({ "want": "mine" })).await.unwrap();
    assert_eq!(reply["want"], "mine");
}

#[tokio::test]
async fn malformed_line_does_not_poison_the_stream() {
    let addr: SocketAddr = "127.0.0.1:29407".parse().unwrap();
    common::start_mock_backend(addr, |id, payload| {
        let real = common::ok_line(id, payload.clone());
        MockReply::Raw(format!("this is not json\n{}", real))
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let reply = client.send(json!({ "ok": true })).await.unwrap();
    assert_eq!(reply["ok"], true);
}

#[tokio::test]
async fn remote_errors_pass_through() {
    let addr: SocketAddr = "127.0.0.1:29408".parse().unwrap();
    common::start_mock_backend(addr, |_, _| {
        MockReply::Error(json!({ "message": "User not found", "code": 404 }))
    })
    .await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let err = client.send(json!({ "type": "GET_USER" })).await.unwrap_err();
    match err {
        TransportError::Remote(wire) => {
            assert_eq!(wire.message, "User not found");
            assert_eq!(wire.http_status(), Some(404));
        }
        other => panic!("expected Remote, got {:?}", other),
    }
}

#[tokio::test]
async fn send_after_exhausted_cycle_retriggers_connection() {
    let addr: SocketAddr = "127.0.0.1:29409".parse().unwrap();

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    // Let the eager connect cycle burn out against the closed port.
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Now the backend comes up; the next send must wake a fresh cycle.
    common::start_mock_backend(addr, |_, payload| MockReply::Data(payload.clone())).await;

    let reply = client.send(json!({ "revived": true })).await.unwrap();
    assert_eq!(reply["revived"], true);
}

#[tokio::test]
async fn shutdown_fails_outstanding_requests() {
    let addr: SocketAddr = "127.0.0.1:29410".parse().unwrap();
    common::start_mock_backend(addr, |_, _| MockReply::Silent).await;

    let shutdown = Shutdown::new();
    let client = client(addr, &shutdown, fast_config());

    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.send(json!({ "type": "PING" })).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.trigger();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(TransportError::Connection(_))));
}
