//! Chat WebSocket relay.
//!
//! A thin bridge between clients and the booking service's chat handlers:
//! each client event becomes one `cmd` envelope, each reply one event back.
//! The relay holds no chat state of its own.
//!
//! # Events
//! ```text
//! client → gateway                gateway → booking service
//! chat:sendMessage            →   cmd create-message
//! chat:read                   →   cmd mark-messages-as-read
//! chat:joinConversation       →   cmd check-conversation-participant
//!
//! gateway → client
//! chat:newMessage / chat:seen / chat:joined / chat:error
//! ```

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::extract::{decode_access_token, AccessTokenPayload};
use crate::http::server::AppState;
use crate::registry::Service;
use crate::transport::TransportError;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", any(ws_handler))
}

#[derive(Debug, Deserialize)]
struct ChatQuery {
    token: String,
}

/// One frame on the client side of the relay, both directions.
#[derive(Debug, Serialize, Deserialize)]
struct ChatEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

impl ChatEvent {
    fn new(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            data,
        }
    }

    fn error(message: &str) -> Self {
        Self::new("chat:error", json!({ "message": message }))
    }
}

/// Authenticate on upgrade; an invalid token never reaches the socket.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
) -> Response {
    let user = match decode_access_token(&query.token, &state.config.auth.access_token_secret) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };
    ws.on_upgrade(move |socket| relay_session(socket, state, user))
}

async fn relay_session(socket: WebSocket, state: AppState, user: AccessTokenPayload) {
    let (mut sink, mut stream) = socket.split();

    tracing::debug!(user_id = user.user_id, "Chat session opened");

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(m) => m,
            Err(_) => break,
        };
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by axum; everything else is ignored.
            _ => continue,
        };

        let event = match serde_json::from_str::<ChatEvent>(&text) {
            Ok(event) => event,
            Err(_) => {
                let _ = send_event(&mut sink, ChatEvent::error("malformed event")).await;
                continue;
            }
        };

        let reply = handle_event(&state, &user, event).await;
        if send_event(&mut sink, reply).await.is_err() {
            break;
        }
    }

    tracing::debug!(user_id = user.user_id, "Chat session closed");
}

async fn handle_event(state: &AppState, user: &AccessTokenPayload, event: ChatEvent) -> ChatEvent {
    let chat = state.registry.client(Service::Booking);

    match event.event.as_str() {
        "chat:sendMessage" => {
            let reply = chat
                .send(json!({
                    "cmd": "create-message",
                    "data": { "body": event.data, "user": user },
                }))
                .await;
            match reply {
                Ok(message) => ChatEvent::new("chat:newMessage", message),
                Err(e) => transport_error_event(e),
            }
        }
        "chat:read" => {
            let conversation_id = event.data.get("conversationId").cloned();
            let reply = chat
                .send(json!({
                    "cmd": "mark-messages-as-read",
                    "data": { "conversationId": conversation_id.clone(), "user": user },
                }))
                .await;
            match reply {
                Ok(_) => ChatEvent::new(
                    "chat:seen",
                    json!({ "conversationId": conversation_id, "userId": user.user_id }),
                ),
                Err(e) => transport_error_event(e),
            }
        }
        "chat:joinConversation" => {
            let conversation_id = event.data.get("conversationId").cloned();
            let reply = chat
                .send(json!({
                    "cmd": "check-conversation-participant",
                    "data": { "conversationId": conversation_id.clone(), "user": user },
                }))
                .await;
            match reply {
                Ok(allowed) if is_truthy(&allowed) => ChatEvent::new(
                    "chat:joined",
                    json!({ "conversationId": conversation_id }),
                ),
                Ok(_) => ChatEvent::error("Access denied to conversation"),
                Err(e) => transport_error_event(e),
            }
        }
        other => {
            tracing::debug!(event = other, "Unknown chat event");
            ChatEvent::error("unknown event")
        }
    }
}

fn transport_error_event(err: TransportError) -> ChatEvent {
    let api: ApiError = err.into();
    ChatEvent::new("chat:error", api.body)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Object(obj) => obj
            .get("isParticipant")
            .map(is_truthy)
            .unwrap_or(true),
        _ => true,
    }
}

async fn send_event(
    sink: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: ChatEvent,
) -> Result<(), ()> {
    let text = serde_json::to_string(&event).expect("event is serializable");
    sink.send(Message::Text(text.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_participant_checks() {
        assert!(is_truthy(&json!(true)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(null)));
        assert!(is_truthy(&json!({ "isParticipant": true })));
        assert!(!is_truthy(&json!({ "isParticipant": false })));
        assert!(is_truthy(&json!({ "id": 1 })));
    }

    #[test]
    fn events_round_trip() {
        let event = ChatEvent::new("chat:newMessage", json!({ "id": 1 }));
        let text = serde_json::to_string(&event).unwrap();
        let parsed: ChatEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.event, "chat:newMessage");
        assert_eq!(parsed.data["id"], 1);
    }

    #[test]
    fn missing_data_defaults_to_null() {
        let parsed: ChatEvent = serde_json::from_str(r#"{"event":"chat:read"}"#).unwrap();
        assert!(parsed.data.is_null());
    }
}
