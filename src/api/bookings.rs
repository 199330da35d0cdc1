//! Booking and conversation routes, forwarded to the booking service.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::http::error::{relay, ApiResult};
use crate::http::extract::ActiveUser;
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-service-request", post(create_service_request))
        .route("/get-user-conversation", get(get_user_conversation))
        .route("/get-messages", get(get_messages))
        .route(
            "/get-or-create-conversation",
            post(get_or_create_conversation),
        )
}

/// Known fields are typed; anything else rides along for the backend to
/// validate (its request schema evolves faster than the gateway's).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRequestBody {
    category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagesQuery {
    conversation_id: i64,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationBody {
    receiver_id: i64,
}

async fn create_service_request(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<ServiceRequestBody>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::Booking)
        .send(json!({
            "cmd": "create-service-request",
            "data": {
                "body": body,
                "userId": user.user_id(),
                "customerId": customer_id,
            },
        }))
        .await;
    relay(reply)
}

async fn get_user_conversation(State(state): State<AppState>, user: ActiveUser) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Booking)
        .send(json!({
            "cmd": "get-user-conversation",
            "data": { "user": user.0 },
        }))
        .await;
    relay(reply)
}

async fn get_messages(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<MessagesQuery>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Booking)
        .send(json!({
            "cmd": "get-messages",
            "data": { "user": user.0, "query": query },
        }))
        .await;
    relay(reply)
}

async fn get_or_create_conversation(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<ConversationBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Booking)
        .send(json!({
            "cmd": "get-or-create-conversation",
            "data": { "user": user.0, "receiverId": body.receiver_id },
        }))
        .await;
    relay(reply)
}
