//! Payment routes: top-ups, provider callbacks, withdrawals.
//!
//! The PayOS callback is authenticated with a static API key instead of a
//! bearer token; everything else requires a signed-in user.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Pagination;
use crate::http::error::{relay, ApiError, ApiResult};
use crate::http::extract::{ActiveUser, PaymentApiKey};
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-topup", post(create_topup))
        .route("/callback", post(payos_callback))
        .route(
            "/create-proposal-transaction",
            post(create_proposal_transaction),
        )
        .route("/status", get(payment_status))
        .route("/get-list-withdraw", get(list_withdrawals))
        .route("/get-withdraw-detail/{id}", get(withdrawal_detail))
        .route("/create-withdraw-request", post(create_withdrawal))
}

#[derive(Debug, Deserialize)]
struct TopupBody {
    amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalTransactionBody {
    booking_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery {
    order_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawBody {
    amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

async fn create_topup(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<TopupBody>,
) -> ApiResult {
    if body.amount <= 0 {
        return Err(ApiError::bad_request("amount must be positive"));
    }
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({
            "type": "CREATE_TOPUP",
            "userId": user.user_id(),
            "amount": body.amount,
        }))
        .await;
    relay(reply)
}

/// Provider-initiated callback; the body shape is owned by PayOS and
/// forwarded untouched.
async fn payos_callback(
    State(state): State<AppState>,
    _key: PaymentApiKey,
    Json(body): Json<Value>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({ "type": "HANDLE_PAYOS_CALLBACK", "data": body }))
        .await;
    relay(reply)
}

async fn create_proposal_transaction(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<ProposalTransactionBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({
            "type": "CREATE_PROPOSAL_TRANSACTION",
            "userId": user.user_id(),
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn payment_status(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<StatusQuery>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({
            "type": "GET_PAYMENT_STATUS",
            "userId": user.user_id(),
            "orderCode": query.order_code,
        }))
        .await;
    relay(reply)
}

async fn list_withdrawals(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({
            "cmd": "get-list-withdraw",
            "data": { "userId": user.user_id(), "query": query },
        }))
        .await;
    relay(reply)
}

async fn withdrawal_detail(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({
            "cmd": "get-withdraw-detail",
            "data": { "id": id, "userId": user.user_id() },
        }))
        .await;
    relay(reply)
}

async fn create_withdrawal(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<WithdrawBody>,
) -> ApiResult {
    if body.amount <= 0 {
        return Err(ApiError::bad_request("amount must be positive"));
    }
    let reply = state
        .registry
        .client(Service::Payment)
        .send(json!({
            "cmd": "create-withdraw-request",
            "data": { "userId": user.user_id(), "body": body },
        }))
        .await;
    relay(reply)
}
