//! Authentication routes, forwarded to the auth service.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::with_fields;
use crate::http::error::{relay, ApiResult};
use crate::http::extract::ClientMeta;
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/otp", post(send_otp))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/register-provider", post(register_provider))
        .route("/ping", get(ping))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    email: String,
    password: String,
    confirm_password: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    otp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtpBody {
    email: String,
    /// REGISTER, FORGOT_PASSWORD, ...
    #[serde(rename = "type")]
    purpose: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenBody {
    refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForgotPasswordBody {
    email: String,
    otp: String,
    new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterProviderBody {
    email: String,
    password: String,
    confirm_password: String,
    name: String,
    company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    otp: String,
}

async fn register(State(state): State<AppState>, Json(body): Json<RegisterBody>) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "register", "data": body }))
        .await;
    relay(reply)
}

async fn send_otp(State(state): State<AppState>, Json(body): Json<OtpBody>) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "otp", "data": body }))
        .await;
    relay(reply)
}

async fn login(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(body): Json<LoginBody>,
) -> ApiResult {
    let data = with_fields(json!(body), json!(meta));
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "login", "data": data }))
        .await;
    relay(reply)
}

async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "refresh-token", "data": body }))
        .await;
    relay(reply)
}

async fn logout(State(state): State<AppState>, Json(body): Json<RefreshTokenBody>) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "logout", "data": body }))
        .await;
    relay(reply)
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "forgot-password", "data": body }))
        .await;
    relay(reply)
}

async fn register_provider(
    State(state): State<AppState>,
    Json(body): Json<RegisterProviderBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Auth)
        .send(json!({ "cmd": "register-provider", "data": body }))
        .await;
    relay(reply)
}

/// Gateway-local liveness check; does not touch the auth service.
async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
