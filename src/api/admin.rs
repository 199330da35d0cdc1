//! Administrative routes, forwarded to the admin service.
//!
//! Every handler requires the ADMIN role; finer-grained permissions are
//! enforced by the admin service itself.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::Pagination;
use crate::http::error::{relay, ApiResult};
use crate::http::extract::ActiveUser;
use crate::http::server::AppState;
use crate::registry::Service;

const ADMIN_ROLE: &str = "ADMIN";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users).post(create_user))
        .route("/users/{id}", get(get_user_by_id).delete(delete_user))
        .route("/users/{id}/block", patch(block_user))
        .route("/users/{id}/unblock", patch(unblock_user))
        .route("/users/{id}/reset-password", patch(reset_user_password))
        .route("/roles", get(get_roles).post(create_role))
        .route("/roles/{id}", patch(update_role).delete(delete_role))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserBody {
    email: String,
    name: String,
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody {
    new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleBody {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    permission_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRoleBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    permission_ids: Vec<i64>,
}

async fn get_users(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_GET_USERS", "query": query }))
        .await;
    relay(reply)
}

async fn create_user(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<CreateUserBody>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_CREATE_USER", "data": body }))
        .await;
    relay(reply)
}

async fn get_user_by_id(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_GET_USER_BY_ID", "userId": id }))
        .await;
    relay(reply)
}

async fn delete_user(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_DELETE_USER", "userId": id }))
        .await;
    relay(reply)
}

async fn block_user(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_BLOCK_USER", "userId": id }))
        .await;
    relay(reply)
}

async fn unblock_user(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_UNBLOCK_USER", "userId": id }))
        .await;
    relay(reply)
}

async fn reset_user_password(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
    Json(body): Json<ResetPasswordBody>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({
            "type": "ADMIN_RESET_USER_PASSWORD",
            "userId": id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn get_roles(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_GET_ROLES", "query": query }))
        .await;
    relay(reply)
}

async fn create_role(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<RoleBody>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_CREATE_ROLE", "data": body }))
        .await;
    relay(reply)
}

async fn update_role(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRoleBody>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({
            "type": "ADMIN_UPDATE_ROLE",
            "roleId": id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn delete_role(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    user.require_role(ADMIN_ROLE)?;
    let reply = state
        .registry
        .client(Service::Admin)
        .send(json!({ "type": "ADMIN_DELETE_ROLE", "roleId": id }))
        .await;
    relay(reply)
}
