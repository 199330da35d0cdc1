//! Provider management routes (service catalog), forwarded to the
//! provider service.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::api::Pagination;
use crate::http::error::{relay, ApiResult};
use crate::http::extract::ActiveUser;
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-service", post(create_service))
        .route("/create-service-item", post(create_service_item))
        .route("/update-service-item/{id}", patch(update_service_item))
        .route("/get-service-item", get(get_service_items))
        .route("/get-service-item-detail/{id}", get(get_service_item_detail))
        .route("/delete-service-item/{id}", delete(delete_service_item))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceBody {
    name: String,
    category_id: i64,
    base_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_minutes: Option<u32>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceItemBody {
    name: String,
    unit_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock_quantity: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateServiceItemBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock_quantity: Option<i64>,
}

async fn create_service(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<ServiceBody>,
) -> ApiResult {
    let provider_id = user.require_provider()?;
    let reply = state
        .registry
        .client(Service::Provider)
        .send(json!({
            "cmd": "create-service",
            "data": { "providerId": provider_id, "body": body },
        }))
        .await;
    relay(reply)
}

async fn create_service_item(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<ServiceItemBody>,
) -> ApiResult {
    let provider_id = user.require_provider()?;
    let reply = state
        .registry
        .client(Service::Provider)
        .send(json!({
            "cmd": "create-service-item",
            "data": { "providerId": provider_id, "body": body },
        }))
        .await;
    relay(reply)
}

async fn update_service_item(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateServiceItemBody>,
) -> ApiResult {
    let provider_id = user.require_provider()?;
    let reply = state
        .registry
        .client(Service::Provider)
        .send(json!({
            "cmd": "update-service-item",
            "data": { "providerId": provider_id, "serviceItemId": id, "body": body },
        }))
        .await;
    relay(reply)
}

async fn get_service_items(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let provider_id = user.require_provider()?;
    let reply = state
        .registry
        .client(Service::Provider)
        .send(json!({
            "cmd": "get-service-item",
            "data": { "providerId": provider_id, "query": query },
        }))
        .await;
    relay(reply)
}

async fn get_service_item_detail(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    let provider_id = user.require_provider()?;
    let reply = state
        .registry
        .client(Service::Provider)
        .send(json!({
            "cmd": "get-service-item-detail",
            "data": { "providerId": provider_id, "serviceItemId": id },
        }))
        .await;
    relay(reply)
}

async fn delete_service_item(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<i64>,
) -> ApiResult {
    let provider_id = user.require_provider()?;
    let reply = state
        .registry
        .client(Service::Provider)
        .send(json!({
            "cmd": "delete-service-item",
            "data": { "providerId": provider_id, "serviceItemId": id },
        }))
        .await;
    relay(reply)
}
