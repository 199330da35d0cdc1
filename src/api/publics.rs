//! Mixed public and account routes: profile lookups, password changes,
//! storefront listings.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{with_fields, Pagination};
use crate::http::error::{relay, ApiResult};
use crate::http::extract::ActiveUser;
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-staff-information/{staffId}", get(get_staff_info))
        .route(
            "/get-customer-information/{customerId}",
            get(get_customer_info),
        )
        .route(
            "/get-service-provider-information/{providerId}",
            get(get_provider_info),
        )
        .route("/get-me", get(get_me))
        .route("/change-password", patch(change_password))
        .route("/link-bank-account", patch(link_bank_account))
        .route("/top-discounted-services", get(top_discounted_services))
        .route("/top-providers-all-time", get(top_providers))
        .route("/reviews/{providerId}", get(provider_reviews))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordBody {
    old_password: String,
    new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkBankAccountBody {
    bank_name: String,
    bank_account_number: String,
    account_holder_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TopListQuery {
    #[serde(default = "default_top_limit")]
    limit: u32,
}

fn default_top_limit() -> u32 {
    10
}

async fn get_staff_info(State(state): State<AppState>, Path(staff_id): Path<i64>) -> ApiResult {
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({ "type": "GET_STAFF", "staffId": staff_id }))
        .await;
    relay(reply)
}

async fn get_customer_info(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({ "type": "GET_CUSTOMER", "customerId": customer_id }))
        .await;
    relay(reply)
}

async fn get_provider_info(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({ "type": "GET_SERVICE_PROVIDER", "providerId": provider_id }))
        .await;
    relay(reply)
}

async fn get_me(State(state): State<AppState>, user: ActiveUser) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({ "type": "GET_ME", "userId": user.user_id() }))
        .await;
    relay(reply)
}

async fn change_password(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<ChangePasswordBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "CHANGE_PASSWORD",
            "userId": user.user_id(),
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn link_bank_account(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<LinkBankAccountBody>,
) -> ApiResult {
    let envelope = with_fields(
        json!({ "type": "LINK_BANK_ACCOUNT", "userId": user.user_id() }),
        json!(body),
    );
    relay(state.registry.client(Service::User).send(envelope).await)
}

async fn top_discounted_services(
    State(state): State<AppState>,
    Query(query): Query<TopListQuery>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_TOP_DISCOUNTED_SERVICES",
            "limit": query.limit,
        }))
        .await;
    relay(reply)
}

async fn top_providers(
    State(state): State<AppState>,
    Query(query): Query<TopListQuery>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_TOP_PROVIDERS_ALL_TIME",
            "limit": query.limit,
        }))
        .await;
    relay(reply)
}

async fn provider_reviews(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_REVIEWS_BY_PROVIDER_ID",
            "providerId": provider_id,
            "query": query,
        }))
        .await;
    relay(reply)
}
