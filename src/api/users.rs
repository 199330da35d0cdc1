//! Customer-facing routes, forwarded to the user service.
//!
//! Envelopes here use the `{type: SCREAMING_CASE, ...}` convention the user
//! service expects; caller ids come from the access token, never the body.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{with_fields, Pagination};
use crate::http::error::{relay, ApiError, ApiResult};
use crate::http::extract::ActiveUser;
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update-customer-information", patch(update_customer))
        .route("/change-bank-account", patch(change_bank_account))
        .route("/complete-booking", patch(complete_booking))
        .route("/create-customer-report/{bookingId}", post(create_report))
        .route("/get-customer-reports", get(get_reports))
        .route("/get-booking-by-customer", get(get_bookings))
        .route("/get-customer-booking/{bookingId}", get(get_booking_by_id))
        .route(
            "/cancel-service-request/{serviceRequestId}",
            patch(cancel_service_request),
        )
        .route("/create-review/{bookingId}", post(create_review))
        .route("/get-transactions", get(get_transactions))
        .route("/get-favorites", get(get_favorites))
        .route("/toggle-favorite/{serviceId}", post(toggle_favorite))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCustomerBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankAccountBody {
    bank_name: String,
    bank_account_number: String,
    account_holder_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteBookingBody {
    booking_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReportBody {
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReviewBody {
    rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

async fn update_customer(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<UpdateCustomerBody>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "UPDATE_CUSTOMER",
            "customerId": customer_id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn change_bank_account(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<BankAccountBody>,
) -> ApiResult {
    let envelope = with_fields(
        json!({ "type": "CHANGE_BANK_ACCOUNT", "userId": user.user_id() }),
        json!(body),
    );
    relay(state.registry.client(Service::User).send(envelope).await)
}

async fn complete_booking(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<CompleteBookingBody>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "CUSTOMER_COMPLETE_BOOKING",
            "bookingId": body.booking_id,
            "currentUserId": user.user_id(),
        }))
        .await;
    relay(reply)
}

async fn create_report(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(booking_id): Path<i64>,
    Json(body): Json<ReportBody>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "CREATE_CUSTOMER_REPORT",
            "bookingId": booking_id,
            "customerId": customer_id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn get_reports(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_CUSTOMER_REPORTS",
            "customerId": customer_id,
            "query": query,
        }))
        .await;
    relay(reply)
}

async fn get_bookings(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_BOOKING_BY_CUSTOMER",
            "customerId": customer_id,
            "query": query,
        }))
        .await;
    relay(reply)
}

async fn get_booking_by_id(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(booking_id): Path<i64>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_CUSTOMER_BOOKING_BY_ID",
            "bookingId": booking_id,
            "customerId": customer_id,
        }))
        .await;
    relay(reply)
}

async fn cancel_service_request(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(service_request_id): Path<i64>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "CANCEL_SERVICE_REQUEST",
            "serviceRequestId": service_request_id,
            "customerId": customer_id,
        }))
        .await;
    relay(reply)
}

async fn create_review(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(booking_id): Path<i64>,
    Json(body): Json<ReviewBody>,
) -> ApiResult {
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::bad_request("rating must be between 1 and 5"));
    }
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "CREATE_REVIEW",
            "bookingId": booking_id,
            "customerId": customer_id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn get_transactions(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_TRANSACTIONS_BY_USERID",
            "userId": user.user_id(),
            "query": query,
        }))
        .await;
    relay(reply)
}

async fn get_favorites(State(state): State<AppState>, user: ActiveUser) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "GET_CUSTOMER_FAVORITES",
            "customerId": customer_id,
        }))
        .await;
    relay(reply)
}

async fn toggle_favorite(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(service_id): Path<i64>,
) -> ApiResult {
    let customer_id = user.require_customer()?;
    let reply = state
        .registry
        .client(Service::User)
        .send(json!({
            "type": "TOGGLE_FAVORITE_SERVICE",
            "customerId": customer_id,
            "serviceId": service_id,
        }))
        .await;
    relay(reply)
}
