//! Staff-facing routes, forwarded to the staff service.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Pagination;
use crate::http::error::{relay, ApiResult};
use crate::http::extract::ActiveUser;
use crate::http::server::AppState;
use crate::registry::Service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update-staff-information", patch(update_staff))
        .route("/get-list-booking", get(get_bookings))
        .route("/get-booking-detail/{bookingId}", get(get_booking_detail))
        .route("/create-inspection-report", post(create_inspection_report))
        .route(
            "/update-inspection-report/{inspectionId}",
            patch(update_inspection_report),
        )
        .route("/staff-checkin/{bookingId}", post(check_in))
        .route("/staff-checkout/{bookingId}", patch(check_out))
        .route("/staff-get-performance", get(get_performance))
        .route("/staff-get-reviews", get(get_reviews))
        .route("/staff-get-monthly-stats", get(get_monthly_stats))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStaffBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectionReportBody {
    booking_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    /// Line items the staff member proposes after inspection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    proposed_items: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateInspectionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    proposed_items: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MonthlyStatsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<u16>,
}

async fn update_staff(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<UpdateStaffBody>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "UPDATE_STAFF",
            "staffId": staff_id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn get_bookings(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_GET_BOOKINGS",
            "staffId": staff_id,
            "query": query,
        }))
        .await;
    relay(reply)
}

async fn get_booking_detail(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(booking_id): Path<i64>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_GET_BOOKING_DETAIL",
            "staffId": staff_id,
            "bookingId": booking_id,
        }))
        .await;
    relay(reply)
}

async fn create_inspection_report(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<InspectionReportBody>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_CREATE_INSPECTION_REPORT",
            "staffId": staff_id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn update_inspection_report(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(inspection_id): Path<i64>,
    Json(body): Json<UpdateInspectionBody>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "UPDATE_INSPECTION_REPORT",
            "staffId": staff_id,
            "inspectionId": inspection_id,
            "data": body,
        }))
        .await;
    relay(reply)
}

async fn check_in(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(booking_id): Path<i64>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_CREATE_WORK_LOG",
            "staffId": staff_id,
            "bookingId": booking_id,
        }))
        .await;
    relay(reply)
}

async fn check_out(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(booking_id): Path<i64>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_CHECK_OUT",
            "staffId": staff_id,
            "bookingId": booking_id,
        }))
        .await;
    relay(reply)
}

async fn get_performance(State(state): State<AppState>, user: ActiveUser) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_GET_PERFORMANCE",
            "staffId": staff_id,
        }))
        .await;
    relay(reply)
}

async fn get_reviews(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<Pagination>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_GET_REVIEWS",
            "staffId": staff_id,
            "query": query,
        }))
        .await;
    relay(reply)
}

async fn get_monthly_stats(
    State(state): State<AppState>,
    user: ActiveUser,
    Query(query): Query<MonthlyStatsQuery>,
) -> ApiResult {
    let staff_id = user.require_staff()?;
    let reply = state
        .registry
        .client(Service::Staff)
        .send(json!({
            "type": "STAFF_GET_MONTHLY_STATS",
            "staffId": staff_id,
            "query": query,
        }))
        .await;
    relay(reply)
}
