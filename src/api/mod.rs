//! Route tables for the gateway's HTTP surface.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → domain router (explicit (method, path) → handler table)
//!     → handler (decode body/query, pull caller ids from the token)
//!     → envelope ({type: ...} or {cmd: ...}, per backend convention)
//!     → registry.client(service).send(envelope)
//!     → relay (reply or translated error back to the caller)
//! ```
//!
//! # Design Decisions
//! - Envelope field names mirror the backend contracts exactly
//! - Handlers decode into typed bodies first; unknown extra fields ride
//!   along where the backend accepts open-ended payloads
//! - One shared relay helper instead of per-handler error plumbing

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod payment;
pub mod providers;
pub mod publics;
pub mod staffs;
pub mod users;

use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::server::AppState;

/// The gateway's full route table.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/staffs", staffs::router())
        .nest("/admin", admin::router())
        .nest("/payment", payment::router())
        .nest("/bookings", bookings::router())
        .nest("/providers", providers::router())
        .nest("/publics", publics::router())
}

/// List query parameters shared by most collection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Merge extra fields into an envelope object (the `{type, ...body}` shape
/// several backends expect).
pub(crate) fn with_fields(mut base: Value, extra: Value) -> Value {
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (key, value) in extra_obj {
            base_obj.insert(key.clone(), value.clone());
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pagination_defaults_match_contract() {
        let q: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.sort_by, "createdAt");

        let encoded = serde_json::to_value(&q).unwrap();
        assert_eq!(encoded["sortOrder"], "desc");
        assert!(encoded.get("search").is_none());
    }

    #[test]
    fn with_fields_flattens_body_into_envelope() {
        let envelope = with_fields(
            json!({ "type": "CHANGE_BANK_ACCOUNT", "userId": 1 }),
            json!({ "bankName": "ACB", "bankAccountNumber": "007" }),
        );
        assert_eq!(envelope["type"], "CHANGE_BANK_ACCOUNT");
        assert_eq!(envelope["userId"], 1);
        assert_eq!(envelope["bankName"], "ACB");
    }
}
