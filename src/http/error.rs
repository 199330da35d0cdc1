//! Translation from transport failures to HTTP responses.
//!
//! # Responsibilities
//! - Relay backend replies to HTTP callers unchanged
//! - Map the transport error taxonomy onto upstream-facing statuses
//! - Honor failure reports the backends embed in success payloads
//!
//! # Design Decisions
//! - Remote errors keep the backend's status and message (the gateway does
//!   not own the error vocabulary)
//! - Connection/timeout/protocol failures collapse to generic
//!   upstream-unavailable responses; details stay in the logs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::transport::TransportError;

/// An HTTP error response with a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::new(
            status,
            json!({ "statusCode": status.as_u16(), "message": message }),
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::message(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::message(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::message(StatusCode::FORBIDDEN, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Remote(wire) => {
                let status = wire
                    .http_status()
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::new(
                    status,
                    json!({
                        "statusCode": status.as_u16(),
                        "message": wire.message,
                        "code": wire.code,
                    }),
                )
            }
            TransportError::Timeout(_) => {
                ApiError::message(StatusCode::GATEWAY_TIMEOUT, "Upstream service timed out")
            }
            TransportError::Connection(_) => {
                ApiError::message(StatusCode::BAD_GATEWAY, "Upstream service unavailable")
            }
            TransportError::Protocol(_) => {
                ApiError::message(StatusCode::BAD_GATEWAY, "Invalid upstream response")
            }
        }
    }
}

/// Result type for route handlers.
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Relay a backend reply to the HTTP caller.
///
/// Some backends report failure inside the success channel as
/// `{statusCode: 4xx/5xx, message, error}`; those are surfaced with the
/// reported status instead of 200.
pub fn relay(reply: Result<Value, TransportError>) -> ApiResult {
    let data = reply.map_err(ApiError::from)?;
    if let Some(status) = embedded_status(&data) {
        return Err(ApiError::new(status, data));
    }
    Ok(Json(data))
}

fn embedded_status(data: &Value) -> Option<StatusCode> {
    let code = data.get("statusCode")?.as_u64()?;
    if (400..=599).contains(&code) {
        StatusCode::from_u16(code as u16).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::frame::{ErrorCode, WireError};
    use std::time::Duration;

    #[test]
    fn remote_error_keeps_backend_status() {
        let err = ApiError::from(TransportError::Remote(WireError {
            message: "User not found".into(),
            code: Some(ErrorCode::Number(404)),
        }));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body["message"], "User not found");
    }

    #[test]
    fn remote_error_with_text_code_is_bad_gateway() {
        let err = ApiError::from(TransportError::Remote(WireError {
            message: "boom".into(),
            code: Some(ErrorCode::Text("USER_NOT_FOUND".into())),
        }));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.body["code"], "USER_NOT_FOUND");
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = ApiError::from(TransportError::Timeout(Duration::from_secs(2)));
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn connection_maps_to_bad_gateway() {
        let err = ApiError::from(TransportError::Connection("down".into()));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn embedded_status_is_honored() {
        let reply = Ok(json!({ "statusCode": 422, "message": "invalid", "error": "Unprocessable" }));
        let err = relay(reply).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn plain_reply_passes_through() {
        let reply = Ok(json!({ "id": 7, "name": "Alice" }));
        let Json(body) = relay(reply).unwrap();
        assert_eq!(body["name"], "Alice");
    }

    #[test]
    fn success_statuscode_is_not_an_error() {
        let reply = Ok(json!({ "statusCode": 201, "id": 1 }));
        assert!(relay(reply).is_ok());
    }
}
