//! Request extractors: access token context, payment API key, client metadata.
//!
//! Access tokens are HS256 JWTs minted by the auth service; the gateway only
//! verifies and reads them. Full permission checks stay with the backends;
//! handlers pull the ids they need into envelopes from [`ActiveUser`].

use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<i64>,
    pub role_name: String,
    pub exp: u64,
}

/// Verify and decode one bearer token.
pub fn decode_access_token(token: &str, secret: &str) -> Result<AccessTokenPayload, ApiError> {
    decode::<AccessTokenPayload>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::unauthorized("Error.InvalidAccessToken"))
}

/// The authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct ActiveUser(pub AccessTokenPayload);

impl ActiveUser {
    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }

    pub fn require_customer(&self) -> Result<i64, ApiError> {
        self.0
            .customer_id
            .ok_or_else(|| ApiError::forbidden("Error.NotACustomer"))
    }

    pub fn require_staff(&self) -> Result<i64, ApiError> {
        self.0
            .staff_id
            .ok_or_else(|| ApiError::forbidden("Error.NotAStaffMember"))
    }

    pub fn require_provider(&self) -> Result<i64, ApiError> {
        self.0
            .provider_id
            .ok_or_else(|| ApiError::forbidden("Error.NotAProvider"))
    }

    pub fn require_role(&self, role: &str) -> Result<(), ApiError> {
        if self.0.role_name == role {
            Ok(())
        } else {
            Err(ApiError::forbidden("Error.InsufficientRole"))
        }
    }
}

impl<S> FromRequestParts<S> for ActiveUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Error.MissingAccessToken"))?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        let claims = decode_access_token(token, &app.config.auth.access_token_secret)?;
        Ok(ActiveUser(claims))
    }
}

/// Guard for payment provider callbacks: the Authorization header must
/// carry the static key agreed with the provider.
#[derive(Debug, Clone, Copy)]
pub struct PaymentApiKey;

impl<S> FromRequestParts<S> for PaymentApiKey
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Error.MissingApiKey"))?;
        if header == app.config.auth.payment_api_key {
            Ok(PaymentApiKey)
        } else {
            Err(ApiError::unauthorized("Error.InvalidApiKey"))
        }
    }
}

/// Caller metadata some backends record alongside a login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    pub ip: String,
    pub user_agent: String,
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Prefer the proxy-provided address, fall back to the peer socket.
        let ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(ClientMeta { ip, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn claims(role: &str) -> AccessTokenPayload {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        AccessTokenPayload {
            user_id: 42,
            customer_id: Some(7),
            staff_id: None,
            provider_id: None,
            role_name: role.to_string(),
            exp,
        }
    }

    fn mint(claims: &AccessTokenPayload, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn token_round_trips() {
        let token = mint(&claims("CUSTOMER"), "secret");
        let decoded = decode_access_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.customer_id, Some(7));
        assert_eq!(decoded.role_name, "CUSTOMER");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint(&claims("CUSTOMER"), "secret");
        let err = decode_access_token(&token, "other").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims("CUSTOMER");
        expired.exp = 1;
        let token = mint(&expired, "secret");
        assert!(decode_access_token(&token, "secret").is_err());
    }

    #[test]
    fn role_and_identity_requirements() {
        let user = ActiveUser(claims("ADMIN"));
        assert!(user.require_role("ADMIN").is_ok());
        assert!(user.require_role("CUSTOMER").is_err());
        assert_eq!(user.require_customer().unwrap(), 7);
        assert!(user.require_staff().is_err());
    }
}
