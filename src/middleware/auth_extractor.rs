// src/middleware/auth_extractor.rs - caller identity from a bearer JWT
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::debug;

use crate::AppState;
use crate::error::BlogError;
use crate::models::user::JwtClaims;

/// The user making the request. Use `Option<AuthenticatedUser>` for
/// endpoints that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl FromRequest for AuthenticatedUser {
    type Error = BlogError;
    type Future = Ready<Result<AuthenticatedUser, BlogError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, BlogError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| BlogError::Unauthorized("missing Authorization header".into()))?
        .to_str()
        .map_err(|_| BlogError::Unauthorized("invalid header format".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| BlogError::Unauthorized("expected a Bearer token".into()))?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| BlogError::Storage("application state is not configured".into()))?;

    let user_id = user_id_from_token(token, &state.jwt_secret)?;
    debug!("authenticated user {}", user_id);
    Ok(AuthenticatedUser { user_id })
}

/// Verifies an HS256 token and returns the user id in `sub`.
pub fn user_id_from_token(token: &str, secret: &str) -> Result<i64, BlogError> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| BlogError::Unauthorized(format!("invalid token: {}", e)))?;

    data.claims
        .sub
        .parse::<i64>()
        .map_err(|_| BlogError::Unauthorized("token subject is not a user id".into()))
}
