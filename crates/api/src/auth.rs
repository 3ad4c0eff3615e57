//! Caller identity extracted from headers set by the authentication layer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::OwnerId;
use domain::Caller;

use crate::error::ApiError;

/// Header carrying the verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the user's role; `admin` grants the admin override.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The verified caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentCaller(pub Caller);

/// A verified caller holding admin rights.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller(pub Caller);

fn caller_from_parts(parts: &Parts) -> Result<Caller, ApiError> {
    let raw = parts
        .headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthenticated("Missing caller identity".to_string()))?;
    let id: OwnerId = raw
        .to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Invalid caller identity".to_string()))?;

    let is_admin = parts
        .headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("admin"));

    Ok(Caller { id, is_admin })
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts).map(CurrentCaller)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_parts(parts)?;
        if !caller.is_admin {
            tracing::debug!(caller_id = %caller.id, "admin route refused");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminCaller(caller))
    }
}
