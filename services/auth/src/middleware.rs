//! Middleware for bearer token validation and authentication

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    error::AuthError,
    models::User,
    state::AuthState,
};

/// The authenticated caller, attached to the request by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Extract the bearer token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extract and validate the access token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let token = bearer_token(header)
        .ok_or_else(|| AuthError::unauthorized("Not authorized, no token."))?;

    let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
        warn!("Rejected access token: {}", e);
        AuthError::unauthorized("Not authorized, token failed.")
    })?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", claims.sub, e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| AuthError::unauthorized("User not found."))?;

    req.extensions_mut().insert(CurrentUser::from(&user));

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            error!("CurrentUser requested on a route without auth_middleware");
            AuthError::InternalServerError
        })
    }
}
