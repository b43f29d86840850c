//! Authentication service routes, mounted at `/api/auth`

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    cookies::REFRESH_COOKIE,
    error::{AuthError, AuthResult},
    models::{NewUser, PublicUser, User, normalize_email},
    state::AuthState,
    validation::{validate_email, validate_name, validate_password},
};

/// Request for user registration
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request for user login
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for register and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub message: String,
    pub access_token: String,
    pub user: PublicUser,
}

/// Response for token refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub user: PublicUser,
}

/// Create the router for the authentication endpoints
pub fn create_router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh_token))
        .with_state(state)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Issue an access token and attach a fresh refresh cookie
fn start_session(
    state: &AuthState,
    jar: CookieJar,
    user: &User,
) -> AuthResult<(CookieJar, String)> {
    let access_token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user.id)
        .map_err(|e| {
            error!("Failed to generate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    let cookie = state
        .cookie_config
        .refresh_cookie(&refresh_token, state.jwt_service.refresh_token_expiry());

    Ok((jar.add(cookie), access_token))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(name), Some(email), Some(password)) = (
        non_blank(payload.name),
        non_blank(payload.email),
        non_blank(payload.password),
    ) else {
        return Err(AuthError::bad_request("All fields are required."));
    };

    let email = normalize_email(&email);
    validate_name(&name).map_err(AuthError::BadRequest)?;
    validate_email(&email).map_err(AuthError::BadRequest)?;
    validate_password(&password).map_err(AuthError::BadRequest)?;

    info!("Registration attempt for {}", email);

    if state.user_repository.find_by_email(&email).await?.is_some() {
        return Err(AuthError::bad_request("User already exists."));
    }

    let user = state
        .user_repository
        .create(&NewUser {
            name,
            email,
            password,
        })
        .await?;

    let (jar, access_token) = start_session(&state, jar, &user)?;

    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            message: "User registered successfully.".to_string(),
            access_token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (non_blank(payload.email), payload.password)
    else {
        return Err(AuthError::bad_request("Email and password are required."));
    };
    if password.is_empty() {
        return Err(AuthError::bad_request("Email and password are required."));
    }

    let email = normalize_email(&email);

    if !state.rate_limiter.is_allowed(&email).await {
        return Err(AuthError::TooManyRequests(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let invalid = || AuthError::unauthorized("Invalid email or password.");

    let Some(user) = state.user_repository.find_by_email(&email).await? else {
        warn!("Login for unknown email {}", email);
        return Err(invalid());
    };

    // Registration stores the trimmed password
    if !state
        .user_repository
        .verify_password(&user, password.trim())?
    {
        warn!("Invalid password for user {}", user.id);
        return Err(invalid());
    }

    state.rate_limiter.reset(&email).await;

    let (jar, access_token) = start_session(&state, jar, &user)?;

    info!("User {} logged in", user.id);

    Ok((
        StatusCode::OK,
        jar,
        Json(SessionResponse {
            message: "Login successful.".to_string(),
            access_token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// Logout endpoint: revoke the refresh token (if any) and clear the cookie
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        let token = cookie.value();
        if let Ok(claims) = state.jwt_service.validate_refresh_token(token) {
            if let Err(e) = state
                .jwt_service
                .revoke_token(&state.redis_pool, token, &claims)
                .await
            {
                warn!("Failed to revoke refresh token: {}", e);
            }
            info!("User {} logged out", claims.sub);
        }
    }

    let jar = jar.add(state.cookie_config.clear_refresh_cookie());

    (
        StatusCode::OK,
        jar,
        Json(serde_json::json!({"message": "Logged out successfully."})),
    )
}

/// Refresh token endpoint: trade the refresh cookie for a new access token
pub async fn refresh_token(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> AuthResult<impl IntoResponse> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::unauthorized("No refresh token provided."))?;

    let invalid = || AuthError::unauthorized("Invalid refresh token.");

    let claims = state
        .jwt_service
        .validate_refresh_token(&token)
        .map_err(|e| {
            warn!("Rejected refresh token: {}", e);
            invalid()
        })?;

    let revoked = state
        .jwt_service
        .is_token_revoked(&state.redis_pool, &token)
        .await
        .map_err(|e| {
            error!("Failed to check refresh token revocation: {}", e);
            AuthError::InternalServerError
        })?;

    if revoked {
        warn!("Revoked refresh token presented for user {}", claims.sub);
        return Err(invalid());
    }

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AuthError::unauthorized("User not found."))?;

    let access_token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    Ok((
        StatusCode::OK,
        Json(RefreshResponse {
            access_token,
            user: PublicUser::from(&user),
        }),
    ))
}
