//! Authentication for the letsBuild backend
//!
//! Registration, login, logout and access-token refresh under `/api/auth`,
//! plus the [`middleware::auth_middleware`] layer that other services put in
//! front of their protected routes.

pub mod cookies;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use middleware::{CurrentUser, auth_middleware};
pub use state::AuthState;
