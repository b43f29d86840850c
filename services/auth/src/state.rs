//! State shared by the authentication handlers and middleware

use common::cache::RedisPool;

use crate::{
    cookies::CookieConfig, jwt::JwtService, rate_limiter::RateLimiter,
    repositories::UserRepository,
};

/// Authentication state shared across handlers
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub redis_pool: RedisPool,
    pub rate_limiter: RateLimiter,
    pub cookie_config: CookieConfig,
}
