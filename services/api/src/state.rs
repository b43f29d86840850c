//! Application state shared across handlers

use auth::AuthState;
use sqlx::PgPool;

use crate::repositories::IdeaRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub idea_repository: IdeaRepository,
    pub auth: AuthState,
}
