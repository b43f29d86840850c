use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod models;
mod repositories;
mod routes;
mod scoring;
mod state;

use auth::{
    AuthState,
    cookies::CookieConfig,
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool, run_migrations},
};
use tokio::net::TcpListener;

use crate::{config::ServerConfig, repositories::IdeaRepository, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let auth_state = AuthState {
        jwt_service,
        user_repository: UserRepository::new(pool.clone()),
        redis_pool,
        rate_limiter: RateLimiter::new(RateLimiterConfig::from_env()),
        cookie_config: CookieConfig::from_env(),
    };

    let app_state = AppState {
        db_pool: pool.clone(),
        idea_repository: IdeaRepository::new(pool),
        auth: auth_state,
    };

    let app = routes::create_router(app_state)
        .layer(server_config.cors_layer())
        .layer(TraceLayer::new_for_http());

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
