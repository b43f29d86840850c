//! JWT service for token generation, validation, and revocation
//!
//! Access and refresh tokens are HS256-signed with a shared secret. Refresh
//! tokens revoked at logout are remembered in Redis until they would have
//! expired anyway.

use anyhow::Result;
use common::cache::RedisPool;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

/// Default access token lifetime: one minute
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: u64 = 60;
/// Default refresh token lifetime: thirty days
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: u64 = 30 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Access token expiration time in seconds
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC secret (required)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 60)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 2592000)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRY);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REFRESH_TOKEN_EXPIRY);

        Ok(JwtConfig {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

fn revoked_key(token: &str) -> String {
    format!("revoked_token:{}", token)
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?;
        Ok(token)
    }

    fn issue(&self, user_id: Uuid, token_type: TokenType, lifetime: u64) -> Result<String> {
        let now = now_secs()?;
        self.sign(&Claims {
            sub: user_id,
            iat: now,
            exp: now.saturating_add(lifetime),
            token_type,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        self.issue(user_id, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        self.issue(user_id, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token's signature and expiry and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            anyhow::bail!("Token is not a {:?} token", expected);
        }
        Ok(claims)
    }

    /// Validate a token and require it to be an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validate a token and require it to be a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        self.validate_typed(token, TokenType::Refresh)
    }

    /// Check if a token has been revoked
    pub async fn is_token_revoked(&self, redis_pool: &RedisPool, token: &str) -> Result<bool> {
        let result = redis_pool.get(&revoked_key(token)).await?;
        Ok(result.is_some())
    }

    /// Revoke a token for the rest of its lifetime
    pub async fn revoke_token(
        &self,
        redis_pool: &RedisPool,
        token: &str,
        claims: &Claims,
    ) -> Result<()> {
        let remaining = claims.exp.saturating_sub(now_secs()?);
        redis_pool
            .set(&revoked_key(token), "1", Some(remaining))
            .await?;
        info!("Revoked refresh token for user {}", claims.sub);
        Ok(())
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}
