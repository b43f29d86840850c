//! Server configuration

use anyhow::Result;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Browser origins allowed to call the API with credentials
    pub client_origins: Vec<String>,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST` (default: "0.0.0.0")
    /// - `PORT` (default: 5000)
    /// - `CLIENT_ORIGINS`: comma-separated origins (default: "http://localhost:3000")
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT {}: {}", port, e))?,
            Err(_) => 5000,
        };

        let client_origins = std::env::var("CLIENT_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            client_origins,
        })
    }

    /// Address to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// CORS policy for the configured client origins
    ///
    /// Credentials are allowed so the browser sends the refresh cookie.
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .client_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid client origin {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("PORT");
            std::env::remove_var("CLIENT_ORIGINS");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.client_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    #[serial]
    fn test_server_config_parses_origin_list() {
        unsafe {
            std::env::set_var("PORT", "8080");
            std::env::set_var(
                "CLIENT_ORIGINS",
                "https://letsbuild.dev/, http://localhost:5173 ,",
            );
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.client_origins,
            vec!["https://letsbuild.dev", "http://localhost:5173"]
        );

        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("CLIENT_ORIGINS");
        }
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_an_error() {
        unsafe {
            std::env::set_var("PORT", "eighty");
        }

        assert!(ServerConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("PORT");
        }
    }
}
