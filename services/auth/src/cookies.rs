//! Refresh token cookie handling

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the httpOnly cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Cookie attributes that depend on the deployment environment
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Production deployments serve the SPA cross-site over HTTPS
    pub production: bool,
}

impl CookieConfig {
    /// Create a new CookieConfig from environment variables
    ///
    /// # Environment Variables
    /// - `APP_ENV`: `production` enables `Secure` and `SameSite=None`
    pub fn from_env() -> Self {
        let production = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Self { production }
    }

    fn base(&self, value: String) -> Cookie<'static> {
        let same_site = if self.production {
            SameSite::None
        } else {
            SameSite::Lax
        };

        Cookie::build((REFRESH_COOKIE, value))
            .http_only(true)
            .secure(self.production)
            .same_site(same_site)
            .path("/")
            .build()
    }

    /// Cookie holding a freshly issued refresh token
    pub fn refresh_cookie(&self, token: &str, max_age_secs: u64) -> Cookie<'static> {
        let mut cookie = self.base(token.to_string());
        cookie.set_max_age(time::Duration::seconds(
            i64::try_from(max_age_secs).unwrap_or(i64::MAX),
        ));
        cookie
    }

    /// Expired cookie that makes the browser drop the refresh token
    pub fn clear_refresh_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_cookie_attributes() {
        let config = CookieConfig { production: false };
        let cookie = config.refresh_cookie("abc", 2_592_000);

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn test_production_cookie_is_cross_site() {
        let config = CookieConfig { production: true };
        let cookie = config.refresh_cookie("abc", 60);

        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let config = CookieConfig { production: false };
        let cookie = config.clear_refresh_cookie();
        let header = cookie.to_string();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert!(header.starts_with("refreshToken=;"));
        assert!(header.contains("HttpOnly"));
    }
}
