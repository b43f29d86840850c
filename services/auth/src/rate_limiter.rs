//! Rate limiter for preventing brute force login attempts

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed per window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,       // 5 minutes
            ban_duration_seconds: 900, // 15 minutes
        }
    }
}

impl RateLimiterConfig {
    /// Create a new RateLimiterConfig from environment variables
    ///
    /// # Environment Variables
    /// - `LOGIN_MAX_ATTEMPTS` (default: 5)
    /// - `LOGIN_WINDOW_SECONDS` (default: 300)
    /// - `LOGIN_BAN_SECONDS` (default: 900)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str| std::env::var(name).ok().and_then(|v| v.parse().ok());

        Self {
            max_attempts: read("LOGIN_MAX_ATTEMPTS")
                .and_then(|v: u64| u32::try_from(v).ok())
                .unwrap_or(defaults.max_attempts),
            window_seconds: read("LOGIN_WINDOW_SECONDS").unwrap_or(defaults.window_seconds),
            ban_duration_seconds: read("LOGIN_BAN_SECONDS").unwrap_or(defaults.ban_duration_seconds),
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    attempts: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    /// Neither the window nor a ban still applies at `now`
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) >= window
            && self.ban_expires.is_none_or(|ban_expires| now >= ban_expires)
    }
}

#[derive(Debug)]
struct Attempts {
    entries: HashMap<String, RateLimiterEntry>,
    last_sweep: Instant,
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    attempts: Arc<Mutex<Attempts>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            attempts: Arc::new(Mutex::new(Attempts {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut state = self.attempts.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        // Drop keys nobody is being limited on, at most once per window
        if now.duration_since(state.last_sweep) >= window {
            state.entries.retain(|_, entry| !entry.is_stale(now, window));
            state.last_sweep = now;
        }

        let entry = state.entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            window_start: now,
            ban_expires: None,
        });

        if let Some(ban_expires) = entry.ban_expires {
            if now < ban_expires {
                return false;
            }
            entry.attempts = 0;
            entry.window_start = now;
            entry.ban_expires = None;
        }

        if now.duration_since(entry.window_start) >= window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.attempts += 1;
        true
    }

    /// Forget all attempts for `key`
    pub async fn reset(&self, key: &str) {
        self.attempts.lock().await.entries.remove(key);
    }
}
