use std::env;

pub const DEFAULT_SESSION_COOKIE: &str = "sb-access-token";

/// Placeholder used when `SESSION_SECRET` is unset or empty. Tokens signed
/// with it are forgeable, so the server refuses to start with it.
pub const INSECURE_DEFAULT_SECRET: &str = "change-this-session-secret-in-production";

/// Settings for the signed session token and the cookie that carries it.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiry: i64,
    pub cookie_name: String,
    /// Adds the `Secure` attribute to issued cookies.
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("SESSION_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| INSECURE_DEFAULT_SECRET.to_string()),
            expiry: env::var("SESSION_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(28800), // 8 hours
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            cookie_secure: env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// True when no `SESSION_SECRET` was provided.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == INSECURE_DEFAULT_SECRET
    }
}
