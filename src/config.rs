//! Runtime configuration
//!
//! Values come from the process environment. `main` loads an optional `.env`
//! file with `dotenvy` before calling [`Config::from_env`].

use std::env;

/// Settings shared by the server and the request handlers
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind (e.g. "0.0.0.0")
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Path of the embedded database file
    pub database_url: String,

    /// Secret expected in the `Authorization` header of admin requests.
    /// `None` disables the admin API entirely.
    pub admin_token: Option<String>,

    /// Marks the session cookie `Secure`
    pub cookie_secure: bool,

    /// Lifetime of a login session in hours
    pub session_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "data.db".to_string(),
            admin_token: None,
            cookie_secure: false,
            session_ttl_hours: 24 * 14,
        }
    }
}

impl Config {
    /// Reads configuration from environment variables, falling back to defaults
    ///
    /// # Environment Variables
    ///
    /// - `HOST` - Bind address (default: 0.0.0.0)
    /// - `PORT` - Server port number (default: 8080)
    /// - `DATABASE_URL` - Path to database file (default: "data.db")
    /// - `AUTHORIZATION` - Admin API secret (default: unset, admin API disabled)
    /// - `COOKIE_SECURE` - "true" or "1" to send the session cookie over HTTPS only
    /// - `SESSION_TTL_HOURS` - Session lifetime (default: 336)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            admin_token: env::var("AUTHORIZATION")
                .ok()
                .filter(|token| !token.is_empty()),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|value| matches!(value.as_str(), "true" | "1"))
                .unwrap_or(defaults.cookie_secure),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|hours| hours.parse().ok())
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(defaults.session_ttl_hours),
        }
    }
}
