//! # Configuration Management
//!
//! Configuration comes from the environment ("12-factor app"), with an
//! optional `.env` file for local development.
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 4000)
//! - `DATABASE_URL`: SQLite database connection string
//! - `STATIC_DIR`: Directory served under `/static`
//! - `SESSION_LIFETIME_HOURS`: Session lifetime in hours (default: 12)
//! - `SECURE_COOKIES`: Mark session and CSRF cookies `Secure` (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Upper bound on handling a single request (default: 10)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Application configuration
///
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    pub host: String,

    /// Server port number
    pub port: u16,

    /// SQLite database connection URL
    /// Format: "sqlite:filename.db?mode=rwc", or "sqlite::memory:" for a
    /// throwaway database.
    pub database_url: String,

    /// Directory holding CSS, JavaScript and images served under `/static`
    pub static_dir: String,

    /// How long a session stays valid without activity
    ///
    /// This is an idle timeout: every request that touches the session pushes
    /// its expiry forward, so an active session never hits a fixed deadline.
    pub session_lifetime_hours: i64,

    /// Whether session and CSRF cookies carry the `Secure` attribute.
    /// Browsers only send `Secure` cookies over HTTPS, so turn this off when
    /// running behind plain HTTP in development.
    pub secure_cookies: bool,

    /// Request handling timeout, enforced outside the middleware chain
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            database_url: "sqlite:snippetbox.db?mode=rwc".to_string(),
            static_dir: "./ui/static".to_string(),
            session_lifetime_hours: 12,
            secure_cookies: true,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to [`Config::default`]. A variable that is set
    /// but cannot be parsed is a startup error rather than a silent default.
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=4000
    /// DATABASE_URL=sqlite:snippetbox.db?mode=rwc
    /// SECURE_COOKIES=false
    /// ```
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            session_lifetime_hours: parse_var(
                "SESSION_LIFETIME_HOURS",
                defaults.session_lifetime_hours,
            )?,
            secure_cookies: parse_var("SECURE_COOKIES", defaults.secure_cookies)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
        })
    }

    /// Get the socket address to bind the server to, e.g. "127.0.0.1:4000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "0.0.0.0".to_string(),
            port: 8443,
            ..Config::default()
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8443");
    }

    #[test]
    fn test_default_session_idle_timeout() {
        assert_eq!(Config::default().session_lifetime_hours, 12);
    }

    #[test]
    fn test_parse_var_falls_back_when_unset() {
        let port: u16 = parse_var("SNIPPETBOX_TEST_UNSET_PORT", 4000).unwrap();
        assert_eq!(port, 4000);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("SNIPPETBOX_TEST_BAD_BOOL", "maybe");
        let parsed: Result<bool> = parse_var("SNIPPETBOX_TEST_BAD_BOOL", true);
        env::remove_var("SNIPPETBOX_TEST_BAD_BOOL");
        assert!(parsed.is_err());
    }
}
