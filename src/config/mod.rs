//! Configuration module for the CommunityConnect backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Longest session lifetime accepted from the environment (ten years).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Lifetime of a login session in hours
    pub session_ttl_hours: i64,
}

/// A malformed configuration value.
#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} value {:?}: {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("CC_DB_PATH")
            .unwrap_or_else(|_| "./data/community.sqlite".to_string())
            .into();

        let bind_addr = parse_var("CC_BIND_ADDR", "127.0.0.1:8080")?;

        let log_level = env::var("CC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = match env::var("CC_LOG_FORMAT").as_deref() {
            Err(_) | Ok("text") => false,
            Ok("json") => true,
            Ok(other) => {
                return Err(ConfigError {
                    key: "CC_LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected text or json".to_string(),
                })
            }
        };

        let session_ttl_hours: i64 = parse_var("CC_SESSION_TTL_HOURS", "168")?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(ConfigError {
                key: "CC_SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
                reason: format!("must be between 1 and {}", MAX_SESSION_TTL_HOURS),
            });
        }

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            session_ttl_hours,
        })
    }
}

fn parse_var<T>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
        value,
    })
}
