//! Configuration module for the collective backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared admin password checked by the login route
    pub admin_password: Option<String>,
    /// HMAC key used to sign and verify admin tokens
    pub admin_secret: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory that receives uploaded images, served under /uploads
    pub upload_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log line format
    pub log_format: LogFormat,
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_password = env::var("COLLECTIVE_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty());

        let admin_secret = env::var("COLLECTIVE_ADMIN_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let db_path = env::var("COLLECTIVE_DB_PATH")
            .unwrap_or_else(|_| "./data/collective.sqlite".to_string())
            .into();

        let upload_dir = env::var("COLLECTIVE_UPLOAD_DIR")
            .unwrap_or_else(|_| "./public/uploads".to_string())
            .into();

        let bind_addr = env::var("COLLECTIVE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid COLLECTIVE_BIND_ADDR format");

        let log_level = env::var("COLLECTIVE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("COLLECTIVE_LOG_FORMAT")
            .map(|f| LogFormat::parse(&f))
            .unwrap_or_default();

        Self {
            admin_password,
            admin_secret,
            db_path,
            upload_dir,
            bind_addr,
            log_level,
            log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("COLLECTIVE_ADMIN_PASSWORD");
        env::remove_var("COLLECTIVE_ADMIN_SECRET");
        env::remove_var("COLLECTIVE_DB_PATH");
        env::remove_var("COLLECTIVE_UPLOAD_DIR");
        env::remove_var("COLLECTIVE_BIND_ADDR");
        env::remove_var("COLLECTIVE_LOG_LEVEL");
        env::remove_var("COLLECTIVE_LOG_FORMAT");

        let config = Config::from_env();

        assert!(config.admin_password.is_none());
        assert!(config.admin_secret.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/collective.sqlite"));
        assert_eq!(config.upload_dir, PathBuf::from("./public/uploads"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }
}
