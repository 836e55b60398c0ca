//! Configuration module for the Farmstand backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Settings for the outbound email delivery API.
///
/// Notifications are enabled only when the full set of variables is present.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    /// Base URL of the email delivery HTTP API
    pub api_url: String,
    /// Auth token for the delivery API
    pub api_key: String,
    /// From address
    pub sender: String,
    /// Recipient for signup notifications
    pub notify_email: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Static bearer token for the admin API (auth disabled when unset)
    pub admin_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory holding the catalog seed files (produce.json, farms.json, faqs.json)
    pub data_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// CORS origin allowlist; None or "*" means permissive
    pub cors_origins: Option<Vec<String>>,
    /// Email notification settings, when fully configured
    pub email: Option<EmailSettings>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_key = env::var("FARMSTAND_ADMIN_KEY").ok();

        let db_path = env::var("FARMSTAND_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let data_dir = env::var("FARMSTAND_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let bind_addr = env::var("FARMSTAND_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid FARMSTAND_BIND_ADDR format");

        let log_level = env::var("FARMSTAND_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("FARMSTAND_CORS_ORIGINS")
            .ok()
            .filter(|v| !v.trim().is_empty() && v.trim() != "*")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            });

        let email = match (
            env::var("FARMSTAND_EMAIL_API_URL"),
            env::var("FARMSTAND_EMAIL_API_KEY"),
            env::var("FARMSTAND_EMAIL_SENDER"),
            env::var("FARMSTAND_NOTIFY_EMAIL"),
        ) {
            (Ok(api_url), Ok(api_key), Ok(sender), Ok(notify_email)) => Some(EmailSettings {
                api_url,
                api_key,
                sender,
                notify_email,
            }),
            _ => None,
        };

        Self {
            admin_key,
            db_path,
            data_dir,
            bind_addr,
            log_level,
            cors_origins,
            email,
        }
    }
}
