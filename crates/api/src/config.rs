//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where a sensible one exists.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: host address to bind to (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: request timeout (default: 30)
//! - `MEDIA_ROOT`: directory uploaded photos are written to (default: "media")
//! - `MEDIA_URL`: URL prefix photos are served under (default: "/media/")
//! - `API_PAGE_SIZE`: list page size; pagination is off when unset
//! - `ENFORCE_STATUS_TRANSITIONS`: reject appointment status changes the
//!   lifecycle does not allow (default: false)

use std::env;
use std::path::PathBuf;

use eyre::{Result, WrapErr, eyre};
use mfc_core::rules::TransitionPolicy;
use mfc_core::search::parse_flag;
use tracing::Level;

/// Configuration for the MFC API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use mfc_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    pub database_max_connections: u32,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Directory photo files live in
    pub media_root: PathBuf,

    /// Public prefix for photo URLs, always ending in `/`
    pub media_url: String,

    pub page_size: Option<u32>,

    pub enforce_status_transitions: bool,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT or DATABASE_MAX_CONNECTIONS value cannot be parsed
    /// - The API_PAGE_SIZE value is set but is not a positive integer
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .wrap_err("Invalid DATABASE_MAX_CONNECTIONS value")?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL").unwrap_or_default().to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        // Media settings
        let media_root = PathBuf::from(lookup("MEDIA_ROOT").unwrap_or_else(|| "media".to_string()));
        let mut media_url = lookup("MEDIA_URL").unwrap_or_else(|| "/media/".to_string());
        if !media_url.ends_with('/') {
            media_url.push('/');
        }

        let page_size = match lookup("API_PAGE_SIZE").filter(|s| !s.trim().is_empty()) {
            Some(raw) => {
                let size: u32 = raw.trim().parse().wrap_err("Invalid API_PAGE_SIZE value")?;
                if size == 0 {
                    return Err(eyre!("API_PAGE_SIZE must be greater than zero"));
                }
                Some(size)
            }
            None => None,
        };

        let enforce_status_transitions =
            parse_flag(lookup("ENFORCE_STATUS_TRANSITIONS").as_deref()).unwrap_or(false);

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
            media_root,
            media_url,
            page_size,
            enforce_status_transitions,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.enforce_status_transitions {
            TransitionPolicy::Enforced
        } else {
            TransitionPolicy::Permissive
        }
    }

    /// Route path the media directory is mounted at, without the trailing slash.
    pub fn media_mount(&self) -> &str {
        match self.media_url.trim_end_matches('/') {
            "" => "/media",
            mount => mount,
        }
    }
}
