//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Default match length in seconds when a room is created without one
const DEFAULT_ROOM_DURATION: u32 = 120;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (comma-separated); unset means any
    pub client_origin: Option<String>,
    /// Fallback match duration in seconds
    pub default_room_duration: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // hosting platforms provide PORT; SERVER_ADDR is the local override
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let default_room_duration = match env::var("DEFAULT_ROOM_DURATION") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidDuration(raw))?,
            Err(_) => DEFAULT_ROOM_DURATION,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origin: env::var("CLIENT_ORIGIN").ok(),
            default_room_duration,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid DEFAULT_ROOM_DURATION value: {0}")]
    InvalidDuration(String),
}
