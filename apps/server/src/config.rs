//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

const DEV_JWT_SECRET: &str = "tally-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Address to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Upper bound of the connection pool
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    pub jwt_lifetime_secs: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            Some(_) => return Err(ConfigError::InvalidValue("JWT_SECRET".to_string())),
            None => {
                warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let config = ServerConfig {
            http_port: parse(&lookup, "TALLY_HTTP_PORT", "8080")?,
            bind_addr: parse(&lookup, "TALLY_BIND_ADDR", "0.0.0.0")?,
            database_path: lookup("TALLY_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/tally.db")),
            db_max_connections: parse(&lookup, "TALLY_DB_MAX_CONNECTIONS", "5")?,
            jwt_secret,
            jwt_lifetime_secs: parse(&lookup, "JWT_LIFETIME_SECS", "43200")?, // 12 hours
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("TALLY_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError> {
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("./data/tally.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_lifetime_secs, 43200);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TALLY_HTTP_PORT", "9000"),
            ("TALLY_BIND_ADDR", "127.0.0.1"),
            ("TALLY_DATABASE_PATH", "/tmp/shop.db"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.jwt_secret, "s3cret");
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("TALLY_HTTP_PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for TALLY_HTTP_PORT");

        assert!(load(&[("TALLY_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("JWT_LIFETIME_SECS", "-1")]).is_err());
        assert!(load(&[("JWT_SECRET", "  ")]).is_err());
    }
}
