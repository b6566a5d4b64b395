//! Server configuration management.
//!
//! Configuration comes from CLI arguments with environment-variable
//! fallbacks and defaults:
//! - `--tcp-bind` / `RELIC_UPDATE_TCP_BIND`
//! - `--store` / `RELIC_UPDATE_STORE`
//! - `--client-version` / `RELIC_UPDATE_CLIENT_VERSION`
//!
//! # Example
//!
//! ```no_run
//! use relic_update::ServerConfig;
//!
//! let config = ServerConfig::from_args();
//! config.validate().expect("Invalid configuration");
//!
//! println!("Update server will bind to: {}", config.tcp_bind);
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "relic-update",
    about = "TCP asset-update server for legacy game clients",
    version
)]
pub struct ServerConfig {
    /// TCP bind address
    #[arg(long, env = "RELIC_UPDATE_TCP_BIND", default_value = "0.0.0.0:43594")]
    pub tcp_bind: SocketAddr,

    /// Path to the content store directory
    #[arg(long, env = "RELIC_UPDATE_STORE", default_value = "./store")]
    pub store: PathBuf,

    /// Client version accepted at handshake
    #[arg(long, env = "RELIC_UPDATE_CLIENT_VERSION", default_value_t = 435)]
    pub client_version: i32,
}

impl ServerConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store directory does not exist.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        if !self.store.is_dir() {
            return Err(ConfigError::StoreNotFound(self.store.display().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["relic-update"]).unwrap();
        assert_eq!(config.tcp_bind, "0.0.0.0:43594".parse().unwrap());
        assert_eq!(config.store, PathBuf::from("./store"));
        assert_eq!(config.client_version, 435);
    }

    #[test]
    fn test_cli_overrides() {
        let config = ServerConfig::try_parse_from([
            "relic-update",
            "--tcp-bind",
            "127.0.0.1:5555",
            "--store",
            "/srv/relic",
            "--client-version",
            "377",
        ])
        .unwrap();
        assert_eq!(config.tcp_bind, "127.0.0.1:5555".parse().unwrap());
        assert_eq!(config.store, PathBuf::from("/srv/relic"));
        assert_eq!(config.client_version, 377);
    }

    #[test]
    fn test_validate_requires_store_dir() {
        let dir = TempDir::new().unwrap();

        let mut config = ServerConfig::try_parse_from(["relic-update"]).unwrap();
        config.store = dir.path().to_path_buf();
        assert!(config.validate().is_ok());

        config.store = dir.path().join("missing");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let result = ServerConfig::try_parse_from(["relic-update", "--tcp-bind", "not-an-addr"]);
        assert!(result.is_err());
    }
}
