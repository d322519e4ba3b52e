//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MEMBERSHIP_UPGRADE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use membership_upgrade::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server listening on {}", config.server.listen);
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::{DatabaseConfig, MemoryConfig};
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Listener, environment and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; without it the service keeps state in memory
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Seed for the in-memory stores; ignored when a database is configured
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Payment configuration (Xendit)
    #[serde(default)]
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MEMBERSHIP_UPGRADE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MEMBERSHIP_UPGRADE__SERVER__LISTEN=0.0.0.0:8080` -> `server.listen`
    /// - `MEMBERSHIP_UPGRADE__DATABASE__URL=...` -> `database.url = ...`
    /// - `MEMBERSHIP_UPGRADE__MEMORY__SEED_FILE=seeds/memory.json`
    /// - `MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_SECRET_KEY=...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MEMBERSHIP_UPGRADE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        match &self.database {
            Some(database) => database.validate()?,
            None if self.is_production() => {
                return Err(ValidationError::MissingRequired("DATABASE_URL"))
            }
            None => {}
        }
        self.payment.validate(self.is_production())?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "MEMBERSHIP_UPGRADE__DATABASE__URL",
        "MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_SECRET_KEY",
        "MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_CALLBACK_TOKEN",
        "MEMBERSHIP_UPGRADE__SERVER__LISTEN",
        "MEMBERSHIP_UPGRADE__SERVER__ENVIRONMENT",
        "MEMBERSHIP_UPGRADE__MEMORY__SEED_FILE",
    ];

    fn set_payment_env() {
        env::set_var(
            "MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_SECRET_KEY",
            "xnd_development_xxx",
        );
        env::set_var("MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_CALLBACK_TOKEN", "cb-token");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_without_database_uses_memory() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_payment_env();
        env::set_var(
            "MEMBERSHIP_UPGRADE__DATABASE__URL",
            "postgresql://test@localhost/test",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.map(|db| db.url),
            Some("postgresql://test@localhost/test".to_string())
        );
        assert_eq!(config.payment.xendit_callback_token, "cb-token");
        assert_eq!(config.payment.currency, "IDR");
    }

    #[test]
    fn test_custom_listen_address() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("MEMBERSHIP_UPGRADE__SERVER__LISTEN", "127.0.0.1:3000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.listen.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_seed_file_is_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("MEMBERSHIP_UPGRADE__MEMORY__SEED_FILE", "seeds/memory.json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.memory.seed_file.as_deref(),
            Some(std::path::Path::new("seeds/memory.json"))
        );
    }

    #[test]
    fn test_production_refuses_memory_storage() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("MEMBERSHIP_UPGRADE__SERVER__ENVIRONMENT", "production");
        set_payment_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.database.is_none());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        );
    }

    #[test]
    fn test_production_requires_payment_credentials() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("MEMBERSHIP_UPGRADE__SERVER__ENVIRONMENT", "production");
        env::set_var(
            "MEMBERSHIP_UPGRADE__DATABASE__URL",
            "postgresql://test@localhost/test",
        );
        let without = AppConfig::load().unwrap();
        set_payment_env();
        let with = AppConfig::load().unwrap();
        clear_env();

        assert!(without.is_production());
        assert_eq!(
            without.validate(),
            Err(ValidationError::MissingRequired("XENDIT_SECRET_KEY"))
        );
        assert!(with.validate().is_ok());
    }
}
