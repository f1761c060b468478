//! Process configuration.
//!
//! Flags mirror the environment variables so the server can be driven either
//! way; the signing secret is required and validated before anything binds.

use anyhow::ensure;
use clap::Parser;

/// Command-line / environment configuration for the API server.
#[derive(Parser, Debug, Clone)]
#[command(name = "moneymanager", about = "Personal finance record keeper API")]
pub struct Config {
    /// API server port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Host address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Environment name: development | production
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Path to the SQLite database file
    #[arg(long = "db-path", env = "DB_PATH", default_value = "moneymanager.db")]
    pub db_path: String,

    /// Signing secret for access and refresh tokens
    #[arg(long = "secret-key", env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Access token lifetime in minutes
    #[arg(long = "access-ttl-mins", env = "ACCESS_TTL_MINS", default_value_t = 60)]
    pub access_ttl_mins: i64,

    /// Refresh token lifetime in days
    #[arg(long = "refresh-ttl-days", env = "REFRESH_TTL_DAYS", default_value_t = 10)]
    pub refresh_ttl_days: i64,
}

impl Config {
    /// Startup validation. A bad signing secret aborts the process here,
    /// never at first-request time.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.secret_key.trim().is_empty(),
            "SECRET_KEY must be set and non-empty"
        );
        ensure!(
            self.secret_key.len() >= 32,
            "SECRET_KEY must be at least 32 bytes"
        );
        ensure!(self.access_ttl_mins > 0, "access TTL must be positive");
        ensure!(self.refresh_ttl_days > 0, "refresh TTL must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            port: 8080,
            host: "localhost".to_string(),
            environment: "development".to_string(),
            db_path: "test.db".to_string(),
            secret_key: "an-acceptably-long-signing-secret-key".to_string(),
            access_ttl_mins: 60,
            refresh_ttl_days: 10,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = base_config();
        config.secret_key = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = base_config();
        config.secret_key = "too-short".to_string();
        assert!(config.validate().is_err());
    }
}
