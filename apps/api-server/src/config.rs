//! Application configuration loaded from environment variables.

use std::env;

use blogicum_infra::{DatabaseConfig, JwtConfig};

#[cfg(feature = "rate-limit")]
use blogicum_infra::RateLimitConfig;

/// Credentials of the staff account created at startup, if any.
#[derive(Debug, Clone)]
pub struct BootstrapStaff {
    pub username: String,
    pub password: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub bootstrap_staff: Option<BootstrapStaff>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
            bootstrap_staff: Self::parse_bootstrap_staff(),
        }
    }

    /// Both BOOTSTRAP_STAFF_USERNAME and BOOTSTRAP_STAFF_PASSWORD must be set.
    fn parse_bootstrap_staff() -> Option<BootstrapStaff> {
        let username = env::var("BOOTSTRAP_STAFF_USERNAME").ok()?;
        let password = env::var("BOOTSTRAP_STAFF_PASSWORD").ok()?;

        if username.trim().is_empty() || password.is_empty() {
            tracing::warn!("Ignoring empty bootstrap staff credentials");
            return None;
        }

        Some(BootstrapStaff {
            username: username.trim().to_string(),
            password,
        })
    }
}
