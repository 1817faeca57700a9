//! Configuration management
//!
//! Layered: built-in defaults, then `config/default` and `config/<env>`
//! files, then environment variables (`__` separator). A missing required
//! setting (notably `auth.token_secret`) is a fatal startup error.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// Symmetric signing secret. Production secrets must be at least 256
    /// bits (32 bytes); there is no default.
    pub token_secret: String,
    pub session_ttl_secs: i64,
    pub cookie_name: String,
    /// When set, enforcement gates redirect here instead of answering with a
    /// bare 401/403.
    pub login_url: Option<String>,
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "gatekit-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("auth.session_ttl_secs", constants::DEFAULT_SESSION_TTL_SECS)?
            .set_default("auth.cookie_name", constants::DEFAULT_SESSION_COOKIE)?
            .set_default(
                "auth.sweep_interval_secs",
                constants::DEFAULT_SWEEP_INTERVAL_SECS as i64,
            )?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_settings_are_a_config_error() {
        // No sources at all: the required fields (token secret, database
        // url) cannot deserialize.
        let err = Config::builder()
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Config(_)));
    }
}
