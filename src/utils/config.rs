use dotenv::dotenv;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

const DEFAULT_DATABASE_NAME: &str = "pets";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be a valid port number, got: {1}")]
    InvalidPort(&'static str, String),

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// When unset the service keeps pets in memory only.
    pub database_url: Option<String>,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    /// `RUST_LOG`-style directives handed to the log subscriber.
    pub log_filter: String,
}

impl AppConfig {

    /// Loads `.env` once and caches the resulting configuration.
    pub fn global() -> Result<&'static AppConfig, ConfigError> {
        if let Some(config) = CONFIG.get() {
            return Ok(config);
        }
        dotenv().ok();
        let config = Self::from_env()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let database_name = match lookup("DATABASE_NAME") {
            Some(name) if name.trim().is_empty() => return Err(ConfigError::Empty("DATABASE_NAME")),
            Some(name) => name.trim().to_string(),
            None => DEFAULT_DATABASE_NAME.to_string(),
        };

        let host = lookup("HOST")
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort("PORT", raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let log_filter = lookup("RUST_LOG")
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(AppConfig {
            database_url,
            database_name,
            host,
            port,
            log_filter,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
