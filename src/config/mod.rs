use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use sqlx::sqlite::SqliteConnectOptions;

/// Placeholder signing key; startup warns while it is still in use.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// How long a writer waits for the SQLite lock before failing.
    pub busy_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        Ok(SqliteConnectOptions::from_str(&self.url)?
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs)))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_duration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: String,
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite://courseboard.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.busy_timeout_secs", 5)?
            .set_default("auth.jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("auth.jwt_issuer", "courseboard")?
            .set_default("auth.token_duration_minutes", 30)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.max_file_size", 10 * 1024 * 1024)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with COURSEBOARD__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("COURSEBOARD").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite://courseboard.db?mode=rwc".to_string(),
                max_connections: 10,
                busy_timeout_secs: 5,
            },
            auth: AuthConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_issuer: "courseboard".to_string(),
                token_duration_minutes: 30,
            },
            uploads: UploadConfig::default(),
        }
    }
}
