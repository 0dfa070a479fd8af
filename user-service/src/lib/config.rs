use std::env;
use std::path::PathBuf;

use auth::JwtError;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_upload_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_upload_max_bytes")]
    pub max_bytes: usize,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_ttl_minutes() -> i64 {
    auth::DEFAULT_ACCESS_TOKEN_TTL_MINUTES
}

fn default_upload_directory() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_upload_max_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: default_upload_directory(),
            max_bytes: default_upload_max_bytes(),
        }
    }
}

impl JwtConfig {
    /// Build the immutable signing settings shared by issuance and verification.
    ///
    /// # Errors
    /// * `EmptySecret` - No secret configured
    /// * `UnsupportedAlgorithm` - Algorithm is unknown or not HMAC based
    /// * `NonPositiveTtl` - TTL is zero or negative
    pub fn token_settings(&self) -> Result<TokenSettings, JwtError> {
        TokenSettings::from_algorithm_name(self.secret.as_bytes(), &self.algorithm)?
            .with_default_ttl(chrono::Duration::minutes(self.access_token_ttl_minutes))
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
