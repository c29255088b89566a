use crate::error::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub auth: AuthConfig,
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub route: String,
    pub check_timeout_ms: u64,
    /// 0 evaluates checks on every request.
    pub periodic_interval_seconds: u64,
    pub manual_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Empty disables the bearer token middleware.
    pub bearer_token: String,
    pub reject_unauthenticated: bool,
    /// Empty disables the query parameter middleware.
    pub details_query_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChecksConfig {
    pub tcp_targets: Vec<String>,
    pub filesystem_paths: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            route: "/health".to_string(),
            check_timeout_ms: 5000,
            periodic_interval_seconds: 0,
            manual_start: false,
        }
    }
}

impl HealthConfig {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    pub fn periodic_interval(&self) -> Option<Duration> {
        (self.periodic_interval_seconds > 0)
            .then(|| Duration::from_secs(self.periodic_interval_seconds))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("checks.tcp_targets")
                .with_list_parse_key("checks.filesystem_paths"),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if !self.health.route.starts_with('/') {
            return Err(ConfigError::Message(
                "Health route must start with '/'".to_string(),
            ));
        }

        if self.health.check_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Check timeout must be greater than 0".to_string(),
            ));
        }

        if self.auth.reject_unauthenticated && self.auth.bearer_token.is_empty() {
            tracing::warn!("reject_unauthenticated has no effect without a bearer token");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }
}
