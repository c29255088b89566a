pub mod settings;

pub use settings::{AppConfig, AuthConfig, ChecksConfig, HealthConfig, ServerConfig};
