//! Runtime configuration loaded from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::device::client::DEFAULT_API_ENDPOINT;

/// Environment variable prefix, e.g. `ECHO_RELAY_API_ENDPOINT`
pub const ENV_PREFIX: &str = "ECHO_RELAY";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Port the trigger endpoint listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the device-management API
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Timeout for each device API request in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Static bearer token; the metadata server is used when unset
    #[serde(default)]
    pub access_token: Option<String>,

    /// Base URL of the instance metadata server
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_metadata_endpoint() -> String {
    "http://metadata.google.internal".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            port: default_port(),
            api_endpoint: default_api_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            access_token: None,
            metadata_endpoint: default_metadata_endpoint(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from `ECHO_RELAY_*` variables
    ///
    /// The hosting platform's `PORT` variable takes precedence over `ECHO_RELAY_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Self::environment(), std::env::var("PORT").ok())
    }

    /// The `ECHO_RELAY_*` environment source, reading the process environment
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).try_parsing(true)
    }

    fn load(environment: Environment, platform_port: Option<String>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(environment)
            .set_override_option("port", platform_port)?
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
