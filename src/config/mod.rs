// Configuration module
//
// The whole deployment is described by one YAML file. `${VAR_NAME}`
// references are substituted from the environment before parsing, then the
// result is validated once and shared read-only for the process lifetime.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub mod access;
pub mod origin;
pub mod server;
pub mod transform;

pub use access::{AccessConfig, RefererConfig};
pub use origin::OriginConfig;
pub use server::ServerConfig;
pub use transform::{PolicyKind, TransformConfig};

use crate::cache::CacheConfig;
use crate::logging::LoggingConfig;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub origin: OriginConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Config with defaults everywhere except the origin account name
    pub fn for_cloud(cloud_name: impl Into<String>) -> Self {
        Self {
            server: ServerConfig::default(),
            origin: OriginConfig::for_cloud(cloud_name),
            transform: TransformConfig::default(),
            access: AccessConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        let substituted = substitute_env_vars(yaml)?;
        serde_yaml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load, substitute and validate a config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_with_env(&yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin.validate().map_err(ConfigError::Validation)?;
        self.transform.validate().map_err(ConfigError::Validation)?;
        self.access.validate().map_err(ConfigError::Validation)?;
        self.cache.validate().map_err(ConfigError::Validation)?;

        if self.server.threads == 0 {
            return Err(ConfigError::Validation(
                "server.threads must be greater than 0".to_string(),
            ));
        }
        for path in [&self.server.health_path, &self.server.metrics_path]
            .into_iter()
            .flatten()
        {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "endpoint path '{}' must start with '/'",
                    path
                )));
            }
        }
        if self.server.health_path.is_some() && self.server.health_path == self.server.metrics_path
        {
            return Err(ConfigError::Validation(
                "server.health_path and server.metrics_path must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether responses vary on `Referer` as well as `Accept`
    pub fn referer_policy_enabled(&self) -> bool {
        self.access.referer.enabled
    }
}

/// Replace `${VAR_NAME}` with environment variable values
///
/// Every referenced variable must be set; the first missing one is reported.
fn substitute_env_vars(yaml: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    for caps in re.captures_iter(yaml) {
        let var_name = &caps[1];
        if std::env::var(var_name).is_err() {
            return Err(ConfigError::MissingEnvVar(var_name.to_string()));
        }
    }

    let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    Ok(substituted.into_owned())
}
