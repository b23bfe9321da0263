//! Access policy configuration (hotlink protection).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessConfig {
    #[serde(default)]
    pub referer: RefererConfig,
}

/// Referer whitelist. Each origin is matched as a string prefix of the
/// `Referer` header, with and without a trailing `/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RefererConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl AccessConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.referer.enabled {
            return Ok(());
        }
        if self.referer.allowed_origins.is_empty() {
            return Err(
                "access.referer.allowed_origins cannot be empty when referer checks are enabled"
                    .to_string(),
            );
        }
        for origin in &self.referer.allowed_origins {
            if origin.trim().is_empty() {
                return Err("access.referer.allowed_origins contains an empty entry".to_string());
            }
        }
        Ok(())
    }
}
