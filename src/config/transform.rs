//! Transformation policy configuration.
//!
//! Exactly one policy is active per deployment:
//! - `size`: a single symbolic size parameter, checked against a whitelist
//! - `dimensions`: free-form width/height parameters forwarded verbatim

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALLOWED_SIZES, DEFAULT_FIT_TOKEN, DEFAULT_HEIGHT_PARAM, DEFAULT_QUALITY_TOKEN,
    DEFAULT_SIZE_PARAM, DEFAULT_WIDTH_PARAM,
};

/// Which resize policy the translator applies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Size,
    Dimensions,
}

fn default_fit() -> String {
    DEFAULT_FIT_TOKEN.to_string()
}

fn default_quality() -> String {
    DEFAULT_QUALITY_TOKEN.to_string()
}

fn default_size_param() -> String {
    DEFAULT_SIZE_PARAM.to_string()
}

fn default_allowed_sizes() -> Vec<String> {
    DEFAULT_ALLOWED_SIZES.iter().map(|s| s.to_string()).collect()
}

fn default_width_param() -> String {
    DEFAULT_WIDTH_PARAM.to_string()
}

fn default_height_param() -> String {
    DEFAULT_HEIGHT_PARAM.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub policy: PolicyKind,
    /// First fixed directive token (content fit mode)
    #[serde(default = "default_fit")]
    pub fit: String,
    /// Second fixed directive token (automatic quality)
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_size_param")]
    pub size_param: String,
    /// Exact-match whitelist used by the size policy
    #[serde(default = "default_allowed_sizes")]
    pub allowed_sizes: Vec<String>,
    #[serde(default = "default_width_param")]
    pub width_param: String,
    #[serde(default = "default_height_param")]
    pub height_param: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            fit: default_fit(),
            quality: default_quality(),
            size_param: default_size_param(),
            allowed_sizes: default_allowed_sizes(),
            width_param: default_width_param(),
            height_param: default_height_param(),
        }
    }
}

impl TransformConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.fit.is_empty() || self.quality.is_empty() {
            return Err("transform.fit and transform.quality cannot be empty".to_string());
        }
        for token in [&self.fit, &self.quality] {
            if token.contains([',', '/']) {
                return Err(format!(
                    "transform token '{}' cannot contain ',' or '/'",
                    token
                ));
            }
        }

        match self.policy {
            PolicyKind::Size => {
                if self.size_param.is_empty() {
                    return Err("transform.size_param cannot be empty".to_string());
                }
                if self.allowed_sizes.is_empty() {
                    return Err(
                        "transform.allowed_sizes cannot be empty when policy is 'size'".to_string(),
                    );
                }
                if let Some(bad) = self
                    .allowed_sizes
                    .iter()
                    .find(|s| s.is_empty() || s.contains([',', '/']))
                {
                    return Err(format!("transform.allowed_sizes entry '{}' is invalid", bad));
                }
            }
            PolicyKind::Dimensions => {
                if self.width_param.is_empty() || self.height_param.is_empty() {
                    return Err(
                        "transform.width_param and transform.height_param cannot be empty"
                            .to_string(),
                    );
                }
                if self.width_param == self.height_param {
                    return Err(
                        "transform.width_param and transform.height_param must differ".to_string(),
                    );
                }
            }
        }
        Ok(())
    }
}
