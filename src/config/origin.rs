//! Transformation origin configuration.
//!
//! Describes where derived images are fetched from. The base of every origin
//! URL is `<base_url>/<cloud_name>/<resource_segment>`; the translator appends
//! the delivery segment, directives, version, namespace and file name.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FORMAT, DEFAULT_NAMESPACE, DEFAULT_ORIGIN_BASE_URL, DEFAULT_ORIGIN_TIMEOUT_SECS,
    DEFAULT_RESOURCE_SEGMENT, DEFAULT_UPLOAD_SEGMENT, DEFAULT_USER_AGENT, DEFAULT_VERSION_SEGMENT,
};

fn default_base_url() -> String {
    DEFAULT_ORIGIN_BASE_URL.to_string()
}

fn default_resource_segment() -> String {
    DEFAULT_RESOURCE_SEGMENT.to_string()
}

fn default_upload_segment() -> String {
    DEFAULT_UPLOAD_SEGMENT.to_string()
}

fn default_version_segment() -> String {
    DEFAULT_VERSION_SEGMENT.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_ORIGIN_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    /// CDN host including scheme (default: https://res.cloudinary.com)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Account name on the origin
    pub cloud_name: String,
    #[serde(default = "default_resource_segment")]
    pub resource_segment: String,
    #[serde(default = "default_upload_segment")]
    pub upload_segment: String,
    #[serde(default = "default_version_segment")]
    pub version_segment: String,
    /// Folder holding the source assets
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Output format extension requested for every image
    #[serde(default = "default_format")]
    pub format: String,
    /// Fixed User-Agent sent with every origin fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound for a single origin fetch (default: 30s)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl OriginConfig {
    /// Create an origin config for `cloud_name` with every other field defaulted
    pub fn for_cloud(cloud_name: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            cloud_name: cloud_name.into(),
            resource_segment: default_resource_segment(),
            upload_segment: default_upload_segment(),
            version_segment: default_version_segment(),
            namespace: default_namespace(),
            format: default_format(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// `<base_url>/<cloud_name>/<resource_segment>` without trailing slash
    pub fn resource_base(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.cloud_name,
            self.resource_segment
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(format!(
                "origin.base_url '{}' must start with http:// or https://",
                self.base_url
            ));
        }
        if self.cloud_name.trim().is_empty() {
            return Err("origin.cloud_name cannot be empty".to_string());
        }
        if self.format.is_empty() || self.format.contains(['/', '.', '?']) {
            return Err(format!("origin.format '{}' is not a file extension", self.format));
        }
        if self.user_agent.trim().is_empty() {
            return Err("origin.user_agent cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("origin.timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}
