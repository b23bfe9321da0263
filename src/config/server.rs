//! Server configuration types.
//!
//! This module defines the listener-level configuration:
//! - Address and port bindings
//! - Worker thread count for the Pingora service
//! - Paths of the built-in health and metrics endpoints
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ADDRESS, DEFAULT_HEALTH_PATH, DEFAULT_METRICS_PATH, DEFAULT_PORT, DEFAULT_THREADS,
};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_health_path() -> Option<String> {
    Some(DEFAULT_HEALTH_PATH.to_string())
}

fn default_metrics_path() -> Option<String> {
    Some(DEFAULT_METRICS_PATH.to_string())
}

/// Listener and built-in endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker threads for the proxy service (default: 4)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Health endpoint path; `null` disables it
    #[serde(default = "default_health_path")]
    pub health_path: Option<String>,
    /// Prometheus endpoint path; `null` disables it
    #[serde(default = "default_metrics_path")]
    pub metrics_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            threads: default_threads(),
            health_path: default_health_path(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl ServerConfig {
    /// Socket address string handed to the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Whether `path` is served by a built-in endpoint instead of the image pipeline
    pub fn is_reserved_path(&self, path: &str) -> bool {
        self.health_path.as_deref() == Some(path) || self.metrics_path.as_deref() == Some(path)
    }
}
