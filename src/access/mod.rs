//! Access policy
//!
//! Runs before any cache lookup or origin fetch, in this order:
//! 1. method (GET only)
//! 2. referer whitelist, when enabled
//! 3. size validation, by translating the request speculatively

use std::sync::Arc;

use crate::config::AccessConfig;
use crate::error::GatewayError;
use crate::transform::{ImageRequest, Translator};

/// Referer whitelist with each origin expanded to `origin` and `origin/`
#[derive(Debug, Clone)]
pub struct RefererWhitelist {
    prefixes: Vec<String>,
}

impl RefererWhitelist {
    pub fn new(origins: &[String]) -> Self {
        let prefixes = origins
            .iter()
            .flat_map(|origin| [origin.clone(), format!("{}/", origin)])
            .collect();
        Self { prefixes }
    }

    pub fn allows(&self, referer: &str) -> bool {
        self.prefixes.iter().any(|prefix| referer.starts_with(prefix.as_str()))
    }
}

pub struct AccessPolicy {
    referer: Option<RefererWhitelist>,
    translator: Arc<Translator>,
}

impl AccessPolicy {
    pub fn new(config: &AccessConfig, translator: Arc<Translator>) -> Self {
        let referer = config
            .referer
            .enabled
            .then(|| RefererWhitelist::new(&config.referer.allowed_origins));
        Self { referer, translator }
    }

    pub fn referer_enabled(&self) -> bool {
        self.referer.is_some()
    }

    /// Run every check in order; the first failure wins
    pub fn check(&self, request: &ImageRequest) -> Result<(), GatewayError> {
        self.check_method(request)?;
        self.check_referer(request)?;
        self.check_size(request)
    }

    pub fn check_method(&self, request: &ImageRequest) -> Result<(), GatewayError> {
        if request.method() == "GET" {
            Ok(())
        } else {
            Err(GatewayError::MethodNotAllowed(request.method().to_string()))
        }
    }

    pub fn check_referer(&self, request: &ImageRequest) -> Result<(), GatewayError> {
        let Some(whitelist) = &self.referer else {
            return Ok(());
        };
        match request.referer() {
            Some(referer) if whitelist.allows(referer) => Ok(()),
            Some(referer) => Err(GatewayError::HotlinkRejected(format!(
                "referer '{}' is not allowed",
                referer
            ))),
            None => Err(GatewayError::HotlinkRejected(
                "referer header is missing".to_string(),
            )),
        }
    }

    pub fn check_size(&self, request: &ImageRequest) -> Result<(), GatewayError> {
        self.translator.translate(request)?;
        Ok(())
    }
}
