//! URL translation
//!
//! Maps a stable public image URL onto a transformation origin URL:
//!
//! ```text
//! /cat.jpg?s=700&x=1
//!   -> <base>/upload/c_fit,q_auto,w_700,h_700/v1/photos/cat.avif?x=1
//! ```
//!
//! Translation is pure: the same request and configuration always produce
//! the same origin request.

use std::fmt;

use crate::config::{Config, OriginConfig, PolicyKind, TransformConfig};
use crate::error::SizeValidationError;

pub mod query;
pub mod request;

pub use query::QueryParams;
pub use request::ImageRequest;

/// Ordered directive tokens: fit, quality, then optional width and height
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDirective {
    tokens: Vec<String>,
}

impl TransformDirective {
    pub fn new(fit: &str, quality: &str) -> Self {
        Self {
            tokens: vec![fit.to_string(), quality.to_string()],
        }
    }

    pub fn with_width(mut self, width: &str) -> Self {
        self.tokens.push(format!("w_{}", width));
        self
    }

    pub fn with_height(mut self, height: &str) -> Self {
        self.tokens.push(format!("h_{}", height));
        self
    }
}

impl fmt::Display for TransformDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(","))
    }
}

/// Fully derived request against the transformation origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginRequest {
    base: String,
    upload_segment: String,
    directive: TransformDirective,
    version_segment: String,
    namespace: String,
    image_id: String,
    format: String,
    passthrough: QueryParams,
}

impl OriginRequest {
    pub fn directive(&self) -> &TransformDirective {
        &self.directive
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn passthrough(&self) -> &QueryParams {
        &self.passthrough
    }

    /// `<upload>/<directive>/<version>/<namespace>/<id>.<format>`
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}.{}",
            self.upload_segment,
            self.directive,
            self.version_segment,
            self.namespace,
            self.image_id,
            self.format
        )
    }

    /// `<base>/<path>[?<passthrough>]`
    pub fn url(&self) -> String {
        if self.passthrough.is_empty() {
            format!("{}/{}", self.base, self.path())
        } else {
            format!("{}/{}?{}", self.base, self.path(), self.passthrough)
        }
    }
}

/// Translates inbound requests using the configured policy
#[derive(Debug, Clone)]
pub struct Translator {
    origin: OriginConfig,
    transform: TransformConfig,
}

impl Translator {
    pub fn new(origin: OriginConfig, transform: TransformConfig) -> Self {
        Self { origin, transform }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.origin.clone(), config.transform.clone())
    }

    pub fn translate(&self, request: &ImageRequest) -> Result<OriginRequest, SizeValidationError> {
        let mut passthrough = request.query().clone();
        let directive = TransformDirective::new(&self.transform.fit, &self.transform.quality);

        let directive = match self.transform.policy {
            PolicyKind::Size => {
                let size = self.validated_size(request.query())?;
                passthrough.remove(&self.transform.size_param);
                directive.with_width(size).with_height(size)
            }
            PolicyKind::Dimensions => {
                let query = request.query();
                let width = query.get(&self.transform.width_param).filter(|v| !v.is_empty());
                let height = query.get(&self.transform.height_param).filter(|v| !v.is_empty());

                let mut directive = directive;
                if let Some(width) = width {
                    directive = directive.with_width(width);
                }
                if let Some(height) = height {
                    directive = directive.with_height(height);
                }
                passthrough.remove(&self.transform.width_param);
                passthrough.remove(&self.transform.height_param);
                directive
            }
        };

        Ok(OriginRequest {
            base: self.origin.resource_base(),
            upload_segment: self.origin.upload_segment.clone(),
            directive,
            version_segment: self.origin.version_segment.clone(),
            namespace: self.origin.namespace.clone(),
            image_id: request.image_id(),
            format: self.origin.format.clone(),
            passthrough,
        })
    }

    fn validated_size<'q>(&self, query: &'q QueryParams) -> Result<&'q str, SizeValidationError> {
        let size = query
            .get(&self.transform.size_param)
            .ok_or(SizeValidationError::Missing)?;

        if self.transform.allowed_sizes.iter().any(|allowed| allowed == size) {
            Ok(size)
        } else {
            Err(SizeValidationError::NotAllowed {
                value: size.to_string(),
            })
        }
    }
}
