// Error types module

use thiserror::Error;

/// Why a size parameter was refused under the size-token policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeValidationError {
    /// The size query parameter is absent
    #[error("size parameter is required")]
    Missing,

    /// The size query parameter is not in the allowed list
    #[error("size '{value}' is not an allowed size")]
    NotAllowed { value: String },
}

/// Centralized error type for the request pipeline
///
/// A closed set of kinds. Each maps to one HTTP status and a short fixed
/// message; the details carried by a variant are for logs only and never
/// reach the client.
///
/// Origin responses with an error status are deliberately not part of this
/// enum: they flow through the pipeline as ordinary responses and are
/// sanitized by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Request method other than GET
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),

    /// Missing or non-whitelisted size parameter
    #[error("invalid size parameter: {0}")]
    SizeValidation(#[from] SizeValidationError),

    /// Referer absent or not whitelisted
    #[error("hotlinking rejected: {0}")]
    HotlinkRejected(String),

    /// Anything else; logged before being converted to a response
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status code sent to the client
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::MethodNotAllowed(_) => 405,
            GatewayError::SizeValidation(_) => 422,
            GatewayError::HotlinkRejected(_) => 403,
            GatewayError::Internal(_) => 500,
        }
    }

    /// Fixed, non-sensitive response body
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::MethodNotAllowed(_) => "Method not allowed",
            GatewayError::SizeValidation(_) => "Unprocessable Entity",
            GatewayError::HotlinkRejected(_) => "Forbidden",
            GatewayError::Internal(_) => "Internal Server Error",
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MethodNotAllowed(_) => "method_not_allowed",
            GatewayError::SizeValidation(_) => "size_validation",
            GatewayError::HotlinkRejected(_) => "hotlink_rejected",
            GatewayError::Internal(_) => "internal",
        }
    }

    /// Only internal faults are worth an operator's attention
    pub fn is_internal(&self) -> bool {
        matches!(self, GatewayError::Internal(_))
    }
}
