// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers keeps the defaults in one place
// and makes it easier to see what a minimal config resolves to.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Default path of the built-in health endpoint
pub const DEFAULT_HEALTH_PATH: &str = "/_kasasagi/health";

/// Default path of the built-in Prometheus endpoint
pub const DEFAULT_METRICS_PATH: &str = "/_kasasagi/metrics";

// =============================================================================
// Origin defaults
// =============================================================================

/// Default CDN host of the transformation origin
pub const DEFAULT_ORIGIN_BASE_URL: &str = "https://res.cloudinary.com";

/// Default resource type segment following the cloud name
pub const DEFAULT_RESOURCE_SEGMENT: &str = "image";

/// Default delivery type segment
pub const DEFAULT_UPLOAD_SEGMENT: &str = "upload";

/// Default version segment
pub const DEFAULT_VERSION_SEGMENT: &str = "v1";

/// Default asset namespace (folder) on the origin
pub const DEFAULT_NAMESPACE: &str = "photos";

/// Default target image format requested from the origin
pub const DEFAULT_FORMAT: &str = "avif";

/// Default origin fetch timeout in seconds
pub const DEFAULT_ORIGIN_TIMEOUT_SECS: u64 = 30;

/// User agent sent to the origin unless configured otherwise
pub const DEFAULT_USER_AGENT: &str = concat!("kasasagi/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Transform defaults
// =============================================================================

/// Default fit directive token
pub const DEFAULT_FIT_TOKEN: &str = "c_fit";

/// Default quality directive token
pub const DEFAULT_QUALITY_TOKEN: &str = "q_auto";

/// Default query parameter carrying the symbolic size
pub const DEFAULT_SIZE_PARAM: &str = "s";

/// Default allowed size tokens
pub const DEFAULT_ALLOWED_SIZES: &[&str] = &["700", "900", "1400"];

/// Default width query parameter
pub const DEFAULT_WIDTH_PARAM: &str = "w";

/// Default height query parameter
pub const DEFAULT_HEIGHT_PARAM: &str = "h";

// =============================================================================
// Cache defaults
// =============================================================================

/// One year in seconds; derived image bytes for a URL never change
pub const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;

/// Thirty days in seconds (shorter-lived deployments)
pub const THIRTY_DAYS_SECS: u64 = 30 * 24 * 60 * 60;

/// Default maximum item size in megabytes
pub const DEFAULT_MAX_ITEM_SIZE_MB: u64 = 10;

/// Default maximum memory cache size in megabytes
pub const DEFAULT_MAX_CACHE_SIZE_MB: u64 = 512;

/// Default Redis key prefix
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "kasasagi";

/// Redis keys longer than this are replaced by a SHA-256 digest
pub const MAX_REDIS_KEY_LENGTH: usize = 250;
