/// Application constants
///
/// Constants are organized by category for easy maintenance.
// ============================================================================
// Session Constants
// ============================================================================
/// Session token lifetime in seconds (30 minutes)
pub const SESSION_TTL_SECONDS: i64 = 30 * 60;

// ============================================================================
// Upstream Constants
// ============================================================================

/// Events returned per log query page
pub const LOG_PAGE_SIZE: i32 = 50;

/// Log group prefix used by the Lambda service for function logs
pub const LAMBDA_LOG_GROUP_PREFIX: &str = "/aws/lambda/";

/// Default per-call deadline for upstream requests in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;

/// Region used for the prod account when none is configured
pub const DEFAULT_PROD_REGION: &str = "ap-south-1";

/// Provider name attached to static account credentials
pub const CREDENTIALS_PROVIDER_NAME: &str = "lambdaops-account";

// ============================================================================
// Retry Configuration
// ============================================================================

/// Maximum number of retries for a conflicting configuration write
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 100;

/// Maximum delay for exponential backoff in milliseconds
pub const RETRY_MAX_DELAY_MS: u64 = 2000;

/// Jitter factor for retry delays (0.0 to 1.0)
pub const RETRY_JITTER_FACTOR: f64 = 0.1;

// ============================================================================
// Logging
// ============================================================================

/// Log target for audit events
pub const LOG_TARGET_AUDIT: &str = "audit";
