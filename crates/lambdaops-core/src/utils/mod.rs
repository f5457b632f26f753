/// Utility functions and helpers
pub mod logging;
pub mod retry;

// Re-export commonly used functions
pub use logging::{mask_access_key, redact_value};
pub use retry::{RetryConfig, retry_with_backoff};
