/// Lambdaops Core - account-scoped resource gateway
///
/// This crate resolves symbolic accounts to credential bundles and proxies
/// Lambda configuration and CloudWatch Logs calls for the selected account.
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;

// Re-export commonly used types
pub use error::GatewayError;
pub use models::{Account, AccountKey, EnvironmentMap, FunctionSummary, LogEvent, LogPage, LogQuery};
pub use services::{AccountTable, LambdaGateway, LogsGateway};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
