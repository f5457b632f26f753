/// Data models for the gateway
pub mod account;
pub mod function;
pub mod logs;

// Re-export commonly used types
pub use account::*;
pub use function::*;
pub use logs::*;
