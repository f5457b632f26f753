/// API endpoint modules
pub mod auth;
pub mod functions;
pub mod health;
pub mod logs;
