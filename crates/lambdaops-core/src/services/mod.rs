/// Upstream services and the account-scoped gateways built on them
pub mod accounts;
pub mod clients;
pub mod lambda;
pub mod locks;
pub mod logs;

// Re-export service traits
pub use accounts::AccountTable;
pub use clients::{AwsClientPool, UpstreamClients, UpstreamSettings};
pub use lambda::{FunctionControlPlane, LambdaGateway};
pub use locks::KeyedMutex;
pub use logs::{LogsGateway, LogsPlane};
