/// API Context - shared state for all API handlers
use crate::auth::{AuthGuard, CredentialStore, StaticCredentialStore, TokenIssuer};
use crate::config::ApiConfig;
use lambdaops_core::services::{AwsClientPool, UpstreamClients, UpstreamSettings};
use lambdaops_core::{AccountTable, GatewayError, LambdaGateway, LogsGateway};
use std::sync::Arc;
use tracing::info;

/// API Context contains shared resources for API handlers
pub struct ApiContext {
    pub config: ApiConfig,

    /// Credential bundles for every account, immutable after startup
    pub accounts: AccountTable,

    pub lambda: LambdaGateway,

    pub logs: LogsGateway,

    /// Issues session tokens on login
    pub issuer: TokenIssuer,

    /// Validates session tokens on guarded routes
    pub guard: AuthGuard,
}

impl ApiContext {
    /// Create a new API context from process environment
    pub fn from_env() -> Result<Arc<Self>, GatewayError> {
        let config = ApiConfig::from_env()?;
        let accounts = AccountTable::from_env()?;
        let settings = UpstreamSettings::from_env()?;

        info!(
            users = config.users.len(),
            endpoint_override = settings.endpoint_url.is_some(),
            timeout_secs = settings.operation_timeout.as_secs(),
            "Loaded API configuration"
        );

        let store = Arc::new(StaticCredentialStore::new(config.users.clone()));
        let upstream = Arc::new(AwsClientPool::new(settings));

        Ok(Self::from_parts(config, accounts, upstream, store))
    }

    /// Assembles a context from explicit collaborators
    pub fn from_parts(
        config: ApiConfig,
        accounts: AccountTable,
        upstream: Arc<dyn UpstreamClients>,
        store: Arc<dyn CredentialStore>,
    ) -> Arc<Self> {
        let secret = config.jwt_secret.as_bytes();
        let issuer = TokenIssuer::new(secret, store);
        let guard = AuthGuard::new(secret);

        Arc::new(Self {
            lambda: LambdaGateway::new(Arc::clone(&upstream)),
            logs: LogsGateway::new(upstream),
            issuer,
            guard,
            accounts,
            config,
        })
    }
}
