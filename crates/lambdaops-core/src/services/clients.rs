//! Per-account AWS client pool.
//!
//! Building an SDK client resolves configuration and sets up a connection
//! pool, so each account gets exactly one Lambda client and one CloudWatch
//! Logs client for the life of the process. Clients are created on first use
//! because most deployments only ever touch one or two accounts.

use crate::constants::{CREDENTIALS_PROVIDER_NAME, DEFAULT_UPSTREAM_TIMEOUT_SECONDS};
use crate::error::GatewayError;
use crate::models::{Account, AccountKey};
use crate::services::lambda::{AwsLambdaControlPlane, FunctionControlPlane};
use crate::services::logs::{CloudWatchLogsPlane, LogsPlane};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_lambda::config::{Credentials, Region};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

/// Source of upstream capabilities for an account
#[async_trait]
pub trait UpstreamClients: Send + Sync {
    async fn lambda(&self, account: &Account) -> Arc<dyn FunctionControlPlane>;
    async fn logs(&self, account: &Account) -> Arc<dyn LogsPlane>;
}

/// Settings shared by every upstream client
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Override for local emulators; `None` uses the regional AWS endpoints
    pub endpoint_url: Option<String>,
    /// Deadline for one upstream operation, retries included
    pub operation_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            operation_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECONDS),
        }
    }
}

impl UpstreamSettings {
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let operation_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    GatewayError::Config(format!("Invalid UPSTREAM_TIMEOUT_SECS: {}", raw))
                })?;
                if secs == 0 {
                    return Err(GatewayError::Config(
                        "UPSTREAM_TIMEOUT_SECS must be > 0".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECONDS),
        };

        Ok(Self {
            endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|v| !v.trim().is_empty()),
            operation_timeout,
        })
    }
}

struct AccountClients {
    lambda: Arc<AwsLambdaControlPlane>,
    logs: Arc<CloudWatchLogsPlane>,
}

/// Lazily initialised, long-lived clients keyed by account
pub struct AwsClientPool {
    settings: UpstreamSettings,
    default: OnceCell<AccountClients>,
    prod: OnceCell<AccountClients>,
    alt: OnceCell<AccountClients>,
}

impl AwsClientPool {
    pub fn new(settings: UpstreamSettings) -> Self {
        Self {
            settings,
            default: OnceCell::new(),
            prod: OnceCell::new(),
            alt: OnceCell::new(),
        }
    }

    fn slot(&self, key: AccountKey) -> &OnceCell<AccountClients> {
        match key {
            AccountKey::Default => &self.default,
            AccountKey::Prod => &self.prod,
            AccountKey::Alt => &self.alt,
        }
    }

    async fn clients(&self, account: &Account) -> &AccountClients {
        self.slot(account.key)
            .get_or_init(|| async {
                let sdk_config = build_sdk_config(account, &self.settings).await;
                info!(
                    account = %account.key,
                    region = %account.region(),
                    "Created upstream clients"
                );
                AccountClients {
                    lambda: Arc::new(AwsLambdaControlPlane::new(aws_sdk_lambda::Client::new(
                        &sdk_config,
                    ))),
                    logs: Arc::new(CloudWatchLogsPlane::new(
                        aws_sdk_cloudwatchlogs::Client::new(&sdk_config),
                    )),
                }
            })
            .await
    }
}

#[async_trait]
impl UpstreamClients for AwsClientPool {
    async fn lambda(&self, account: &Account) -> Arc<dyn FunctionControlPlane> {
        self.clients(account).await.lambda.clone()
    }

    async fn logs(&self, account: &Account) -> Arc<dyn LogsPlane> {
        self.clients(account).await.logs.clone()
    }
}

/// Build the SDK config for one account from its static credentials.
///
/// The shared credential chain is never consulted, so one account's
/// requests can only ever be signed with that account's keys.
async fn build_sdk_config(account: &Account, settings: &UpstreamSettings) -> aws_config::SdkConfig {
    let credentials = Credentials::new(
        account.credentials.access_key_id.clone(),
        account.credentials.secret_access_key.clone(),
        None,
        None,
        CREDENTIALS_PROVIDER_NAME,
    );

    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(settings.operation_timeout)
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(account.region().to_string()))
        .credentials_provider(credentials)
        .timeout_config(timeout_config);

    if let Some(url) = &settings.endpoint_url {
        loader = loader.endpoint_url(url);
    }

    loader.load().await
}
