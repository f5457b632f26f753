/// Lambda control-plane service and the environment gateway built on it
use crate::constants::LOG_TARGET_AUDIT;
use crate::error::GatewayError;
use crate::models::{Account, AccountKey, EnvironmentMap, FunctionSummary};
use crate::services::clients::UpstreamClients;
use crate::services::locks::KeyedMutex;
use crate::utils::logging::redact_value;
use crate::utils::retry::{RetryConfig, retry_with_backoff};
use async_trait::async_trait;
use aws_sdk_lambda::types::Environment;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Control-plane operations the gateway needs from the compute service
#[async_trait]
pub trait FunctionControlPlane: Send + Sync {
    /// All functions in the account, in upstream order
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>, GatewayError>;

    /// The complete environment map of one function
    async fn get_environment(&self, function_name: &str) -> Result<EnvironmentMap, GatewayError>;

    /// Replaces the whole environment map of one function
    async fn put_environment(
        &self,
        function_name: &str,
        environment: &EnvironmentMap,
    ) -> Result<(), GatewayError>;
}

pub struct AwsLambdaControlPlane {
    client: aws_sdk_lambda::Client,
}

impl AwsLambdaControlPlane {
    pub fn new(client: aws_sdk_lambda::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionControlPlane for AwsLambdaControlPlane {
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>, GatewayError> {
        let mut paginator = self.client.list_functions().into_paginator().send();

        let mut functions = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|s| s.is_too_many_requests_exception())
                {
                    GatewayError::Throttled("ListFunctions".to_string())
                } else {
                    GatewayError::upstream("list_functions", e)
                }
            })?;

            functions.extend(page.functions().iter().map(|f| FunctionSummary {
                function_name: f.function_name().unwrap_or_default().to_string(),
                runtime: f.runtime().map(|r| r.as_str().to_string()),
                last_modified: f.last_modified().map(|s| s.to_string()),
            }));
        }

        Ok(functions)
    }

    async fn get_environment(&self, function_name: &str) -> Result<EnvironmentMap, GatewayError> {
        let output = self
            .client
            .get_function_configuration()
            .function_name(function_name)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(s) if s.is_resource_not_found_exception() => {
                    GatewayError::NotFound(function_name.to_string())
                }
                Some(s) if s.is_too_many_requests_exception() => {
                    GatewayError::Throttled("GetFunctionConfiguration".to_string())
                }
                _ => GatewayError::upstream("get_function_configuration", e),
            })?;

        let Some(environment) = output.environment() else {
            return Ok(EnvironmentMap::new());
        };

        // Variables that could not be decrypted come back empty with an error
        // attached; treating that as an empty map would let a write wipe them.
        if let Some(error) = environment.error() {
            return Err(GatewayError::Upstream {
                operation: "get_function_configuration".to_string(),
                message: format!(
                    "environment unavailable: {}",
                    error.message().unwrap_or("unknown error")
                ),
                detail: format!("{:?}", error),
            });
        }

        Ok(environment
            .variables()
            .map(|vars| {
                vars.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn put_environment(
        &self,
        function_name: &str,
        environment: &EnvironmentMap,
    ) -> Result<(), GatewayError> {
        let variables: HashMap<String, String> = environment
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        self.client
            .update_function_configuration()
            .function_name(function_name)
            .environment(Environment::builder().set_variables(Some(variables)).build())
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(s) if s.is_resource_not_found_exception() => {
                    GatewayError::NotFound(function_name.to_string())
                }
                Some(s) if s.is_resource_conflict_exception() => {
                    GatewayError::Conflict(function_name.to_string())
                }
                Some(s) if s.is_too_many_requests_exception() => {
                    GatewayError::Throttled("UpdateFunctionConfiguration".to_string())
                }
                _ => GatewayError::upstream("update_function_configuration", e),
            })?;

        Ok(())
    }
}

/// Account-scoped gateway for function configuration
///
/// Environment updates are read-modify-write against an API that only
/// replaces the whole map, so updates to one function (per account) are
/// serialized; different functions proceed in parallel.
pub struct LambdaGateway {
    upstream: Arc<dyn UpstreamClients>,
    locks: KeyedMutex<(AccountKey, String)>,
    retry: RetryConfig,
}

impl LambdaGateway {
    pub fn new(upstream: Arc<dyn UpstreamClients>) -> Self {
        Self {
            upstream,
            locks: KeyedMutex::new(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub async fn list_functions(
        &self,
        account: &Account,
    ) -> Result<Vec<FunctionSummary>, GatewayError> {
        let functions = self.upstream.lambda(account).await.list_functions().await?;

        debug!(
            account = %account.key,
            count = functions.len(),
            "Listed functions"
        );
        Ok(functions)
    }

    pub async fn get_environment(
        &self,
        function_name: &str,
        account: &Account,
    ) -> Result<EnvironmentMap, GatewayError> {
        validate_function_name(function_name)?;

        self.upstream
            .lambda(account)
            .await
            .get_environment(function_name)
            .await
    }

    /// Sets an existing variable, leaving every other entry untouched.
    ///
    /// Creating variables is not allowed here: an absent key fails with
    /// [`GatewayError::MissingKey`] and nothing is written.
    pub async fn update_environment_variable(
        &self,
        function_name: &str,
        key: &str,
        value: &str,
        account: &Account,
    ) -> Result<(), GatewayError> {
        validate_function_name(function_name)?;
        if key.is_empty() {
            return Err(GatewayError::Validation("Key is required".to_string()));
        }

        let _guard = self
            .locks
            .lock(&(account.key, function_name.to_string()))
            .await;

        let control_plane = self.upstream.lambda(account).await;
        let mut environment = control_plane.get_environment(function_name).await?;

        match environment.get_mut(key) {
            Some(current) => *current = value.to_string(),
            None => {
                warn!(
                    target: LOG_TARGET_AUDIT,
                    function = %function_name,
                    key = %key,
                    account = %account.key,
                    "Rejected update of missing key"
                );
                return Err(GatewayError::MissingKey(key.to_string()));
            }
        }

        retry_with_backoff(
            || control_plane.put_environment(function_name, &environment),
            &self.retry,
            "update_function_configuration",
        )
        .await?;

        info!(
            target: LOG_TARGET_AUDIT,
            function = %function_name,
            key = %key,
            value = %redact_value(value),
            account = %account.key,
            "Environment variable updated"
        );
        Ok(())
    }
}

fn validate_function_name(function_name: &str) -> Result<(), GatewayError> {
    if function_name.trim().is_empty() {
        return Err(GatewayError::Validation(
            "Function name is required".to_string(),
        ));
    }
    Ok(())
}
