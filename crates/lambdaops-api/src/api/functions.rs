/// Lambda function endpoints: listing and environment variables
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use lambdaops_core::{AccountKey, EnvironmentMap, FunctionSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{context::ApiContext, error::ApiError};

const LIST_FAILED: &str = "Failed to fetch Lambda functions.";
const READ_FAILED: &str = "Failed to fetch environment variables.";
const UPDATE_FAILED: &str = "Failed to update environment variable.";
const MISSING_FIELDS: &str = "Key and value are required.";

/// Account selector shared by every function route
#[derive(Debug, Default, Deserialize)]
pub struct AccountParams {
    pub account: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FunctionsResponse {
    pub functions: Vec<FunctionSummary>,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentResponse {
    pub environment: EnvironmentMap,
    /// The account the request actually resolved to
    pub account: AccountKey,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list(
    State(ctx): State<Arc<ApiContext>>,
    Query(params): Query<AccountParams>,
) -> Result<Json<FunctionsResponse>, ApiError> {
    let account = ctx.accounts.resolve(params.account.as_deref());

    let functions = ctx.lambda.list_functions(account).await.map_err(|e| {
        error!(account = %account.key, error = %e, "Failed to list functions");
        ApiError::from_gateway(e, LIST_FAILED, false)
    })?;

    Ok(Json(FunctionsResponse { functions }))
}

pub async fn get_environment(
    State(ctx): State<Arc<ApiContext>>,
    Path(name): Path<String>,
    Query(params): Query<AccountParams>,
) -> Result<Json<EnvironmentResponse>, ApiError> {
    let account = ctx.accounts.resolve(params.account.as_deref());

    let environment = ctx
        .lambda
        .get_environment(&name, account)
        .await
        .map_err(|e| {
            error!(function = %name, account = %account.key, error = %e, "Failed to read environment");
            ApiError::from_gateway(e, READ_FAILED, ctx.config.expose_error_details)
        })?;

    Ok(Json(EnvironmentResponse {
        environment,
        account: account.key,
    }))
}

pub async fn update_environment(
    State(ctx): State<Arc<ApiContext>>,
    Path(name): Path<String>,
    Query(params): Query<AccountParams>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        debug!(error = %e, "Rejected update body");
        ApiError::BadRequest(MISSING_FIELDS.to_string())
    })?;

    // An empty value is a legitimate setting; an empty key is not
    let (Some(key), Some(value)) = (request.key.filter(|k| !k.is_empty()), request.value) else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let account = ctx.accounts.resolve(params.account.as_deref());

    ctx.lambda
        .update_environment_variable(&name, &key, &value, account)
        .await
        .map_err(|e| {
            error!(function = %name, key = %key, account = %account.key, error = %e, "Failed to update environment");
            ApiError::from_gateway(e, UPDATE_FAILED, false)
        })?;

    Ok(Json(MessageResponse {
        message: "Environment variable updated.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_response_shape() {
        let response = EnvironmentResponse {
            environment: EnvironmentMap::from([("LOG_LEVEL".to_string(), "info".to_string())]),
            account: AccountKey::Prod,
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            serde_json::json!({"environment": {"LOG_LEVEL": "info"}, "account": "prod"})
        );
    }

    #[test]
    fn test_update_request_accepts_empty_value() {
        let request: UpdateRequest =
            serde_json::from_str(r#"{"key":"FEATURE_FLAG","value":""}"#).unwrap();
        assert_eq!(request.value.as_deref(), Some(""));

        assert!(serde_json::from_str::<UpdateRequest>(r#"{"key":"K","value":5}"#).is_err());
    }
}
