/// Login endpoint
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{context::ApiContext, error::ApiError};

const MISSING_FIELDS: &str = "Username and password are required.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(ctx): State<Arc<ApiContext>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body.map_err(|e| {
        debug!(error = %e, "Rejected login body");
        ApiError::BadRequest(MISSING_FIELDS.to_string())
    })?;

    let (Some(username), Some(password)) = (
        request.username.filter(|u| !u.is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let session = ctx.issuer.login(&username, &password).await?;

    Ok(Json(LoginResponse {
        token: session.token,
    }))
}
