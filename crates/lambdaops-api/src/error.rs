/// API Error types
use crate::auth::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lambdaops_core::GatewayError;
use serde::Serialize;

/// Diagnostic detail echoed to clients when explicitly enabled
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub error: String,
    pub stack: String,
}

/// API Error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        detail: Option<ErrorDetail>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(flatten)]
    detail: Option<ErrorDetail>,
}

impl ApiError {
    /// Maps a gateway failure onto the route's client-facing contract.
    ///
    /// `failure_message` is the route's generic 500 message; `expose` adds
    /// the upstream error and its context chain to the body.
    pub fn from_gateway(err: GatewayError, failure_message: &str, expose: bool) -> Self {
        match err {
            GatewayError::Validation(msg) => ApiError::BadRequest(msg),
            GatewayError::MissingKey(_) => ApiError::BadRequest("Key does not exist.".to_string()),
            GatewayError::Upstream {
                message, detail, ..
            } => ApiError::Upstream {
                message: failure_message.to_string(),
                detail: expose.then_some(ErrorDetail {
                    error: message,
                    stack: detail,
                }),
            },
            other @ (GatewayError::NotFound(_)
            | GatewayError::Conflict(_)
            | GatewayError::Throttled(_)
            | GatewayError::Config(_)) => ApiError::Upstream {
                message: failure_message.to_string(),
                detail: expose.then(|| ErrorDetail {
                    error: other.to_string(),
                    stack: format!("{:?}", other),
                }),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Upstream { message, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, detail)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        (status, Json(ErrorBody { message, detail })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials.".to_string()),
            AuthError::Unauthorized(_) => ApiError::Unauthorized("Unauthorized.".to_string()),
            AuthError::Internal(_) => ApiError::Internal("Server error.".to_string()),
        }
    }
}
