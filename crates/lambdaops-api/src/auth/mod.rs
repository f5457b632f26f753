/// Authentication: login, session tokens and the guard middleware
pub mod jwt;
pub mod store;

pub use jwt::{AuthError, AuthGuard, Claims, Identity, SessionToken, TokenIssuer};
pub use store::{CredentialStore, StaticCredentialStore, UserRecord};

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::{context::ApiContext, error::ApiError};

/// Rejects requests without a valid, unexpired bearer token.
///
/// On success the [`Identity`] is attached to both the request and the
/// response extensions so handlers and the request logger can see it.
pub async fn auth_middleware(
    State(ctx): State<Arc<ApiContext>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = ctx.guard.authenticate(auth_header).map_err(|e| {
        warn!(path = %request.uri().path(), reason = %e, "Rejected request");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(identity.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(identity);

    Ok(response)
}
