/// Lambdaops API - HTTP gateway
///
/// This module wires the REST handlers, session auth and request logging
/// into one axum router that runs either standalone or under the Lambda
/// HTTP runtime.
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;

pub use config::ApiConfig;
pub use context::ApiContext;
pub use error::ApiError;

use axum::{
    Router,
    body::Body as AxumBody,
    extract::DefaultBodyLimit,
    http::{Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Request bodies above this size are rejected
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the complete application router
pub fn router(ctx: Arc<ApiContext>) -> Router {
    // Every gateway route sits behind the session guard
    let protected = Router::new()
        .route("/lambda/functions", get(api::functions::list))
        .route(
            "/lambda/functions/{name}/env",
            get(api::functions::get_environment).put(api::functions::update_environment),
        )
        .route("/lambda/functions/{name}/logs", post(api::logs::query))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&ctx),
            auth::auth_middleware,
        ));

    let api_router = Router::new()
        .route("/health", get(api::health::handler))
        .route("/auth/login", post(api::auth::login))
        .merge(protected);

    Router::new()
        .nest("/api", api_router)
        .route_layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(ctx)
}

/// Lambda handler - converts a Lambda HTTP event into a router call
pub async fn handler(app: Router, event: Request) -> Result<Response<Body>, LambdaError> {
    debug!(method = %event.method(), uri = %event.uri(), "Processing Lambda event");

    let (parts, body) = event.into_parts();
    let axum_request = http::Request::from_parts(parts, AxumBody::from(body.to_vec()));

    let response = match app.oneshot(axum_request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES * 8).await?;

    Ok(Response::from_parts(parts, Body::from(body_bytes.to_vec())))
}
