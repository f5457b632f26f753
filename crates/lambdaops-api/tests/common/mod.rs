//! Common test utilities for HTTP integration tests
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use lambdaops_api::{ApiConfig, ApiContext, auth::StaticCredentialStore, auth::UserRecord};
use lambdaops_core::models::AccountKey;
use lambdaops_core::services::AccountTable;
use lambdaops_core::testing::{InMemoryUpstream, test_account};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ALICE_PASSWORD: &str = "correct horse battery staple";

static ALICE_HASH: LazyLock<String> =
    LazyLock::new(|| bcrypt::hash(ALICE_PASSWORD, 4).expect("hash test password"));

pub fn alice() -> UserRecord {
    UserRecord {
        id: Some("user-alice".to_string()),
        username: "alice".to_string(),
        password_hash: ALICE_HASH.clone(),
    }
}

pub fn config(expose_error_details: bool) -> ApiConfig {
    ApiConfig {
        jwt_secret: SECRET.to_string(),
        users: vec![alice()],
        expose_error_details,
        port: 0,
    }
}

/// Upstream seeded with `my-fn` in the default and prod accounts
pub fn seeded_upstream() -> InMemoryUpstream {
    let upstream = InMemoryUpstream::new();

    upstream.control_plane(AccountKey::Default).put_function(
        "my-fn",
        &[("LOG_LEVEL", "info"), ("DB_URL", "postgres://staging")],
    );
    upstream
        .control_plane(AccountKey::Default)
        .put_function("billing-fn", &[("CURRENCY", "USD")]);

    upstream.control_plane(AccountKey::Prod).put_function(
        "my-fn",
        &[
            ("LOG_LEVEL", "warn"),
            ("DB_URL", "postgres://prod"),
            ("FEATURE_FLAG", "on"),
        ],
    );

    upstream
}

pub struct TestApp {
    pub ctx: Arc<ApiContext>,
    pub router: Router,
    pub upstream: InMemoryUpstream,
}

impl TestApp {
    pub fn new(upstream: InMemoryUpstream, expose_error_details: bool) -> Self {
        let bundle = |key| test_account(key).credentials;
        let accounts = AccountTable::new(
            bundle(AccountKey::Default),
            bundle(AccountKey::Prod),
            bundle(AccountKey::Alt),
        );
        let config = config(expose_error_details);
        let store = Arc::new(StaticCredentialStore::new(config.users.clone()));
        let ctx = ApiContext::from_parts(config, accounts, Arc::new(upstream.clone()), store);

        Self {
            router: lambdaops_api::router(Arc::clone(&ctx)),
            ctx,
            upstream,
        }
    }

    pub fn seeded() -> Self {
        Self::new(seeded_upstream(), false)
    }

    /// Sends one request and returns the status and parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({"username": "alice", "password": ALICE_PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}
