/// Environment gateway integration tests
///
/// These tests validate the read-modify-write contract of environment
/// updates, account routing and the per-function serialization of writes.
mod common;

use lambdaops_core::GatewayError;
use lambdaops_core::models::AccountKey;
use lambdaops_core::services::LambdaGateway;
use lambdaops_core::utils::RetryConfig;
use std::sync::Arc;
use std::time::Duration;

fn gateway(upstream: &lambdaops_core::testing::InMemoryUpstream) -> Arc<LambdaGateway> {
    Arc::new(LambdaGateway::new(Arc::new(upstream.clone())).with_retry(RetryConfig::new(0, 1, 1)))
}

#[tokio::test]
async fn update_then_read_changes_only_the_requested_key() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    let gateway = gateway(&upstream);
    let prod = accounts.resolve(Some("prod"));

    let before = gateway.get_environment("my-fn", prod).await.unwrap();
    gateway
        .update_environment_variable("my-fn", "LOG_LEVEL", "debug", prod)
        .await
        .unwrap();
    let after = gateway.get_environment("my-fn", prod).await.unwrap();

    let mut expected = before.clone();
    expected.insert("LOG_LEVEL".to_string(), "debug".to_string());
    assert_eq!(after, expected);
}

#[tokio::test]
async fn update_of_missing_key_leaves_map_unchanged() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    let gateway = gateway(&upstream);
    let account = accounts.resolve(None);

    let before = gateway.get_environment("my-fn", account).await.unwrap();
    let result = gateway
        .update_environment_variable("my-fn", "NEW_VAR", "x", account)
        .await;
    let after = gateway.get_environment("my-fn", account).await.unwrap();

    assert!(matches!(result, Err(GatewayError::MissingKey(_))));
    assert_eq!(before, after);
}

#[tokio::test]
async fn empty_value_is_a_valid_update() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    let gateway = gateway(&upstream);
    let account = accounts.resolve(None);

    gateway
        .update_environment_variable("my-fn", "LOG_LEVEL", "", account)
        .await
        .unwrap();

    let env = gateway.get_environment("my-fn", account).await.unwrap();
    assert_eq!(env["LOG_LEVEL"], "");
}

#[tokio::test]
async fn update_is_scoped_to_the_selected_account() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    let gateway = gateway(&upstream);

    gateway
        .update_environment_variable("my-fn", "LOG_LEVEL", "error", accounts.resolve(Some("prod")))
        .await
        .unwrap();

    let staging = upstream.control_plane(AccountKey::Default);
    assert_eq!(staging.environment("my-fn").unwrap()["LOG_LEVEL"], "info");
    assert_eq!(staging.write_count(), 0);
}

#[tokio::test]
async fn unknown_account_lists_like_default() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    let gateway = gateway(&upstream);

    let fallback = gateway
        .list_functions(accounts.resolve(Some("staging")))
        .await
        .unwrap();
    let default = gateway
        .list_functions(accounts.resolve(Some("default")))
        .await
        .unwrap();

    assert_eq!(fallback, default);
    assert_eq!(default.len(), 2);
}

#[tokio::test]
async fn list_functions_may_be_empty() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();

    let functions = gateway(&upstream)
        .list_functions(accounts.resolve(Some("alt")))
        .await
        .unwrap();
    assert!(functions.is_empty());
}

#[tokio::test]
async fn unknown_function_is_not_found() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    let gateway = gateway(&upstream);

    let read = gateway.get_environment("ghost", accounts.resolve(None)).await;
    assert!(matches!(read, Err(GatewayError::NotFound(_))));

    let write = gateway
        .update_environment_variable("ghost", "LOG_LEVEL", "debug", accounts.resolve(None))
        .await;
    assert!(matches!(write, Err(GatewayError::NotFound(_))));
}

#[tokio::test]
async fn upstream_failure_is_reported() {
    let upstream = common::seeded_upstream();
    let accounts = common::account_table();
    upstream
        .control_plane(AccountKey::Default)
        .set_unavailable(true);

    let result = gateway(&upstream).list_functions(accounts.resolve(None)).await;
    match result {
        Err(GatewayError::Upstream { operation, detail, .. }) => {
            assert_eq!(operation, "list_functions");
            assert!(detail.contains("connection refused"));
        }
        other => panic!("expected upstream error, got {:?}", other.map(|f| f.len())),
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_updates_to_one_function_do_not_clobber() {
    let upstream = common::seeded_upstream();
    let accounts = Arc::new(common::account_table());
    let plane = upstream.control_plane(AccountKey::Default);
    plane.set_latency(Duration::from_millis(50));
    let gateway = gateway(&upstream);

    let first = {
        let (gateway, accounts) = (gateway.clone(), accounts.clone());
        tokio::spawn(async move {
            gateway
                .update_environment_variable("my-fn", "LOG_LEVEL", "debug", accounts.resolve(None))
                .await
        })
    };
    let second = {
        let (gateway, accounts) = (gateway.clone(), accounts.clone());
        tokio::spawn(async move {
            gateway
                .update_environment_variable("my-fn", "DB_URL", "postgres://new", accounts.resolve(None))
                .await
        })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let env = plane.environment("my-fn").unwrap();
    assert_eq!(env["LOG_LEVEL"], "debug");
    assert_eq!(env["DB_URL"], "postgres://new");
    assert_eq!(plane.write_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn updates_to_different_functions_run_in_parallel() {
    let upstream = common::seeded_upstream();
    let accounts = Arc::new(common::account_table());
    let latency = Duration::from_millis(100);
    upstream.control_plane(AccountKey::Default).set_latency(latency);
    let gateway = gateway(&upstream);

    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        gateway.update_environment_variable("my-fn", "LOG_LEVEL", "debug", accounts.resolve(None)),
        gateway.update_environment_variable("billing-fn", "CURRENCY", "EUR", accounts.resolve(None)),
    );
    a.unwrap();
    b.unwrap();

    // One read and one write each; serialized execution would take 4x latency
    assert!(started.elapsed() < latency * 3);
}
