//! Common test utilities for gateway integration tests
#![allow(dead_code)]

use lambdaops_core::models::AccountKey;
use lambdaops_core::services::AccountTable;
use lambdaops_core::testing::{InMemoryUpstream, test_account};

/// Account table whose bundles match [`test_account`]
pub fn account_table() -> AccountTable {
    let bundle = |key| test_account(key).credentials;
    AccountTable::new(
        bundle(AccountKey::Default),
        bundle(AccountKey::Prod),
        bundle(AccountKey::Alt),
    )
}

/// Upstream seeded with the same function in the default and prod accounts
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
        &[("LOG_LEVEL", "warn"), ("DB_URL", "postgres://prod")],
    );

    upstream
}
