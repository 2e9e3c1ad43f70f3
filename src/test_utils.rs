//! Shared test utilities for `tulista`.
//!
//! Common helpers for setting up an in-memory database-backed store and a
//! ready-to-use application instance with a small sample catalog.

use crate::app::App;
use crate::config::DecrementPolicy;
use crate::db;
use crate::errors::Result;
use crate::store::Store;
use sea_orm::DatabaseConnection;

/// A three-product catalog source used across tests:
/// Leche (1.10), Pan (0.95), and Queso with no known price.
pub const SAMPLE_CATALOG: &str = r#"[
    {"id": 1, "name": "Leche", "price": 1.10},
    {"id": 2, "name": "Pan", "price": 0.95},
    {"id": 3, "name": "Queso"}
]"#;

/// Creates an in-memory `SQLite` database with the store table initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = db::connect("sqlite::memory:").await?;
    db::create_tables(&db).await?;
    Ok(db)
}

/// Creates a [`Store`] over a fresh in-memory database.
pub async fn setup_test_store() -> Result<Store> {
    Ok(Store::new(setup_test_db().await?))
}

/// Creates an [`App`] over a fresh store and the sample catalog, with the
/// default decrement policy.
pub async fn setup_test_app() -> Result<App> {
    setup_test_app_with_policy(DecrementPolicy::default()).await
}

/// Creates an [`App`] with an explicit decrement policy, for tests that
/// exercise the policy choice.
pub async fn setup_test_app_with_policy(policy: DecrementPolicy) -> Result<App> {
    let store = setup_test_store().await?;
    App::load(store, SAMPLE_CATALOG, policy).await
}
