//! Typed key/value persistence over the database.
//!
//! The persistence contract is deliberately forgiving: a missing or corrupt
//! blob yields the caller's fallback value rather than an error, so the
//! application always starts even if a stored blob was damaged. Only real
//! database failures propagate.

use crate::core::catalog::Product;
use crate::core::history::Snapshot;
use crate::core::selection::SelectionState;
use crate::entities::{StoreEntry, store_entry};
use crate::errors::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Key for the selection state blob (checked/qty/priceOverride/done maps).
pub const STATE_KEY: &str = "shopping_state_v2";
/// Key for the user-created products blob.
pub const LOCAL_PRODUCTS_KEY: &str = "local_products_v1";
/// Key for the purchase history blob.
pub const HISTORY_KEY: &str = "shopping_history_v1";

/// Key/value store over a database connection.
///
/// Each key holds one JSON blob, written whole after every mutation.
#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    /// Wraps an open database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads and deserializes the blob under `key`, returning `fallback` when
    /// the key is absent or the stored JSON does not deserialize.
    #[instrument(skip(self, fallback))]
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T> {
        let row = StoreEntry::find_by_id(key.to_owned()).one(&self.db).await?;
        let Some(row) = row else {
            debug!("no stored value for '{}', using fallback", key);
            return Ok(fallback);
        };

        match serde_json::from_str(&row.value) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("stored value for '{}' is corrupt ({}), using fallback", key, e);
                Ok(fallback)
            }
        }
    }

    /// Serializes `value` and upserts it under `key`.
    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;

        let entry = store_entry::ActiveModel {
            key: Set(key.to_owned()),
            value: Set(json),
            updated_at: Set(chrono::Utc::now().naive_utc()),
        };

        StoreEntry::insert(entry)
            .on_conflict(
                OnConflict::column(store_entry::Column::Key)
                    .update_columns([store_entry::Column::Value, store_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Removes the blob under `key`, if present.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        StoreEntry::delete_by_id(key.to_owned())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Loads the selection state, defaulting to an empty state.
    pub async fn load_selection(&self) -> Result<SelectionState> {
        self.get_or(STATE_KEY, SelectionState::default()).await
    }

    /// Persists the selection state.
    pub async fn save_selection(&self, state: &SelectionState) -> Result<()> {
        self.set(STATE_KEY, state).await
    }

    /// Loads the user-created products, defaulting to an empty list.
    pub async fn load_local_products(&self) -> Result<Vec<Product>> {
        self.get_or(LOCAL_PRODUCTS_KEY, Vec::new()).await
    }

    /// Persists the user-created products.
    pub async fn save_local_products(&self, products: &[Product]) -> Result<()> {
        self.set(LOCAL_PRODUCTS_KEY, &products).await
    }

    /// Loads the purchase history, defaulting to an empty list.
    pub async fn load_history(&self) -> Result<Vec<Snapshot>> {
        self.get_or(HISTORY_KEY, Vec::new()).await
    }

    /// Persists the purchase history.
    pub async fn save_history(&self, history: &[Snapshot]) -> Result<()> {
        self.set(HISTORY_KEY, &history).await
    }
}


#[cfg(test)]
impl Store {
    /// Test-only access to the underlying connection.
    pub(crate) const fn db_for_tests(&self) -> &DatabaseConnection {
        &self.db
    }
}
