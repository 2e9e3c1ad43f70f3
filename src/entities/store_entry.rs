//! Store entry entity - The key/value table behind all persisted state.
//!
//! Each row holds one persisted store as a JSON blob: the selection state,
//! the user-created products, or the purchase history. Values are written
//! whole on every mutation; readers tolerate missing or corrupt blobs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key/value row - one persisted store per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store")]
pub struct Model {
    /// Store key (e.g., `"shopping_state_v2"`, `"local_products_v1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Store contents serialized as JSON
    pub value: String,
    /// When this store was last written
    pub updated_at: DateTime,
}

/// Store entries have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
