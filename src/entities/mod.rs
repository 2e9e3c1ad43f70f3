//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod store_entry;

// Re-export specific types to avoid conflicts
pub use store_entry::{Column as StoreEntryColumn, Entity as StoreEntry, Model as StoreEntryModel};
