//! Database connection and schema setup.
//!
//! Uses `SeaORM`'s `Schema::create_table_from_entity` to generate the table
//! from the entity definition, so the schema always matches the Rust structs
//! without hand-written SQL.

use crate::entities::StoreEntry;
use crate::errors::Result;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default `SQLite` location used when no `DATABASE_URL` is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/tulista.sqlite?mode=rwc";

/// Establishes a connection to the `SQLite` database at the given URL.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the key/value store table if it does not already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut table: TableCreateStatement = schema.create_table_from_entity(StoreEntry);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;

    Ok(())
}
