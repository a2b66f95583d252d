//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! The tables are owned by the main application and normally exist already; creating
//! them from the entity definitions keeps local runs and the test suite self-contained.
//! `Schema::create_table_from_entity` generates the statements from the entity models,
//! so the schema always matches the Rust struct definitions.

use crate::entities::{ChallengeProgress, FinancialData, Session, Transaction, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/mindmoney.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    let db = Database::connect(&database_url).await?;
    info!("Database connection established.");
    Ok(db)
}

/// Creates every table the service reads, if it does not exist yet.
///
/// Users are created first so the foreign keys of the dependent tables resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(FinancialData),
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(ChallengeProgress),
        schema.create_table_from_entity(Session),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{SessionModel, UserModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist if they can be queried
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<SessionModel> = Session::find().limit(1).all(&db).await?;
        let _ = FinancialData::find().limit(1).all(&db).await?;
        let _ = Transaction::find().limit(1).all(&db).await?;
        let _ = ChallengeProgress::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
