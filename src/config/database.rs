//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{
    Formation, Planning, RecurringSlot, Resource, ResourceReservation, Room,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::debug;

/// Default database when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/training_scheduler.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the
/// default local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all missing tables, parents before children so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = [
        schema.create_table_from_entity(Formation),
        schema.create_table_from_entity(Room),
        schema.create_table_from_entity(Resource),
        schema.create_table_from_entity(Planning),
        schema.create_table_from_entity(RecurringSlot),
        schema.create_table_from_entity(ResourceReservation),
    ];

    for statement in &mut statements {
        db.execute(builder.build(statement.if_not_exists())).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        FormationModel, PlanningModel, RecurringSlotModel, ReservationModel, ResourceModel,
        RoomModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<FormationModel> = Formation::find().limit(1).all(&db).await?;
        let _: Vec<RoomModel> = Room::find().limit(1).all(&db).await?;
        let _: Vec<ResourceModel> = Resource::find().limit(1).all(&db).await?;
        let _: Vec<PlanningModel> = Planning::find().limit(1).all(&db).await?;
        let _: Vec<RecurringSlotModel> = RecurringSlot::find().limit(1).all(&db).await?;
        let _: Vec<ReservationModel> = ResourceReservation::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        assert!(Room::find().all(&db).await?.is_empty());
        Ok(())
    }
}
