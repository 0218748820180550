//! Formation lookups and creation.
//!
//! Formations are owned by the CRUD layer; the engine only needs to read their
//! date ranges. `create_formation` exists for seeding and tests.

use crate::{
    entities::{Formation, formation},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Set, prelude::*};

/// Creates a formation spanning `[start_date, end_date]`.
///
/// # Errors
/// Returns an error if:
/// - The title is empty or whitespace-only
/// - `end_date` is before `start_date`
/// - The database insert operation fails
pub async fn create_formation(
    db: &DatabaseConnection,
    title: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<formation::Model> {
    if title.trim().is_empty() {
        return Err(Error::InvalidName {
            entity: "formation",
        });
    }
    if end_date < start_date {
        return Err(Error::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let formation = formation::ActiveModel {
        title: Set(title.trim().to_string()),
        start_date: Set(start_date),
        end_date: Set(end_date),
        ..Default::default()
    };
    formation.insert(db).await.map_err(Into::into)
}

/// Retrieves a formation, failing with `EntityNotFound` when the id doesn't resolve.
pub async fn get_formation<C>(db: &C, formation_id: i64) -> Result<formation::Model>
where
    C: ConnectionTrait,
{
    Formation::find_by_id(formation_id)
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "formation",
            id: formation_id,
        })
}
