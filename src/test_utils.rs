//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{capacity, formation, planning, projector::ProjectionStrategy, resource, room},
    core::{slot::SlotSpec, weekday::Weekday},
    entities,
    errors::{Error, Result},
    models::ReservationRequest,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a calendar date; panics on an impossible date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builds a time of day; panics on an impossible time.
#[allow(clippy::unwrap_used)]
pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Builds a slot spanning whole hours `[start_hour, end_hour)`.
#[allow(clippy::unwrap_used)]
pub fn slot(weekday: Weekday, start_hour: u32, end_hour: u32, room_id: Option<i64>) -> SlotSpec {
    SlotSpec::new(weekday, time(start_hour, 0), time(end_hour, 0), room_id).unwrap()
}

/// Creates a formation titled "Test Formation".
pub async fn create_test_formation(
    db: &DatabaseConnection,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<entities::formation::Model> {
    formation::create_formation(db, "Test Formation".to_string(), start_date, end_date).await
}

/// Creates an available room with a capacity of 20.
pub async fn create_test_room(db: &DatabaseConnection, name: &str) -> Result<entities::room::Model> {
    room::create_room(db, name.to_string(), Some(20)).await
}

/// Creates a resource pool.
pub async fn create_test_resource(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
) -> Result<entities::resource::Model> {
    resource::create_resource(db, name.to_string(), quantity).await
}

/// Submits a planning for trainer 1 with the given slots.
pub async fn create_test_planning(
    db: &DatabaseConnection,
    formation_id: i64,
    slots: &[SlotSpec],
) -> Result<(
    entities::planning::Model,
    Vec<entities::recurring_slot::Model>,
)> {
    planning::submit_planning(db, formation_id, 1, slots).await
}

/// Reserves units with the default projection strategy.
pub async fn create_test_reservation(
    db: &DatabaseConnection,
    resource_id: i64,
    slot_id: i64,
    formation_id: i64,
    quantity: i32,
) -> Result<entities::resource_reservation::Model> {
    let request = ReservationRequest {
        resource_id,
        slot_id,
        formation_id,
        quantity,
    };
    capacity::reserve(db, &request, ProjectionStrategy::FirstOccurrence).await
}

/// Asserts that `result` failed with a room conflict and returns the conflicting slot.
pub fn expect_room_conflict<T: std::fmt::Debug>(result: Result<T>) -> Option<i64> {
    match result {
        Err(Error::RoomConflict {
            conflicting_slot_id,
            ..
        }) => conflicting_slot_id,
        other => panic!("expected a room conflict, got {other:?}"),
    }
}
