//! Room availability - exclusive-use conflict detection.
//!
//! A room is occupied for a candidate placement when a stored slot in the same
//! room, on the same weekday, overlaps its hours AND belongs to a formation whose
//! date range overlaps the candidate's. Slots in formations that never run at
//! the same time do not conflict.

use super::{
    overlap::{date_ranges_overlap, time_ranges_overlap},
    slot::{SlotSpec, load_contexts},
    time::format_time,
    weekday::Weekday,
};
use crate::{
    entities::{RecurringSlot, Room, formation, recurring_slot, room},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A candidate placement of a slot in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPlacement {
    /// Room asked for
    pub room_id: i64,
    /// Day the slot repeats on
    pub weekday: Weekday,
    /// Start time (inclusive)
    pub start_time: NaiveTime,
    /// End time (exclusive)
    pub end_time: NaiveTime,
    /// First day of the candidate's formation
    pub start_date: NaiveDate,
    /// Last day of the candidate's formation
    pub end_date: NaiveDate,
    /// Slot being edited, ignored by the scan
    pub exclude_slot_id: Option<i64>,
}

impl RoomPlacement {
    /// Placement of `spec` in its room for `formation`, or `None` when the slot has no room.
    #[must_use]
    pub fn for_slot(
        spec: &SlotSpec,
        formation: &formation::Model,
        exclude_slot_id: Option<i64>,
    ) -> Option<Self> {
        spec.room_id.map(|room_id| Self {
            room_id,
            weekday: spec.weekday,
            start_time: spec.start_time,
            end_time: spec.end_time,
            start_date: formation.start_date,
            end_date: formation.end_date,
            exclude_slot_id,
        })
    }
}

/// Creates a room. Names are unique; a duplicate fails at the database.
pub async fn create_room(
    db: &DatabaseConnection,
    name: String,
    capacity: Option<i32>,
) -> Result<room::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName { entity: "room" });
    }

    let room = room::ActiveModel {
        name: Set(name.trim().to_string()),
        capacity: Set(capacity),
        is_available: Set(true),
        ..Default::default()
    };
    room.insert(db).await.map_err(Into::into)
}

/// Retrieves a room, failing with `EntityNotFound` when the id doesn't resolve.
pub async fn get_room<C>(db: &C, room_id: i64) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    Room::find_by_id(room_id)
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "room",
            id: room_id,
        })
}

/// Sets the administrator-controlled availability flag.
pub async fn set_room_availability(
    db: &DatabaseConnection,
    room_id: i64,
    is_available: bool,
) -> Result<room::Model> {
    let mut room: room::ActiveModel = get_room(db, room_id).await?.into();
    room.is_available = Set(is_available);
    room.update(db).await.map_err(Into::into)
}

/// Retrieves a room and takes a row lock on it for the enclosing transaction.
pub(crate) async fn lock_room<C>(db: &C, room_id: i64) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    Room::find_by_id(room_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "room",
            id: room_id,
        })
}

/// Returns the first stored slot that makes `placement` a double booking.
pub async fn find_room_conflict<C>(
    db: &C,
    placement: &RoomPlacement,
) -> Result<Option<recurring_slot::Model>>
where
    C: ConnectionTrait,
{
    let mut query = RecurringSlot::find()
        .filter(recurring_slot::Column::RoomId.eq(placement.room_id))
        .filter(recurring_slot::Column::Weekday.eq(placement.weekday))
        .order_by_asc(recurring_slot::Column::Id);
    if let Some(exclude) = placement.exclude_slot_id {
        query = query.filter(recurring_slot::Column::Id.ne(exclude));
    }
    let candidates = query.all(db).await?;
    debug!(
        "Room {} has {} other slot(s) on {}",
        placement.room_id,
        candidates.len(),
        placement.weekday
    );

    let conflict = load_contexts(db, candidates).await?.into_iter().find(|c| {
        time_ranges_overlap(
            c.slot.start_time,
            c.slot.end_time,
            placement.start_time,
            placement.end_time,
        ) && date_ranges_overlap(
            c.formation.start_date,
            c.formation.end_date,
            placement.start_date,
            placement.end_date,
        )
    });

    Ok(conflict.map(|c| c.slot))
}

/// Whether `placement` would double book its room.
pub async fn is_room_occupied<C>(db: &C, placement: &RoomPlacement) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_room_conflict(db, placement).await?.is_some())
}

/// Fails with `RoomConflict` when `spec` cannot be placed in its room.
///
/// Locks the room row first so that competing writers on the same room are
/// serialised until the enclosing transaction ends. Slots without a room pass.
pub(crate) async fn ensure_room_free<C>(
    db: &C,
    spec: &SlotSpec,
    formation: &formation::Model,
    exclude_slot_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some(placement) = RoomPlacement::for_slot(spec, formation, exclude_slot_id) else {
        return Ok(());
    };
    lock_room(db, placement.room_id).await?;

    if let Some(existing) = find_room_conflict(db, &placement).await? {
        warn!(
            "Room {} already booked on {} {}-{} by slot {}",
            placement.room_id,
            placement.weekday,
            format_time(existing.start_time),
            format_time(existing.end_time),
            existing.id
        );
        return Err(Error::RoomConflict {
            room_id: placement.room_id,
            weekday: placement.weekday,
            conflicting_slot_id: Some(existing.id),
        });
    }
    Ok(())
}

/// Rooms flagged available that are free for the given weekday, hours, and dates.
pub async fn available_rooms<C>(
    db: &C,
    weekday: Weekday,
    start_time: NaiveTime,
    end_time: NaiveTime,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<room::Model>>
where
    C: ConnectionTrait,
{
    let rooms = Room::find()
        .filter(room::Column::IsAvailable.eq(true))
        .order_by_asc(room::Column::Name)
        .all(db)
        .await?;

    let booked = RecurringSlot::find()
        .filter(recurring_slot::Column::Weekday.eq(weekday))
        .filter(recurring_slot::Column::RoomId.is_not_null())
        .all(db)
        .await?;

    let taken: HashSet<i64> = load_contexts(db, booked)
        .await?
        .into_iter()
        .filter(|c| {
            time_ranges_overlap(c.slot.start_time, c.slot.end_time, start_time, end_time)
                && date_ranges_overlap(
                    c.formation.start_date,
                    c.formation.end_date,
                    start_date,
                    end_date,
                )
        })
        .filter_map(|c| c.slot.room_id)
        .collect();

    Ok(rooms
        .into_iter()
        .filter(|room| !taken.contains(&room.id))
        .collect())
}
