//! Recurring slot logic - validation, context loading, and slot edits.
//!
//! Slot writes re-check room placement inside the same transaction as the write,
//! and slot deletion removes the reservations bound to the slot first so that no
//! reservation is ever left pointing at a missing slot.

use super::{capacity, projector::ProjectionStrategy, room, weekday::Weekday};
use crate::{
    core::time::format_time,
    entities::{
        Formation, Planning, RecurringSlot, ResourceReservation, formation, planning,
        recurring_slot, resource_reservation,
    },
    errors::{Error, Result},
};
use chrono::NaiveTime;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// A slot whose fields have been parsed and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    /// Day the slot repeats on
    pub weekday: Weekday,
    /// Start time (inclusive)
    pub start_time: NaiveTime,
    /// End time (exclusive)
    pub end_time: NaiveTime,
    /// Room, if the slot needs one
    pub room_id: Option<i64>,
}

impl SlotSpec {
    /// Builds a spec, rejecting slots whose end is not strictly after their start.
    pub fn new(
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room_id: Option<i64>,
    ) -> Result<Self> {
        if end_time <= start_time {
            return Err(Error::InvalidTimeRange {
                start: format_time(start_time),
                end: format_time(end_time),
            });
        }
        Ok(Self {
            weekday,
            start_time,
            end_time,
            room_id,
        })
    }
}

/// A slot together with the formation its planning belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContext {
    /// The slot itself
    pub slot: recurring_slot::Model,
    /// Formation of the slot's planning
    pub formation: formation::Model,
}

/// Retrieves a slot, failing with `EntityNotFound` when the id doesn't resolve.
pub async fn get_slot<C>(db: &C, slot_id: i64) -> Result<recurring_slot::Model>
where
    C: ConnectionTrait,
{
    RecurringSlot::find_by_id(slot_id)
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "slot",
            id: slot_id,
        })
}

/// Lists the slots of a planning in weekday/start order.
pub async fn get_slots_for_planning<C>(db: &C, planning_id: i64) -> Result<Vec<recurring_slot::Model>>
where
    C: ConnectionTrait,
{
    let mut slots = RecurringSlot::find()
        .filter(recurring_slot::Column::PlanningId.eq(planning_id))
        .order_by_asc(recurring_slot::Column::StartTime)
        .all(db)
        .await?;
    slots.sort_by_key(|slot| (slot.weekday.iso_index(), slot.start_time));
    Ok(slots)
}

/// Resolves a slot and its formation.
pub async fn get_slot_context<C>(db: &C, slot_id: i64) -> Result<SlotContext>
where
    C: ConnectionTrait,
{
    let slot = get_slot(db, slot_id).await?;
    let mut contexts = load_contexts(db, vec![slot]).await?;
    contexts.pop().ok_or(Error::EntityNotFound {
        entity: "slot",
        id: slot_id,
    })
}

/// Attaches formations to a batch of slots with two lookups in total.
pub async fn load_contexts<C>(
    db: &C,
    slots: Vec<recurring_slot::Model>,
) -> Result<Vec<SlotContext>>
where
    C: ConnectionTrait,
{
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let planning_ids: HashSet<i64> = slots.iter().map(|slot| slot.planning_id).collect();
    let plannings: HashMap<i64, planning::Model> = Planning::find()
        .filter(planning::Column::Id.is_in(planning_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|planning| (planning.id, planning))
        .collect();

    let formation_ids: HashSet<i64> = plannings.values().map(|p| p.formation_id).collect();
    let formations: HashMap<i64, formation::Model> = Formation::find()
        .filter(formation::Column::Id.is_in(formation_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|formation| (formation.id, formation))
        .collect();

    slots
        .into_iter()
        .map(|slot| {
            let planning = plannings.get(&slot.planning_id).ok_or(Error::EntityNotFound {
                entity: "planning",
                id: slot.planning_id,
            })?;
            let formation = formations
                .get(&planning.formation_id)
                .cloned()
                .ok_or(Error::EntityNotFound {
                    entity: "formation",
                    id: planning.formation_id,
                })?;
            Ok(SlotContext { slot, formation })
        })
        .collect()
}

/// Inserts a slot without any placement check. Callers validate first.
pub(crate) async fn insert_slot<C>(
    db: &C,
    planning_id: i64,
    spec: &SlotSpec,
) -> Result<recurring_slot::Model>
where
    C: ConnectionTrait,
{
    let slot = recurring_slot::ActiveModel {
        planning_id: Set(planning_id),
        weekday: Set(spec.weekday),
        start_time: Set(spec.start_time),
        end_time: Set(spec.end_time),
        room_id: Set(spec.room_id),
        ..Default::default()
    };
    slot.insert(db).await.map_err(Into::into)
}

/// Adds a slot to an existing planning after checking its room placement.
///
/// # Errors
/// Returns `EntityNotFound` for an unknown planning or room, `RoomConflict`
/// when the room is taken.
pub async fn add_slot(
    db: &DatabaseConnection,
    planning_id: i64,
    spec: SlotSpec,
) -> Result<recurring_slot::Model> {
    let txn = db.begin().await?;

    let planning = super::planning::get_planning(&txn, planning_id).await?;
    let formation = super::formation::get_formation(&txn, planning.formation_id).await?;

    room::ensure_room_free(&txn, &spec, &formation, None).await?;
    let slot = insert_slot(&txn, planning_id, &spec).await?;

    txn.commit().await?;
    info!(
        "Added slot {} ({} {}-{}) to planning {}",
        slot.id,
        slot.weekday,
        format_time(slot.start_time),
        format_time(slot.end_time),
        planning_id
    );
    Ok(slot)
}

/// Replaces a slot's day, hours, and room after checking the new placement.
///
/// The slot itself is excluded from the conflict scan, so re-submitting an
/// unchanged slot always succeeds. Moving the slot to another weekday moves its
/// reservations to new session dates, so they are re-checked against capacity
/// there before anything is written.
///
/// # Errors
/// Returns `RoomConflict` when the room is taken and `InsufficientCapacity`
/// when the slot's reservations don't fit on the new dates.
pub async fn update_slot(
    db: &DatabaseConnection,
    slot_id: i64,
    spec: SlotSpec,
    strategy: ProjectionStrategy,
) -> Result<recurring_slot::Model> {
    let txn = db.begin().await?;

    let context = get_slot_context(&txn, slot_id).await?;
    room::ensure_room_free(&txn, &spec, &context.formation, Some(slot_id)).await?;

    if spec.weekday != context.slot.weekday {
        let moved = SlotContext {
            slot: recurring_slot::Model {
                weekday: spec.weekday,
                start_time: spec.start_time,
                end_time: spec.end_time,
                room_id: spec.room_id,
                ..context.slot.clone()
            },
            formation: context.formation.clone(),
        };
        capacity::ensure_moved_slot_fits(&txn, &moved, strategy).await?;
    }

    let mut slot: recurring_slot::ActiveModel = context.slot.into();
    slot.weekday = Set(spec.weekday);
    slot.start_time = Set(spec.start_time);
    slot.end_time = Set(spec.end_time);
    slot.room_id = Set(spec.room_id);
    let updated = slot.update(&txn).await?;

    txn.commit().await?;
    info!("Updated slot {}", slot_id);
    Ok(updated)
}

/// Deletes the reservations bound to the given slots, then the slots.
/// Returns the number of reservations removed.
pub(crate) async fn delete_slots_cascade<C>(db: &C, slot_ids: Vec<i64>) -> Result<u64>
where
    C: ConnectionTrait,
{
    if slot_ids.is_empty() {
        return Ok(0);
    }

    let removed = ResourceReservation::delete_many()
        .filter(resource_reservation::Column::SlotId.is_in(slot_ids.clone()))
        .exec(db)
        .await?
        .rows_affected;

    RecurringSlot::delete_many()
        .filter(recurring_slot::Column::Id.is_in(slot_ids))
        .exec(db)
        .await?;

    Ok(removed)
}

/// Deletes a slot and every reservation bound to it in one transaction.
/// Returns the number of reservations removed.
pub async fn delete_slot(db: &DatabaseConnection, slot_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    get_slot(&txn, slot_id).await?;
    let removed = delete_slots_cascade(&txn, vec![slot_id]).await?;

    txn.commit().await?;
    info!(
        "Deleted slot {} and {} dependent reservation(s)",
        slot_id, removed
    );
    Ok(removed)
}
