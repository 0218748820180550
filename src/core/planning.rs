//! Planning business logic - all-or-nothing submissions, approval, and deletion.
//!
//! A planning submission is validated as a whole: every slot is checked against
//! the stored slots and against the other slots of the same submission before
//! anything is written. A single conflict stores nothing.

use super::{
    formation::get_formation,
    overlap::time_ranges_overlap,
    room::ensure_room_free,
    slot::{SlotSpec, delete_slots_cascade, get_slots_for_planning, insert_slot},
};
use crate::{
    entities::{Planning, PlanningStatus, planning, recurring_slot},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Retrieves a planning, failing with `EntityNotFound` when the id doesn't resolve.
pub async fn get_planning<C>(db: &C, planning_id: i64) -> Result<planning::Model>
where
    C: ConnectionTrait,
{
    Planning::find_by_id(planning_id)
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "planning",
            id: planning_id,
        })
}

/// Fails when two slots of the same submission would share a room at the same time.
///
/// Both slots belong to the same formation, so their date ranges always overlap.
fn check_submission_conflicts(specs: &[SlotSpec]) -> Result<()> {
    for (i, later) in specs.iter().enumerate() {
        let Some(room_id) = later.room_id else {
            continue;
        };
        let clash = specs[..i].iter().any(|earlier| {
            earlier.room_id == Some(room_id)
                && earlier.weekday == later.weekday
                && time_ranges_overlap(
                    earlier.start_time,
                    earlier.end_time,
                    later.start_time,
                    later.end_time,
                )
        });
        if clash {
            warn!(
                "Submission books room {} twice on {}",
                room_id, later.weekday
            );
            return Err(Error::RoomConflict {
                room_id,
                weekday: later.weekday,
                conflicting_slot_id: None,
            });
        }
    }
    Ok(())
}

/// Creates a pending planning with all of its slots.
///
/// Every slot is validated before the first write and all writes share one
/// transaction, so either the planning and every slot are stored or nothing is.
///
/// # Errors
/// Returns `EntityNotFound` for an unknown formation or room, and
/// `RoomConflict` for the first slot that cannot be placed.
pub async fn submit_planning(
    db: &DatabaseConnection,
    formation_id: i64,
    trainer_id: i64,
    specs: &[SlotSpec],
) -> Result<(planning::Model, Vec<recurring_slot::Model>)> {
    check_submission_conflicts(specs)?;

    let txn = db.begin().await?;

    let formation = get_formation(&txn, formation_id).await?;
    for spec in specs {
        ensure_room_free(&txn, spec, &formation, None).await?;
    }

    let planning = planning::ActiveModel {
        formation_id: Set(formation_id),
        trainer_id: Set(trainer_id),
        status: Set(PlanningStatus::Pending),
        rejection_reason: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut slots = Vec::with_capacity(specs.len());
    for spec in specs {
        slots.push(insert_slot(&txn, planning.id, spec).await?);
    }

    txn.commit().await?;
    info!(
        "Created planning {} for formation {} with {} slot(s)",
        planning.id,
        formation_id,
        slots.len()
    );
    Ok((planning, slots))
}

/// Records the trainer's answer to a planning.
///
/// Refusing requires a non-blank reason; any other status clears the reason.
pub async fn set_planning_status(
    db: &DatabaseConnection,
    planning_id: i64,
    status: PlanningStatus,
    rejection_reason: Option<String>,
) -> Result<planning::Model> {
    let reason = match status {
        PlanningStatus::Refused => {
            let reason = rejection_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .ok_or(Error::MissingRejectionReason { planning_id })?;
            Some(reason)
        }
        PlanningStatus::Pending | PlanningStatus::Accepted => None,
    };

    let mut planning: planning::ActiveModel = get_planning(db, planning_id).await?.into();
    planning.status = Set(status);
    planning.rejection_reason = Set(reason);
    let updated = planning.update(db).await?;

    info!("Planning {} is now {:?}", planning_id, status);
    Ok(updated)
}

/// Deletes a planning, its slots, and every reservation bound to them.
/// Returns the number of reservations removed.
pub async fn delete_planning(db: &DatabaseConnection, planning_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    let planning = get_planning(&txn, planning_id).await?;
    let slot_ids = get_slots_for_planning(&txn, planning_id)
        .await?
        .into_iter()
        .map(|slot| slot.id)
        .collect();
    let removed = delete_slots_cascade(&txn, slot_ids).await?;
    planning.delete(&txn).await?;

    txn.commit().await?;
    info!(
        "Deleted planning {} and {} dependent reservation(s)",
        planning_id, removed
    );
    Ok(removed)
}
