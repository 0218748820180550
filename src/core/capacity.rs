//! Resource capacity accounting.
//!
//! Reservations are bucketed by concrete session date: a slot's dates come from
//! projecting its weekday onto its formation's start date (see
//! [`ProjectionStrategy`]). For a resource and a date, the reserved total is the
//! sum of quantities of every non-cancelled reservation whose slot lands on that
//! date, across all plannings and formations.
//!
//! Every write checks and persists inside one transaction after locking the
//! resource row, so two requests cannot both pass the check on the last units.

use super::{
    projector::ProjectionStrategy,
    resource::{get_resource, lock_resource},
    slot::{SlotContext, get_slot, get_slot_context, load_contexts},
};
use crate::{
    entities::{
        RecurringSlot, ResourceReservation, ReservationStatus, recurring_slot, resource,
        resource_reservation,
    },
    errors::{Error, Result},
    models::ReservationRequest,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Capacity of a resource on a slot's session date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    /// Resource asked about
    pub resource_id: i64,
    /// Slot whose session date was checked
    pub slot_id: i64,
    /// Session date with the highest reserved total
    pub session_date: NaiveDate,
    /// Units owned
    pub total: i32,
    /// Units already reserved on `session_date`
    pub reserved: i32,
    /// Units still free, never negative
    pub available: i32,
    /// Whether at least one unit is free
    pub is_available: bool,
}

/// Computes the report for `resource` on the dates of `target`, leaving out
/// the reservations in `excluded` (those being edited or moved).
async fn compute_report<C>(
    db: &C,
    resource: &resource::Model,
    target: &SlotContext,
    strategy: ProjectionStrategy,
    excluded: &[i64],
) -> Result<AvailabilityReport>
where
    C: ConnectionTrait,
{
    let dates_of = |context: &SlotContext| {
        strategy.session_dates(
            context.formation.start_date,
            context.formation.end_date,
            context.slot.weekday,
        )
    };
    let target_dates = dates_of(target);

    // Slots sharing at least one concrete date with the target
    let same_weekday = RecurringSlot::find()
        .filter(recurring_slot::Column::Weekday.eq(target.slot.weekday))
        .all(db)
        .await?;
    let slot_dates: HashMap<i64, Vec<NaiveDate>> = load_contexts(db, same_weekday)
        .await?
        .iter()
        .map(|context| (context.slot.id, dates_of(context)))
        .filter(|(_, dates)| dates.iter().any(|date| target_dates.contains(date)))
        .collect();

    let mut query = ResourceReservation::find()
        .filter(resource_reservation::Column::ResourceId.eq(resource.id))
        .filter(resource_reservation::Column::SlotId.is_in(slot_dates.keys().copied()))
        .filter(resource_reservation::Column::Status.ne(ReservationStatus::Cancelled));
    if !excluded.is_empty() {
        query = query
            .filter(resource_reservation::Column::Id.is_not_in(excluded.iter().copied()));
    }
    let reservations = query.all(db).await?;

    let reserved_on = |date: &NaiveDate| -> i32 {
        reservations
            .iter()
            .filter(|r| slot_dates.get(&r.slot_id).is_some_and(|d| d.contains(date)))
            .map(|r| r.quantity)
            .sum()
    };

    // Busiest date wins; the earliest one on ties
    let mut session_date = target_dates[0];
    let mut reserved = reserved_on(&session_date);
    for date in target_dates.iter().skip(1) {
        let on_date = reserved_on(date);
        if on_date > reserved {
            session_date = *date;
            reserved = on_date;
        }
    }

    let available = (resource.quantity - reserved).max(0);
    debug!(
        "Resource {} on {}: total {}, reserved {}, available {}",
        resource.id, session_date, resource.quantity, reserved, available
    );

    Ok(AvailabilityReport {
        resource_id: resource.id,
        slot_id: target.slot.id,
        session_date,
        total: resource.quantity,
        reserved,
        available,
        is_available: available > 0,
    })
}

/// Reports how many units of a resource remain free on a slot's session date.
///
/// # Errors
/// Returns `EntityNotFound` when the resource or slot doesn't resolve.
pub async fn check_availability<C>(
    db: &C,
    resource_id: i64,
    slot_id: i64,
    strategy: ProjectionStrategy,
) -> Result<AvailabilityReport>
where
    C: ConnectionTrait,
{
    let resource = get_resource(db, resource_id).await?;
    let target = get_slot_context(db, slot_id).await?;
    compute_report(db, &resource, &target, strategy, &[]).await
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

fn ensure_fits(report: &AvailabilityReport, requested: i32) -> Result<()> {
    if requested > report.available {
        warn!(
            "Rejected {} unit(s) of resource {} on {}: only {} available",
            requested, report.resource_id, report.session_date, report.available
        );
        return Err(Error::InsufficientCapacity {
            available: report.available,
            requested,
        });
    }
    Ok(())
}

/// Reserves units of a resource for a slot.
///
/// The availability check and the insert run in one transaction holding the
/// resource row lock.
///
/// # Errors
/// Returns an error if:
/// - The quantity is below 1
/// - The resource, slot, or formation doesn't exist
/// - The formation is not the slot's planning's formation
/// - Fewer units than requested remain on the session date
pub async fn reserve(
    db: &DatabaseConnection,
    request: &ReservationRequest,
    strategy: ProjectionStrategy,
) -> Result<resource_reservation::Model> {
    validate_quantity(request.quantity)?;

    let txn = db.begin().await?;

    let resource = lock_resource(&txn, request.resource_id).await?;
    let target = get_slot_context(&txn, request.slot_id).await?;
    super::formation::get_formation(&txn, request.formation_id).await?;
    if target.formation.id != request.formation_id {
        return Err(Error::ReservationMismatch {
            reservation_id: None,
        });
    }

    let report = compute_report(&txn, &resource, &target, strategy, &[]).await?;
    ensure_fits(&report, request.quantity)?;

    let now = chrono::Utc::now().naive_utc();
    let reservation = resource_reservation::ActiveModel {
        resource_id: Set(request.resource_id),
        slot_id: Set(request.slot_id),
        formation_id: Set(request.formation_id),
        quantity: Set(request.quantity),
        status: Set(ReservationStatus::Reserved),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let result = reservation.insert(&txn).await?;

    txn.commit().await?;
    info!(
        "Reserved {} unit(s) of resource {} for slot {} (reservation {})",
        result.quantity, result.resource_id, result.slot_id, result.id
    );
    Ok(result)
}

/// Changes the quantity of an existing reservation.
///
/// The reservation's own previous quantity is left out of the reserved total
/// before the new quantity is compared against what remains.
///
/// A cancelled reservation stays cancelled: editing it fails with
/// `ReservationCancelled` instead of bringing it back into the count.
///
/// # Errors
/// Returns `ReservationMismatch` when the request's resource, slot, or formation
/// differs from the stored reservation, plus the errors of [`reserve`].
pub async fn update_reservation(
    db: &DatabaseConnection,
    reservation_id: i64,
    request: &ReservationRequest,
    strategy: ProjectionStrategy,
) -> Result<resource_reservation::Model> {
    validate_quantity(request.quantity)?;

    let txn = db.begin().await?;

    let existing = get_reservation(&txn, reservation_id).await?;
    if existing.status == ReservationStatus::Cancelled {
        return Err(Error::ReservationCancelled { reservation_id });
    }
    if existing.resource_id != request.resource_id
        || existing.slot_id != request.slot_id
        || existing.formation_id != request.formation_id
    {
        return Err(Error::ReservationMismatch {
            reservation_id: Some(reservation_id),
        });
    }

    let resource = lock_resource(&txn, existing.resource_id).await?;
    let target = get_slot_context(&txn, existing.slot_id).await?;
    let report = compute_report(&txn, &resource, &target, strategy, &[reservation_id]).await?;
    ensure_fits(&report, request.quantity)?;

    let mut reservation: resource_reservation::ActiveModel = existing.into();
    reservation.quantity = Set(request.quantity);
    reservation.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = reservation.update(&txn).await?;

    txn.commit().await?;
    info!(
        "Reservation {} now holds {} unit(s)",
        reservation_id, updated.quantity
    );
    Ok(updated)
}

/// Fails with `InsufficientCapacity` when the reservations held by a slot no
/// longer fit once the slot moves.
///
/// `moved` carries the slot's new placement before it is written. The slot's
/// own reservations are left out of the reserved totals, and every resource
/// they draw from is locked, in id order, for the rest of the transaction.
pub(crate) async fn ensure_moved_slot_fits<C>(
    db: &C,
    moved: &SlotContext,
    strategy: ProjectionStrategy,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let held = ResourceReservation::find()
        .filter(resource_reservation::Column::SlotId.eq(moved.slot.id))
        .filter(resource_reservation::Column::Status.ne(ReservationStatus::Cancelled))
        .all(db)
        .await?;

    let mut by_resource: BTreeMap<i64, (i32, Vec<i64>)> = BTreeMap::new();
    for reservation in &held {
        let entry = by_resource.entry(reservation.resource_id).or_default();
        entry.0 += reservation.quantity;
        entry.1.push(reservation.id);
    }

    for (resource_id, (quantity, own)) in by_resource {
        let resource = lock_resource(db, resource_id).await?;
        let report = compute_report(db, &resource, moved, strategy, &own).await?;
        ensure_fits(&report, quantity)?;
    }
    Ok(())
}

/// Deletes a reservation; its units are free for the next check immediately.
pub async fn release(db: &DatabaseConnection, reservation_id: i64) -> Result<()> {
    let reservation = get_reservation(db, reservation_id).await?;
    reservation.delete(db).await?;
    info!("Released reservation {}", reservation_id);
    Ok(())
}

/// Marks a reservation cancelled, keeping the row but freeing its units.
pub async fn cancel_reservation(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<resource_reservation::Model> {
    let mut reservation: resource_reservation::ActiveModel =
        get_reservation(db, reservation_id).await?.into();
    reservation.status = Set(ReservationStatus::Cancelled);
    reservation.updated_at = Set(chrono::Utc::now().naive_utc());
    let cancelled = reservation.update(db).await?;
    info!("Cancelled reservation {}", reservation_id);
    Ok(cancelled)
}

/// Retrieves a reservation, failing with `EntityNotFound` when the id doesn't resolve.
pub async fn get_reservation<C>(db: &C, reservation_id: i64) -> Result<resource_reservation::Model>
where
    C: ConnectionTrait,
{
    ResourceReservation::find_by_id(reservation_id)
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "reservation",
            id: reservation_id,
        })
}

/// Lists every reservation bound to a slot, oldest first.
pub async fn reservations_for_slot<C>(
    db: &C,
    slot_id: i64,
) -> Result<Vec<resource_reservation::Model>>
where
    C: ConnectionTrait,
{
    get_slot(db, slot_id).await?;
    ResourceReservation::find()
        .filter(resource_reservation::Column::SlotId.eq(slot_id))
        .order_by_asc(resource_reservation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::weekday::Weekday;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    const FIRST: ProjectionStrategy = ProjectionStrategy::FirstOccurrence;

    fn request(resource_id: i64, slot_id: i64, formation_id: i64, quantity: i32) -> ReservationRequest {
        ReservationRequest {
            resource_id,
            slot_id,
            formation_id,
            quantity,
        }
    }

    /// Two formations whose Monday slots both project to 2024-01-08.
    async fn two_slots_same_day(
        db: &DatabaseConnection,
    ) -> Result<(resource::Model, Vec<(i64, i64)>)> {
        let resource = create_test_resource(db, "Projecteur", 5).await?;
        // F1 starts on Monday 2024-01-08, F2 on Wednesday 2024-01-03
        let f1 = create_test_formation(db, date(2024, 1, 8), date(2024, 2, 8)).await?;
        let f2 = create_test_formation(db, date(2024, 1, 3), date(2024, 3, 1)).await?;
        let (_, s1) = create_test_planning(db, f1.id, &[slot(Weekday::Monday, 9, 12, None)]).await?;
        let (_, s2) =
            create_test_planning(db, f2.id, &[slot(Weekday::Monday, 14, 17, None)]).await?;
        Ok((resource, vec![(s1[0].id, f1.id), (s2[0].id, f2.id)]))
    }

    #[tokio::test]
    async fn test_capacity_accounting_across_formations() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];
        let (s2, f2) = slots[1];

        reserve(&db, &request(resource.id, s1, f1, 2), FIRST).await?;
        reserve(&db, &request(resource.id, s2, f2, 2), FIRST).await?;

        let report = check_availability(&db, resource.id, s1, FIRST).await?;
        assert_eq!(report.session_date, date(2024, 1, 8));
        assert_eq!(report.total, 5);
        assert_eq!(report.reserved, 4);
        assert_eq!(report.available, 1);
        assert!(report.is_available);

        let err = reserve(&db, &request(resource.id, s2, f2, 2), FIRST)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientCapacity {
                available: 1,
                requested: 2
            }
        ));

        reserve(&db, &request(resource.id, s1, f1, 1), FIRST).await?;
        let report = check_availability(&db, resource.id, s2, FIRST).await?;
        assert_eq!(report.available, 0);
        assert!(!report.is_available);

        Ok(())
    }

    #[tokio::test]
    async fn test_release_frees_capacity_immediately() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];

        let first = reserve(&db, &request(resource.id, s1, f1, 2), FIRST).await?;
        reserve(&db, &request(resource.id, s1, f1, 3), FIRST).await?;
        assert_eq!(check_availability(&db, resource.id, s1, FIRST).await?.available, 0);

        release(&db, first.id).await?;
        assert_eq!(check_availability(&db, resource.id, s1, FIRST).await?.available, 2);

        assert!(matches!(
            release(&db, first.id).await.unwrap_err(),
            Error::EntityNotFound {
                entity: "reservation",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_reservations_do_not_count() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];

        let held = reserve(&db, &request(resource.id, s1, f1, 5), FIRST).await?;
        let cancelled = cancel_reservation(&db, held.id).await?;
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let report = check_availability(&db, resource.id, s1, FIRST).await?;
        assert_eq!(report.reserved, 0);
        assert_eq!(report.available, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_reservation_cannot_be_edited() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];

        let held = reserve(&db, &request(resource.id, s1, f1, 2), FIRST).await?;
        cancel_reservation(&db, held.id).await?;

        let err = update_reservation(&db, held.id, &request(resource.id, s1, f1, 1), FIRST)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ReservationCancelled { reservation_id } if reservation_id == held.id
        ));
        assert_eq!(err.status_code(), 400);

        let stored = get_reservation(&db, held.id).await?;
        assert_eq!(stored.status, ReservationStatus::Cancelled);
        assert_eq!(stored.quantity, 2);
        assert_eq!(check_availability(&db, resource.id, s1, FIRST).await?.reserved, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_different_session_dates_do_not_share_capacity() -> Result<()> {
        let db = setup_test_db().await?;
        let resource = create_test_resource(&db, "Tablette", 3).await?;
        // Monday 2024-01-01 vs Monday 2024-01-08
        let f1 = create_test_formation(&db, date(2024, 1, 1), date(2024, 1, 31)).await?;
        let f2 = create_test_formation(&db, date(2024, 1, 2), date(2024, 1, 31)).await?;
        let (_, s1) = create_test_planning(&db, f1.id, &[slot(Weekday::Monday, 9, 12, None)]).await?;
        let (_, s2) = create_test_planning(&db, f2.id, &[slot(Weekday::Monday, 9, 12, None)]).await?;

        reserve(&db, &request(resource.id, s1[0].id, f1.id, 3), FIRST).await?;
        let report = check_availability(&db, resource.id, s2[0].id, FIRST).await?;
        assert_eq!(report.session_date, date(2024, 1, 8));
        assert_eq!(report.available, 3);

        // same dates once every weekly occurrence counts
        let every = ProjectionStrategy::EveryOccurrence;
        let report = check_availability(&db, resource.id, s2[0].id, every).await?;
        assert_eq!(report.available, 0);
        assert_eq!(report.session_date, date(2024, 1, 8));
        let err = reserve(&db, &request(resource.id, s2[0].id, f2.id, 1), every)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientCapacity { available: 0, requested: 1 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_excludes_own_quantity() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];
        let (s2, f2) = slots[1];

        let mine = reserve(&db, &request(resource.id, s1, f1, 2), FIRST).await?;
        reserve(&db, &request(resource.id, s2, f2, 2), FIRST).await?;

        // 5 total, 2 held by the other reservation: growing to 3 fits
        let grown = update_reservation(&db, mine.id, &request(resource.id, s1, f1, 3), FIRST).await?;
        assert_eq!(grown.quantity, 3);
        assert_eq!(grown.created_at, mine.created_at);

        let err = update_reservation(&db, mine.id, &request(resource.id, s1, f1, 4), FIRST)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientCapacity {
                available: 3,
                requested: 4
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_mismatched_identifiers() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];
        let (s2, f2) = slots[1];

        let mine = reserve(&db, &request(resource.id, s1, f1, 1), FIRST).await?;
        for wrong in [
            request(resource.id + 1, s1, f1, 1),
            request(resource.id, s2, f1, 1),
            request(resource.id, s1, f2, 1),
        ] {
            let err = update_reservation(&db, mine.id, &wrong, FIRST).await.unwrap_err();
            assert!(matches!(
                err,
                Error::ReservationMismatch { reservation_id: Some(id) } if id == mine.id
            ));
        }

        let missing = update_reservation(&db, 999, &request(resource.id, s1, f1, 1), FIRST).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::EntityNotFound { entity: "reservation", id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_validates_references() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];
        let (_, f2) = slots[1];

        let cases = [
            (request(999, s1, f1, 1), "resource"),
            (request(resource.id, 999, f1, 1), "slot"),
            (request(resource.id, s1, 999, 1), "formation"),
        ];
        for (req, expected) in cases {
            let err = reserve(&db, &req, FIRST).await.unwrap_err();
            assert!(
                matches!(err, Error::EntityNotFound { entity, id: 999 } if entity == expected)
            );
        }

        // formation must be the slot's own
        let err = reserve(&db, &request(resource.id, s1, f2, 1), FIRST)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReservationMismatch { reservation_id: None }));
        Ok(())
    }

    #[tokio::test]
    async fn test_quantity_must_be_positive() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        for quantity in [0, -3] {
            let err = reserve(&db, &request(1, 1, 1, quantity), FIRST).await.unwrap_err();
            assert!(matches!(err, Error::InvalidQuantity { quantity: q } if q == quantity));
            let err = update_reservation(&db, 1, &request(1, 1, 1, quantity), FIRST)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidQuantity { .. }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_reservations_for_slot() -> Result<()> {
        let db = setup_test_db().await?;
        let (resource, slots) = two_slots_same_day(&db).await?;
        let (s1, f1) = slots[0];
        let (s2, _) = slots[1];

        let a = reserve(&db, &request(resource.id, s1, f1, 1), FIRST).await?;
        let b = reserve(&db, &request(resource.id, s1, f1, 2), FIRST).await?;
        assert_eq!(reservations_for_slot(&db, s1).await?, vec![a, b]);
        assert!(reservations_for_slot(&db, s2).await?.is_empty());
        assert!(reservations_for_slot(&db, 999).await.is_err());
        Ok(())
    }
}
