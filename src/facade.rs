//! Scheduling facade - the entry point used by the CRUD layer.
//!
//! Requests arrive as the typed payloads of [`crate::models`]; the facade parses
//! them with the configured time policy and delegates to [`crate::core`]. Every
//! failure comes back as an [`Error`] whose [`Error::status_code`] and
//! [`Error::to_body`] give the HTTP answer.

use crate::{
    config::scheduling::SchedulingConfig,
    core::{
        capacity::{self, AvailabilityReport},
        formation::get_formation,
        planning,
        room::{self, RoomPlacement},
        slot::{self, SlotSpec},
        time::normalize_time,
        weekday::Weekday,
    },
    entities::{resource_reservation, room as room_entity},
    errors::{Error, Result},
    models::{
        AvailabilityQuery, PlanningRequest, PlanningResponse, PlanningStatusRequest,
        ReservationRequest, SlotPlacementRequest, SlotRequest, SlotResponse,
    },
};
use sea_orm::DatabaseConnection;
use tracing::{instrument, warn};

/// Scheduling engine bound to a database and a configuration.
#[derive(Debug)]
pub struct SchedulingFacade {
    /// Database connection for all operations
    database: DatabaseConnection,
    /// Engine settings
    config: SchedulingConfig,
}

impl SchedulingFacade {
    /// Creates a facade over `database` with `config`.
    #[must_use]
    pub const fn new(database: DatabaseConnection, config: SchedulingConfig) -> Self {
        Self { database, config }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> SchedulingConfig {
        self.config
    }

    fn parse_slots(&self, slots: &[SlotRequest]) -> Result<Vec<SlotSpec>> {
        slots
            .iter()
            .map(|slot| slot.parse(self.config.time_policy))
            .collect()
    }

    /// Checks that a slot can be placed in a room; `RoomConflict` otherwise,
    /// `EntityNotFound` for an unknown room or formation.
    #[instrument(skip(self))]
    pub async fn validate_slot_placement(&self, request: &SlotPlacementRequest) -> Result<()> {
        let weekday: Weekday = request.weekday.parse()?;
        let start_time = normalize_time(&request.start_time, self.config.time_policy)?;
        let end_time = normalize_time(&request.end_time, self.config.time_policy)?;
        SlotSpec::new(weekday, start_time, end_time, Some(request.room_id))?;
        let formation = get_formation(&self.database, request.formation_id).await?;
        room::get_room(&self.database, request.room_id).await?;

        let placement = RoomPlacement {
            room_id: request.room_id,
            weekday,
            start_time,
            end_time,
            start_date: formation.start_date,
            end_date: formation.end_date,
            exclude_slot_id: request.exclude_slot_id,
        };
        match room::find_room_conflict(&self.database, &placement).await? {
            Some(existing) => {
                warn!(
                    "Placement in room {} conflicts with slot {}",
                    request.room_id, existing.id
                );
                Err(Error::RoomConflict {
                    room_id: request.room_id,
                    weekday,
                    conflicting_slot_id: Some(existing.id),
                })
            }
            None => Ok(()),
        }
    }

    /// Lists rooms free for a slot of the given formation.
    #[instrument(skip(self))]
    pub async fn available_rooms(
        &self,
        formation_id: i64,
        slot: &SlotRequest,
    ) -> Result<Vec<room_entity::Model>> {
        let spec = slot.parse(self.config.time_policy)?;
        let formation = get_formation(&self.database, formation_id).await?;
        room::available_rooms(
            &self.database,
            spec.weekday,
            spec.start_time,
            spec.end_time,
            formation.start_date,
            formation.end_date,
        )
        .await
    }

    /// Creates a planning with all of its slots, or nothing at all.
    #[instrument(skip(self))]
    pub async fn submit_planning(&self, request: &PlanningRequest) -> Result<PlanningResponse> {
        // every slot must parse before anything touches the database
        let specs = self.parse_slots(&request.slots)?;
        let (planning, slots) = planning::submit_planning(
            &self.database,
            request.formation_id,
            request.trainer_id,
            &specs,
        )
        .await?;
        Ok(PlanningResponse {
            planning,
            slots: slots.into_iter().map(SlotResponse::from).collect(),
        })
    }

    /// Adds one slot to an existing planning.
    #[instrument(skip(self))]
    pub async fn add_slot(&self, planning_id: i64, request: &SlotRequest) -> Result<SlotResponse> {
        let spec = request.parse(self.config.time_policy)?;
        slot::add_slot(&self.database, planning_id, spec)
            .await
            .map(SlotResponse::from)
    }

    /// Edits one slot; the slot never conflicts with its own previous placement.
    /// A weekday change re-checks the slot's reservations on their new dates.
    #[instrument(skip(self))]
    pub async fn update_slot(&self, slot_id: i64, request: &SlotRequest) -> Result<SlotResponse> {
        let spec = request.parse(self.config.time_policy)?;
        slot::update_slot(&self.database, slot_id, spec, self.config.projection)
            .await
            .map(SlotResponse::from)
    }

    /// Deletes a slot and its reservations. Returns the number of reservations removed.
    #[instrument(skip(self))]
    pub async fn delete_slot(&self, slot_id: i64) -> Result<u64> {
        slot::delete_slot(&self.database, slot_id).await
    }

    /// Records the trainer's answer to a planning.
    #[instrument(skip(self))]
    pub async fn set_planning_status(
        &self,
        planning_id: i64,
        request: &PlanningStatusRequest,
    ) -> Result<PlanningResponse> {
        let planning = planning::set_planning_status(
            &self.database,
            planning_id,
            request.status,
            request.rejection_reason.clone(),
        )
        .await?;
        let slots = slot::get_slots_for_planning(&self.database, planning_id).await?;
        Ok(PlanningResponse {
            planning,
            slots: slots.into_iter().map(SlotResponse::from).collect(),
        })
    }

    /// Deletes a planning, its slots, and their reservations.
    /// Returns the number of reservations removed.
    #[instrument(skip(self))]
    pub async fn delete_planning(&self, planning_id: i64) -> Result<u64> {
        planning::delete_planning(&self.database, planning_id).await
    }

    /// Remaining capacity of a resource on a slot's session date.
    #[instrument(skip(self))]
    pub async fn get_resource_availability(
        &self,
        query: AvailabilityQuery,
    ) -> Result<AvailabilityReport> {
        capacity::check_availability(
            &self.database,
            query.resource_id,
            query.slot_id,
            self.config.projection,
        )
        .await
    }

    /// Reserves units of a resource for a slot.
    #[instrument(skip(self))]
    pub async fn reserve_resource(
        &self,
        request: &ReservationRequest,
    ) -> Result<resource_reservation::Model> {
        capacity::reserve(&self.database, request, self.config.projection).await
    }

    /// Changes the quantity of a reservation.
    #[instrument(skip(self))]
    pub async fn update_reservation(
        &self,
        reservation_id: i64,
        request: &ReservationRequest,
    ) -> Result<resource_reservation::Model> {
        capacity::update_reservation(
            &self.database,
            reservation_id,
            request,
            self.config.projection,
        )
        .await
    }

    /// Deletes a reservation, freeing its units.
    #[instrument(skip(self))]
    pub async fn delete_reservation(&self, reservation_id: i64) -> Result<()> {
        capacity::release(&self.database, reservation_id).await
    }

    /// Cancels a reservation, keeping it for history.
    #[instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<resource_reservation::Model> {
        capacity::cancel_reservation(&self.database, reservation_id).await
    }

    /// Reservations bound to a slot.
    #[instrument(skip(self))]
    pub async fn reservations_for_slot(
        &self,
        slot_id: i64,
    ) -> Result<Vec<resource_reservation::Model>> {
        capacity::reservations_for_slot(&self.database, slot_id).await
    }
}
