//! Typed request and response payloads exchanged with the CRUD layer.
//!
//! Times arrive as `HH:MM` strings, dates as `YYYY-MM-DD`, and weekdays as the
//! French canonical names. Requests are parsed into engine types before any
//! scheduling logic runs.

use crate::{
    core::{
        slot::SlotSpec,
        time::{TimeParsePolicy, format_time, normalize_time},
        weekday::Weekday,
    },
    entities::{PlanningStatus, planning, recurring_slot},
    errors::Result,
};
use serde::{Deserialize, Serialize};

/// One slot of a planning submission or edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotRequest {
    /// French day name, e.g. `"Lundi"`
    pub weekday: String,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
    /// Room to book, if any
    #[serde(default)]
    pub room_id: Option<i64>,
}

impl SlotRequest {
    /// Parses the request into a validated [`SlotSpec`].
    pub fn parse(&self, policy: TimeParsePolicy) -> Result<SlotSpec> {
        let weekday: Weekday = self.weekday.parse()?;
        let start_time = normalize_time(&self.start_time, policy)?;
        let end_time = normalize_time(&self.end_time, policy)?;
        SlotSpec::new(weekday, start_time, end_time, self.room_id)
    }
}

/// Room placement check for a slot being created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotPlacementRequest {
    /// Room asked for
    pub room_id: i64,
    /// French day name
    pub weekday: String,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
    /// Formation whose dates the slot runs within
    pub formation_id: i64,
    /// Slot being edited, so it doesn't conflict with itself
    #[serde(default)]
    pub exclude_slot_id: Option<i64>,
}

/// A new planning with all of its slots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanningRequest {
    /// Formation being planned
    pub formation_id: i64,
    /// Trainer assigned
    pub trainer_id: i64,
    /// Weekly slots; all are stored or none are
    pub slots: Vec<SlotRequest>,
}

/// Approval answer for a planning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanningStatusRequest {
    /// New status
    pub status: PlanningStatus,
    /// Required when `status` is `refused`
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Availability query for one resource and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AvailabilityQuery {
    /// Resource asked about
    pub resource_id: i64,
    /// Slot whose session date is checked
    pub slot_id: i64,
}

/// Reservation create or update payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReservationRequest {
    /// Resource to reserve
    pub resource_id: i64,
    /// Slot the units are needed for
    pub slot_id: i64,
    /// Formation of the slot's planning
    pub formation_id: i64,
    /// Number of units, at least 1
    pub quantity: i32,
}

/// Slot as returned to clients, with `HH:MM` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotResponse {
    /// Slot id
    pub id: i64,
    /// Owning planning
    pub planning_id: i64,
    /// French day name
    pub weekday: Weekday,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
    /// Assigned room
    pub room_id: Option<i64>,
}

impl From<recurring_slot::Model> for SlotResponse {
    fn from(slot: recurring_slot::Model) -> Self {
        Self {
            id: slot.id,
            planning_id: slot.planning_id,
            weekday: slot.weekday,
            start_time: format_time(slot.start_time),
            end_time: format_time(slot.end_time),
            room_id: slot.room_id,
        }
    }
}

/// A planning together with its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanningResponse {
    /// The planning row
    pub planning: planning::Model,
    /// Its slots
    pub slots: Vec<SlotResponse>,
}
