//! Recurring slot entity - One weekly time slot of a planning ("planning jour").
//!
//! Each slot repeats on `weekday` between `start_time` and `end_time` for the
//! duration of its planning's formation, optionally in a room.

use crate::core::weekday::Weekday;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring slot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_slots")]
pub struct Model {
    /// Unique identifier for the slot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning planning
    pub planning_id: i64,
    /// Day of the week the slot repeats on
    pub weekday: Weekday,
    /// Start of the slot (inclusive)
    pub start_time: Time,
    /// End of the slot (exclusive), strictly after `start_time`
    pub end_time: Time,
    /// Room the slot takes place in, if any
    pub room_id: Option<i64>,
}

/// Defines relationships between RecurringSlot and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one planning
    #[sea_orm(
        belongs_to = "super::planning::Entity",
        from = "Column::PlanningId",
        to = "super::planning::Column::Id"
    )]
    Planning,
    /// Each slot may be assigned to one room
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    /// Reservations bound to this slot
    #[sea_orm(has_many = "super::resource_reservation::Entity")]
    Reservations,
}

impl Related<super::planning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Planning.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::resource_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
