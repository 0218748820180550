//! Resource reservation entity - Units of a resource booked for one slot.
//!
//! For every resource and concrete session date, the quantities of all
//! non-cancelled reservations whose slot projects to that date never exceed the
//! resource's total quantity. `formation_id` duplicates the slot's planning
//! formation and must always agree with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Holding its quantity
    #[sea_orm(string_value = "reserved")]
    Reserved,
    /// Kept for history, no longer counted against capacity
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Resource reservation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resource_reservations")]
pub struct Model {
    /// Unique identifier for the reservation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reserved resource
    pub resource_id: i64,
    /// Slot the units are needed for
    pub slot_id: i64,
    /// Formation of the slot's planning
    pub formation_id: i64,
    /// Number of units, at least 1
    pub quantity: i32,
    /// Lifecycle state
    pub status: ReservationStatus,
    /// When the reservation was created
    pub created_at: DateTime,
    /// When the reservation was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between ResourceReservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reservation draws from one resource
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
    /// Each reservation is bound to one slot
    #[sea_orm(
        belongs_to = "super::recurring_slot::Entity",
        from = "Column::SlotId",
        to = "super::recurring_slot::Column::Id"
    )]
    Slot,
    /// Each reservation is for one formation
    #[sea_orm(
        belongs_to = "super::formation::Entity",
        from = "Column::FormationId",
        to = "super::formation::Column::Id"
    )]
    Formation,
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl Related<super::recurring_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slot.def()
    }
}

impl Related<super::formation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Formation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
