//! Room entity - An exclusive-use physical space ("salle").
//!
//! Rooms are never double booked: two slots on the same weekday with overlapping
//! hours and overlapping formation dates cannot share a room.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Room name, unique across the center
    #[sea_orm(unique)]
    pub name: String,
    /// Seating capacity, if known
    pub capacity: Option<i32>,
    /// Availability flag maintained by administrators
    pub is_available: bool,
}

/// Defines relationships between Room and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One room hosts many recurring slots
    #[sea_orm(has_many = "super::recurring_slot::Entity")]
    Slots,
}

impl Related<super::recurring_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
