//! Resource entity - A shared pool of equipment (projectors, tablets, ...).
//!
//! `quantity` is the fixed capacity of the pool. Reservations never change it;
//! the reserved total is always derived from `resource_reservations`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resource database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    /// Unique identifier for the resource
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Projecteur")
    pub name: String,
    /// Total number of units owned
    pub quantity: i32,
}

/// Defines relationships between Resource and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One resource has many reservations
    #[sea_orm(has_many = "super::resource_reservation::Entity")]
    Reservations,
}

impl Related<super::resource_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
