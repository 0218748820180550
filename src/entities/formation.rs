//! Formation entity - A training course with a bounded date range.
//!
//! The start date anchors every recurring slot planned for the formation: a
//! weekday's session date is its first occurrence on or after `start_date`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Formation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "formations")]
pub struct Model {
    /// Unique identifier for the formation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title shown to trainees
    pub title: String,
    /// First day of the formation (inclusive)
    pub start_date: Date,
    /// Last day of the formation (inclusive), never before `start_date`
    pub end_date: Date,
}

/// Defines relationships between Formation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One formation has many plannings
    #[sea_orm(has_many = "super::planning::Entity")]
    Plannings,
    /// Reservations reference their formation directly
    #[sea_orm(has_many = "super::resource_reservation::Entity")]
    Reservations,
}

impl Related<super::planning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plannings.def()
    }
}

impl Related<super::resource_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
