//! Planning entity - A trainer's assignment to a formation.
//!
//! A planning owns its recurring slots and goes through an approval workflow:
//! pending, then accepted or refused. A refused planning always carries the
//! reason it was refused.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval state of a planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PlanningStatus {
    /// Awaiting the trainer's answer
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the trainer
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Refused, see `rejection_reason`
    #[sea_orm(string_value = "refused")]
    Refused,
}

/// Planning database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plannings")]
pub struct Model {
    /// Unique identifier for the planning
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Formation being planned
    pub formation_id: i64,
    /// Trainer assigned (user identifier owned by the CRUD layer)
    pub trainer_id: i64,
    /// Approval state
    pub status: PlanningStatus,
    /// Why the planning was refused; set only when `status` is `Refused`
    pub rejection_reason: Option<String>,
}

/// Defines relationships between Planning and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each planning belongs to one formation
    #[sea_orm(
        belongs_to = "super::formation::Entity",
        from = "Column::FormationId",
        to = "super::formation::Column::Id"
    )]
    Formation,
    /// One planning owns many recurring slots
    #[sea_orm(has_many = "super::recurring_slot::Entity")]
    Slots,
}

impl Related<super::formation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Formation.def()
    }
}

impl Related<super::recurring_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
