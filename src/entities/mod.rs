//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod formation;
pub mod planning;
pub mod recurring_slot;
pub mod resource;
pub mod resource_reservation;
pub mod room;

// Re-export specific types to avoid conflicts
pub use formation::{Column as FormationColumn, Entity as Formation, Model as FormationModel};
pub use planning::{
    Column as PlanningColumn, Entity as Planning, Model as PlanningModel, PlanningStatus,
};
pub use recurring_slot::{
    Column as RecurringSlotColumn, Entity as RecurringSlot, Model as RecurringSlotModel,
};
pub use resource::{Column as ResourceColumn, Entity as Resource, Model as ResourceModel};
pub use resource_reservation::{
    Column as ReservationColumn, Entity as ResourceReservation, Model as ReservationModel,
    ReservationStatus,
};
pub use room::{Column as RoomColumn, Entity as Room, Model as RoomModel};
