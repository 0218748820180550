//! Unified error types for the scheduling engine.
//!
//! Every failure the engine can report is a variant of [`Error`]. The CRUD layer
//! embedding this crate maps errors to HTTP responses with [`Error::status_code`]
//! and [`Error::to_body`].

use crate::core::weekday::Weekday;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the scheduling engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A date string was not a valid ISO `YYYY-MM-DD` date
    #[error("Invalid date: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        /// The rejected input
        value: String,
    },

    /// A date range ends before it starts
    #[error("Invalid date range: {start} .. {end}")]
    InvalidDateRange {
        /// Range start
        start: chrono::NaiveDate,
        /// Range end
        end: chrono::NaiveDate,
    },

    /// A time string could not be read as a time of day
    #[error("Invalid time format: '{value}' (expected HH:MM)")]
    InvalidTimeFormat {
        /// The rejected input
        value: String,
    },

    /// A slot's end time is not strictly after its start time
    #[error("Invalid time range: {start} - {end} (end must be after start)")]
    InvalidTimeRange {
        /// Slot start, formatted `HH:MM`
        start: String,
        /// Slot end, formatted `HH:MM`
        end: String,
    },

    /// A weekday name did not match any canonical day
    #[error("Unknown weekday: '{value}'")]
    UnknownWeekday {
        /// The rejected input
        value: String,
    },

    /// A required name or title is blank
    #[error("The {entity} name cannot be empty")]
    InvalidName {
        /// Kind of entity being created
        entity: &'static str,
    },

    /// A reservation or resource quantity is out of range
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// The room is already booked for an overlapping slot
    #[error("Room {room_id} is already booked on {weekday}")]
    RoomConflict {
        /// Room that is double booked
        room_id: i64,
        /// Day of the conflicting placement
        weekday: Weekday,
        /// Stored slot in conflict, `None` when the conflict is inside one submission
        conflicting_slot_id: Option<i64>,
    },

    /// Not enough units of the resource remain for the session date
    #[error("Insufficient capacity: {available} available, {requested} requested")]
    InsufficientCapacity {
        /// Units still free
        available: i32,
        /// Units asked for
        requested: i32,
    },

    /// Identifiers in an update do not match the stored reservation
    #[error("Reservation request does not match the stored reservation or slot")]
    ReservationMismatch {
        /// Reservation being updated or created
        reservation_id: Option<i64>,
    },

    /// A cancelled reservation cannot be edited
    #[error("Reservation {reservation_id} is cancelled")]
    ReservationCancelled {
        /// The cancelled reservation
        reservation_id: i64,
    },

    /// An identifier does not resolve to a stored row
    #[error("{entity} {id} not found")]
    EntityNotFound {
        /// Kind of entity looked up
        entity: &'static str,
        /// Identifier that failed to resolve
        id: i64,
    },

    /// Refusing a planning requires a reason
    #[error("A rejection reason is required when refusing planning {planning_id}")]
    MissingRejectionReason {
        /// Planning being refused
        planning_id: i64,
    },

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// HTTP status the CRUD layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDate { .. }
            | Self::InvalidDateRange { .. }
            | Self::InvalidTimeFormat { .. }
            | Self::InvalidTimeRange { .. }
            | Self::UnknownWeekday { .. }
            | Self::InvalidName { .. }
            | Self::InvalidQuantity { .. }
            | Self::InsufficientCapacity { .. }
            | Self::ReservationMismatch { .. }
            | Self::ReservationCancelled { .. }
            | Self::MissingRejectionReason { .. } => 400,
            Self::EntityNotFound { .. } => 404,
            Self::RoomConflict { .. } => 409,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => 500,
        }
    }

    /// Structured body for the error response.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            error: self.to_string(),
            available: None,
            requested: None,
            conflicting_slot_id: None,
        };
        match self {
            Self::InsufficientCapacity {
                available,
                requested,
            } => {
                body.available = Some(*available);
                body.requested = Some(*requested);
            }
            Self::RoomConflict {
                conflicting_slot_id,
                ..
            } => body.conflicting_slot_id = *conflicting_slot_id,
            _ => {}
        }
        body
    }
}

/// JSON error payload handed back to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Human readable message
    pub error: String,
    /// Units still free, for capacity errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i32>,
    /// Units requested, for capacity errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i32>,
    /// Conflicting slot, for room conflicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_slot_id: Option<i64>,
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let conflict = Error::RoomConflict {
            room_id: 1,
            weekday: Weekday::Monday,
            conflicting_slot_id: Some(4),
        };
        assert_eq!(conflict.status_code(), 409);
        assert_eq!(
            Error::InsufficientCapacity {
                available: 1,
                requested: 2
            }
            .status_code(),
            400
        );
        assert_eq!(
            Error::EntityNotFound {
                entity: "resource",
                id: 3
            }
            .status_code(),
            404
        );
        assert_eq!(
            Error::ReservationMismatch {
                reservation_id: Some(1)
            }
            .status_code(),
            400
        );
        assert_eq!(Error::InvalidName { entity: "room" }.status_code(), 400);
        assert_eq!(
            Error::ReservationCancelled { reservation_id: 2 }.status_code(),
            400
        );
        assert_eq!(
            Error::Config {
                message: "bad".to_string()
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn test_capacity_error_body() {
        let body = Error::InsufficientCapacity {
            available: 1,
            requested: 2,
        }
        .to_body();
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["available"], 1);
        assert_eq!(json["requested"], 2);
        assert!(json.get("conflicting_slot_id").is_none());
    }

    #[test]
    fn test_conflict_error_body() {
        let body = Error::RoomConflict {
            room_id: 2,
            weekday: Weekday::Tuesday,
            conflicting_slot_id: Some(7),
        }
        .to_body();
        assert_eq!(body.conflicting_slot_id, Some(7));
        assert!(body.error.contains("Mardi"));
        assert!(body.available.is_none());
    }
}
