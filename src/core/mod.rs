//! Core scheduling logic - framework-agnostic room and resource booking rules.

/// Resource capacity accounting per session date
pub mod capacity;
/// Formation lookups
pub mod formation;
/// Time-of-day and date-range overlap tests
pub mod overlap;
/// All-or-nothing planning submissions and approval workflow
pub mod planning;
/// Weekday to calendar date projection
pub mod projector;
/// Resource lookups and row locking
pub mod resource;
/// Room conflict detection
pub mod room;
/// Recurring slot validation and edits
pub mod slot;
/// Time and date string parsing
pub mod time;
/// French weekday names and index mapping
pub mod weekday;
