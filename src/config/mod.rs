/// Database configuration and connection management
pub mod database;

/// Scheduling engine settings from scheduling.toml
pub mod scheduling;
