//! Weekday names and their index mapping.
//!
//! Slots are stored and exchanged with the French day names used by the training
//! center (`Lundi` .. `Dimanche`). This enum is the only place where those names
//! are tied to calendar weekdays. The canonical index is Sunday-based
//! (`Dimanche` = 0 .. `Samedi` = 6), matching [`chrono::Weekday::num_days_from_sunday`].

use crate::errors::{Error, Result};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Day of the week a recurring slot repeats on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Weekday {
    /// Dimanche
    #[sea_orm(string_value = "Dimanche")]
    #[serde(rename = "Dimanche")]
    Sunday,
    /// Lundi
    #[sea_orm(string_value = "Lundi")]
    #[serde(rename = "Lundi")]
    Monday,
    /// Mardi
    #[sea_orm(string_value = "Mardi")]
    #[serde(rename = "Mardi")]
    Tuesday,
    /// Mercredi
    #[sea_orm(string_value = "Mercredi")]
    #[serde(rename = "Mercredi")]
    Wednesday,
    /// Jeudi
    #[sea_orm(string_value = "Jeudi")]
    #[serde(rename = "Jeudi")]
    Thursday,
    /// Vendredi
    #[sea_orm(string_value = "Vendredi")]
    #[serde(rename = "Vendredi")]
    Friday,
    /// Samedi
    #[sea_orm(string_value = "Samedi")]
    #[serde(rename = "Samedi")]
    Saturday,
}

/// Lookup table ordered by Sunday-based index.
const TABLE: [(Weekday, &str, chrono::Weekday); 7] = [
    (Weekday::Sunday, "Dimanche", chrono::Weekday::Sun),
    (Weekday::Monday, "Lundi", chrono::Weekday::Mon),
    (Weekday::Tuesday, "Mardi", chrono::Weekday::Tue),
    (Weekday::Wednesday, "Mercredi", chrono::Weekday::Wed),
    (Weekday::Thursday, "Jeudi", chrono::Weekday::Thu),
    (Weekday::Friday, "Vendredi", chrono::Weekday::Fri),
    (Weekday::Saturday, "Samedi", chrono::Weekday::Sat),
];

impl Weekday {
    /// All days, Sunday first.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Sunday-based index, `0` for Sunday through `6` for Saturday.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Inverse of [`Weekday::index`]. Only `0..=6` are accepted; a Sunday
    /// written as `7` must go through [`Weekday::from_iso_index`].
    #[must_use]
    pub const fn from_index(index: u32) -> Option<Self> {
        if index < 7 {
            Some(TABLE[index as usize].0)
        } else {
            None
        }
    }

    /// ISO-8601 index, `1` for Monday through `7` for Sunday.
    #[must_use]
    pub const fn iso_index(self) -> u32 {
        match self {
            Self::Sunday => 7,
            other => other as u32,
        }
    }

    /// Inverse of [`Weekday::iso_index`].
    #[must_use]
    pub const fn from_iso_index(index: u32) -> Option<Self> {
        match index {
            7 => Some(Self::Sunday),
            1..=6 => Some(TABLE[index as usize].0),
            _ => None,
        }
    }

    /// Canonical French name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        TABLE[self as usize].1
    }

    /// Matching `chrono` weekday.
    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        TABLE[self as usize].2
    }

    /// Converts from a `chrono` weekday.
    #[must_use]
    pub fn from_chrono(day: chrono::Weekday) -> Self {
        TABLE[day.num_days_from_sunday() as usize].0
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    /// Parses a French day name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        TABLE
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(day, _, _)| *day)
            .ok_or_else(|| Error::UnknownWeekday {
                value: s.to_string(),
            })
    }
}
