//! Scheduling engine settings loaded from a TOML file.
//!
//! ```toml
//! [scheduling]
//! time_parsing = "strict"        # or "lenient"
//! fallback_time = "09:00"        # used by "lenient" only
//! projection = "first_occurrence" # or "every_occurrence"
//! ```
//!
//! Every key is optional. The file itself is optional when loaded from the
//! default location.

use crate::core::{
    projector::ProjectionStrategy,
    time::{TimeParsePolicy, parse_time},
};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "SCHEDULING_CONFIG";

/// Configuration file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "scheduling.toml";

/// Validated engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulingConfig {
    /// Handling of unparseable time strings
    pub time_policy: TimeParsePolicy,
    /// Which dates a recurring slot occupies for capacity accounting
    pub projection: ProjectionStrategy,
}

/// Structure representing the whole configuration file
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    scheduling: RawScheduling,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum TimeParsing {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum Projection {
    #[default]
    FirstOccurrence,
    EveryOccurrence,
}

#[derive(Debug, Deserialize, Default)]
struct RawScheduling {
    #[serde(default)]
    time_parsing: TimeParsing,
    fallback_time: Option<String>,
    #[serde(default)]
    projection: Projection,
}

impl RawScheduling {
    fn validate(self) -> Result<SchedulingConfig> {
        let fallback = parse_time(self.fallback_time.as_deref().unwrap_or("09:00")).map_err(
            |e| Error::Config {
                message: format!("Invalid fallback_time: {e}"),
            },
        )?;

        let time_policy = match self.time_parsing {
            TimeParsing::Strict => TimeParsePolicy::Strict,
            TimeParsing::Lenient => TimeParsePolicy::Lenient { fallback },
        };
        let projection = match self.projection {
            Projection::FirstOccurrence => ProjectionStrategy::FirstOccurrence,
            Projection::EveryOccurrence => ProjectionStrategy::EveryOccurrence,
        };

        Ok(SchedulingConfig {
            time_policy,
            projection,
        })
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<SchedulingConfig> {
    let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse scheduling config: {e}"),
    })?;
    file.scheduling.validate()
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is malformed, or a
/// value is out of range.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SchedulingConfig> {
    let path_ref = path.as_ref();
    debug!("Loading scheduling configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `$SCHEDULING_CONFIG`, or from `./scheduling.toml`
/// when it exists, or falls back to the defaults.
pub fn load_default_config() -> Result<SchedulingConfig> {
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => return load_config(path),
        Err(std::env::VarError::NotPresent) => {}
        Err(e) => return Err(e.into()),
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_config(DEFAULT_CONFIG_PATH);
    }
    info!("No {} found, using default scheduling configuration", DEFAULT_CONFIG_PATH);
    Ok(SchedulingConfig::default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, SchedulingConfig::default());
        assert_eq!(config.time_policy, TimeParsePolicy::Strict);
        assert_eq!(config.projection, ProjectionStrategy::FirstOccurrence);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [scheduling]
            time_parsing = "lenient"
            fallback_time = "8h30"
            projection = "every_occurrence"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(
            config.time_policy,
            TimeParsePolicy::Lenient {
                fallback: NaiveTime::from_hms_opt(8, 30, 0).unwrap()
            }
        );
        assert_eq!(config.projection, ProjectionStrategy::EveryOccurrence);
    }

    #[test]
    fn test_lenient_defaults_to_nine() {
        let config = parse_config("[scheduling]\ntime_parsing = \"lenient\"\n").unwrap();
        assert_eq!(
            config.time_policy,
            TimeParsePolicy::Lenient {
                fallback: NaiveTime::from_hms_opt(9, 0, 0).unwrap()
            }
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_fallback = "[scheduling]\nfallback_time = \"25:00\"\n";
        assert!(matches!(
            parse_config(bad_fallback),
            Err(Error::Config { .. })
        ));

        let bad_projection = "[scheduling]\nprojection = \"monthly\"\n";
        assert!(matches!(
            parse_config(bad_projection),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/scheduling.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
