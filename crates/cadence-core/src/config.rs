use anyhow::Result;
use chrono::{FixedOffset, NaiveDateTime};
use config::Config;
use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: [&str; 11] = [
    "schedule.by_month",
    "schedule.by_month_day",
    "schedule.by_weekday",
    "schedule.by_year_day",
    "schedule.by_week_number",
    "schedule.by_hour",
    "schedule.by_minute",
    "schedule.by_second",
    "schedule.by_set_position",
    "schedule.rdates",
    "schedule.exdates",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// A recurrence described with serde-friendly primitives.
///
/// Frequency and weekday tags stay strings here; turning them into engine
/// types is up to the consumer.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Frequency tag such as `daily` or `MONTHLY`.
    pub frequency: String,
    pub start: NaiveDateTime,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<NaiveDateTime>,
    /// Weekday tag (`MO` .. `SU`) starting each week.
    pub week_start: Option<String>,
    /// Seconds east of UTC attached to printed occurrences.
    pub offset_seconds: Option<i32>,
    pub by_month: Option<Vec<u32>>,
    pub by_month_day: Option<Vec<i32>>,
    /// BYDAY notation, e.g. `MO` or `-1FR`.
    pub by_weekday: Option<Vec<String>>,
    pub by_year_day: Option<Vec<i32>>,
    pub by_week_number: Option<Vec<i32>>,
    pub by_hour: Option<Vec<u32>>,
    pub by_minute: Option<Vec<u32>>,
    pub by_second: Option<Vec<u32>>,
    pub by_set_position: Option<Vec<i32>>,
    /// Extra occurrences merged into the schedule.
    #[serde(default)]
    pub rdates: Vec<NaiveDateTime>,
    /// Occurrences removed from the schedule.
    #[serde(default)]
    pub exdates: Vec<NaiveDateTime>,
    /// Number of occurrences the binary prints.
    pub preview: usize,
}

impl ScheduleConfig {
    /// ## Summary
    /// Resolves `offset_seconds` into a fixed offset.
    ///
    /// ## Errors
    /// Returns `InvalidInput` if the offset is a day or more away from UTC.
    pub fn offset(&self) -> CoreResult<Option<FixedOffset>> {
        self.offset_seconds
            .map(|seconds| {
                FixedOffset::east_opt(seconds).ok_or_else(|| {
                    CoreError::InvalidInput(format!("offset of {seconds} seconds is out of range"))
                })
            })
            .transpose()
    }

    /// ## Summary
    /// Checks settings that only make sense together.
    ///
    /// ## Errors
    /// Returns `ConfigError` if both `count` and `until` are set, since a
    /// schedule file cannot express which one should win.
    pub fn validate(&self) -> CoreResult<()> {
        if self.count.is_some() && self.until.is_some() {
            return Err(CoreError::ConfigError(
                "schedule.count and schedule.until are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Settings {
    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("schedule.interval", 1)?
            .set_default("schedule.preview", 10)?)
    }

    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into a `Settings`.
    ///
    /// Environment variables use the `CADENCE_` prefix and `__` between
    /// nesting levels, e.g. `CADENCE_SCHEDULE__BY_MONTH_DAY=1,15`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let environment = LIST_KEYS.iter().fold(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .ignore_empty(true)
                .try_parsing(true),
            |env, key| env.with_list_parse_key(key),
        );

        Ok(Self::builder()?
            .add_source(environment)
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds `Settings` from a TOML document on top of the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document is malformed or misses required keys.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(Self::builder()?
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(frequency = %settings.schedule.frequency, "Schedule configuration loaded");
    Ok(settings)
}
