use crate::error::ConfigError;
use chrono::{Datelike, Days, NaiveDate};
use core_types::DateRange;
use serde::Deserialize;

/// The quick-select reporting windows offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Preset {
    #[serde(rename = "mtd")]
    #[cfg_attr(feature = "clap", value(name = "mtd"))]
    MonthToDate,
    #[serde(rename = "1m")]
    #[cfg_attr(feature = "clap", value(name = "1m"))]
    OneMonth,
    #[default]
    #[serde(rename = "3m")]
    #[cfg_attr(feature = "clap", value(name = "3m"))]
    ThreeMonths,
    #[serde(rename = "ytd")]
    #[cfg_attr(feature = "clap", value(name = "ytd"))]
    YearToDate,
    #[serde(rename = "1y")]
    #[cfg_attr(feature = "clap", value(name = "1y"))]
    OneYear,
    #[serde(rename = "custom")]
    #[cfg_attr(feature = "clap", value(name = "custom"))]
    Custom,
}

/// The `[period]` section: a preset, or explicit bounds when the preset is `custom`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodConfig {
    #[serde(default)]
    pub preset: Preset,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl PeriodConfig {
    /// Resolves the configured period against `today`.
    ///
    /// Rolling presets look back a fixed number of calendar days; the
    /// to-date presets start on the first day of the month or year.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, ConfigError> {
        let start = match self.preset {
            Preset::MonthToDate => today.with_day(1),
            Preset::OneMonth => today.checked_sub_days(Days::new(30)),
            Preset::ThreeMonths => today.checked_sub_days(Days::new(90)),
            Preset::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            Preset::OneYear => today.checked_sub_days(Days::new(365)),
            Preset::Custom => return self.resolve_custom(),
        };
        let start = start.ok_or_else(|| {
            ConfigError::ValidationError(format!("cannot resolve {:?} from {}", self.preset, today))
        })?;
        Ok(DateRange::new(start, today))
    }

    fn resolve_custom(&self) -> Result<DateRange, ConfigError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Ok(DateRange::new(start, end)),
            (Some(start), Some(end)) => Err(ConfigError::ValidationError(format!(
                "period start {} must be before end {}",
                start, end
            ))),
            _ => Err(ConfigError::ValidationError(
                "a custom period needs both `start` and `end`".to_string(),
            )),
        }
    }
}
