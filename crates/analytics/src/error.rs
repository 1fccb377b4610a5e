use chrono::NaiveDate;
use core_types::CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyticsError {
    #[error("Invalid date range {start} to {end}: {reason}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("Not enough data for '{subject}': need at least {required} {measure}, found {found}")]
    InsufficientData {
        subject: String,
        required: usize,
        found: usize,
        measure: &'static str,
    },

    #[error("Malformed series '{asset}': {reason}")]
    Alignment { asset: String, reason: String },

    /// Lists every compared asset whose returns were flat.
    #[error("Returns of {} have zero variance over the compared dates", .assets.join(", "))]
    ZeroVariance { assets: Vec<String> },

    #[error("Unknown asset '{asset}'")]
    UnknownAsset { asset: String },

    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

impl From<CoreError> for AnalyticsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(asset, reason) => AnalyticsError::Alignment { asset, reason },
            other => AnalyticsError::InvalidParameter {
                reason: other.to_string(),
            },
        }
    }
}
