use crate::correlation::CorrelationMatrix;
use crate::error::AnalyticsError;
use crate::matrix::AlignedMatrix;
use crate::metrics::MetricsByAsset;
use crate::proxies::SpreadProxy;
use crate::summary::{GroupLeaders, Overview, Performer};
use core_types::{DateRange, FillPolicy, ViewMode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything one analysis request produces, as plain data.
///
/// This struct is the final output of the `AnalyticsEngine` and is handed to
/// the reporting and presentation layers without any formatting applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    // I. Request
    pub range: DateRange,
    pub fill_policy: FillPolicy,
    pub view_mode: ViewMode,

    // II. Views
    /// The aligned prices, normalized or absolute per `view_mode`.
    pub view: AlignedMatrix,
    pub drawdowns: AlignedMatrix,
    pub rolling_volatility: AlignedMatrix,
    /// Aligned yield levels; `None` when no yield series was supplied.
    pub yields: Option<AlignedMatrix>,

    // III. Statistics
    pub metrics: MetricsByAsset,
    pub ranking: Vec<Performer>,
    pub overview: Overview,
    pub group_leaders: Vec<GroupLeaders>,
    pub correlation: CorrelationMatrix,

    // IV. Fixed income
    pub spread_proxies: Vec<SpreadProxy>,
    pub curve_slope_bps: Option<f64>,

    // V. Problems scoped to a single asset or input group
    pub warnings: BTreeMap<String, AnalyticsError>,
}

impl AnalysisReport {
    /// True when at least one asset or input group could not be fully analysed.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty() || self.metrics.values().any(Result::is_err)
    }
}
