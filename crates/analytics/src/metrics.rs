use crate::error::AnalyticsError;
use crate::matrix::{AlignedMatrix, AssetColumn};
use crate::returns::{observation_count, simple_returns};
use crate::stats;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fewer defined daily returns than this and an asset gets no metrics.
pub const MIN_VALID_RETURNS: usize = 2;

/// The default number of trading days per year.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// A single daily return and the date it was realised on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayReturn {
    pub date: NaiveDate,
    pub return_pct: f64,
}

/// Return and risk figures for one asset over the matrix window.
///
/// All figures are percentages. Each asset is measured between its own first
/// and last valid price, so assets listed part-way through the window are
/// measured over their own, shorter history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsResult {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub annualized_volatility_pct: f64,
    /// Always `<= 0`; `0` means the asset never traded below a previous peak.
    pub max_drawdown_pct: f64,
    pub best_day: DayReturn,
    pub worst_day: DayReturn,
    /// Intervals between the first and last valid price (see [`observation_count`]).
    pub observation_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Per-asset outcome. An asset without enough data carries its error instead
/// of a result; the other assets are unaffected.
pub type MetricsByAsset = BTreeMap<String, Result<MetricsResult, AnalyticsError>>;

/// Computes [`MetricsResult`] for every asset of the matrix.
pub fn compute_metrics(matrix: &AlignedMatrix, periods_per_year: u32) -> MetricsByAsset {
    matrix
        .columns()
        .iter()
        .map(|column| {
            let result = asset_metrics(matrix.dates(), column, periods_per_year);
            if let Err(err) = &result {
                tracing::warn!(asset = column.label(), error = %err, "Metrics unavailable");
            }
            (column.label().to_string(), result)
        })
        .collect()
}

/// Computes the metrics of one column laid out on `dates`.
///
/// `dates` must have one entry per slot of `column`, as in an `AlignedMatrix`.
pub(crate) fn asset_metrics(
    dates: &[NaiveDate],
    column: &AssetColumn,
    periods_per_year: u32,
) -> Result<MetricsResult, AnalyticsError> {
    let prices = column.values();
    let returns = simple_returns(prices);
    let valid: Vec<(NaiveDate, f64)> = dates
        .iter()
        .zip(&returns)
        .filter_map(|(date, r)| r.map(|r| (*date, r)))
        .collect();

    if valid.len() < MIN_VALID_RETURNS {
        return Err(AnalyticsError::InsufficientData {
            subject: column.label().to_string(),
            required: MIN_VALID_RETURNS,
            found: valid.len(),
            measure: "valid returns",
        });
    }

    // Two valid returns imply at least two valid prices.
    let (Some((first_idx, first_price)), Some((last_idx, last_price))) =
        (column.first_valid(), column.last_valid())
    else {
        return Err(AnalyticsError::InsufficientData {
            subject: column.label().to_string(),
            required: 2,
            found: column.valid_count(),
            measure: "valid prices",
        });
    };

    let total_return = last_price / first_price - 1.0;
    let observations = observation_count(prices);
    let annualized_return =
        (1.0 + total_return).powf(f64::from(periods_per_year) / observations as f64) - 1.0;

    let values: Vec<f64> = valid.iter().map(|(_, r)| *r).collect();
    let volatility = stats::sample_std(&values).unwrap_or(0.0) * f64::from(periods_per_year).sqrt();

    let max_drawdown = stats::drawdown_path(prices)
        .into_iter()
        .flatten()
        .fold(0.0_f64, f64::min);

    let (best, worst) = extremes(&valid);

    tracing::debug!(
        asset = column.label(),
        total_return,
        observations,
        "Computed asset metrics"
    );

    Ok(MetricsResult {
        total_return_pct: total_return * 100.0,
        annualized_return_pct: annualized_return * 100.0,
        annualized_volatility_pct: volatility * 100.0,
        max_drawdown_pct: max_drawdown * 100.0,
        best_day: best,
        worst_day: worst,
        observation_count: observations,
        first_date: dates[first_idx],
        last_date: dates[last_idx],
    })
}

/// Best and worst day; ties go to the earliest date.
fn extremes(valid: &[(NaiveDate, f64)]) -> (DayReturn, DayReturn) {
    let (first_date, first_return) = valid[0];
    let mut best = (first_date, first_return);
    let mut worst = (first_date, first_return);
    for &(date, r) in &valid[1..] {
        if r > best.1 {
            best = (date, r);
        }
        if r < worst.1 {
            worst = (date, r);
        }
    }
    let to_day = |(date, r): (NaiveDate, f64)| DayReturn {
        date,
        return_pct: r * 100.0,
    };
    (to_day(best), to_day(worst))
}
