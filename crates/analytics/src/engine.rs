use crate::align::align;
use crate::correlation::compute_correlation;
use crate::error::AnalyticsError;
use crate::matrix::AlignedMatrix;
use crate::metrics::compute_metrics;
use crate::proxies::{curve_slope_bps, spread_proxies};
use crate::report::AnalysisReport;
use crate::summary::{self, Performer};
use crate::transforms;
use configuration::{AnalysisConfig, Universe};
use core_types::{DateRange, RawSeries};
use std::collections::BTreeMap;

/// Key under which a failed yield alignment is reported in the warnings.
pub const YIELDS_WARNING_KEY: &str = "yields";

/// A stateless calculator running one full analysis request.
///
/// The engine owns nothing but its settings; every call builds its results
/// from the inputs and hands them back to the caller.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    config: AnalysisConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The main entry point for analysing a batch of series.
    ///
    /// # Arguments
    ///
    /// * `series` - Price series and, optionally, yield series from the data provider.
    /// * `range` - The inclusive reporting window.
    /// * `universe` - Used to group assets for the per-group leaders.
    ///
    /// # Returns
    ///
    /// An `AnalysisReport`, or an `AnalyticsError` when the request as a whole
    /// is unusable (bad range, malformed series, invalid settings). Problems
    /// with single assets are reported inside the report instead.
    pub fn run(
        &self,
        series: &[RawSeries],
        range: DateRange,
        universe: &Universe,
    ) -> Result<AnalysisReport, AnalyticsError> {
        if self.config.periods_per_year == 0 {
            return Err(AnalyticsError::InvalidParameter {
                reason: "periods_per_year must be greater than zero".to_string(),
            });
        }

        let (yield_series, price_series): (Vec<RawSeries>, Vec<RawSeries>) =
            series.iter().cloned().partition(|s| s.category.is_yield());

        tracing::info!(
            prices = price_series.len(),
            yields = yield_series.len(),
            start = %range.start,
            end = %range.end,
            "Starting analysis"
        );

        if price_series.is_empty() {
            return Err(AnalyticsError::InvalidParameter {
                reason: "no price series supplied; yields alone cannot be analysed".to_string(),
            });
        }

        let alignment = align(&price_series, self.config.fill_policy, range)?;
        let mut warnings = alignment.insufficient;
        let matrix = alignment.matrix;

        let yields = self.align_yields(&yield_series, range, &mut warnings)?;

        let metrics = compute_metrics(&matrix, self.config.periods_per_year);
        let correlation = compute_correlation(&matrix);
        let ranking = summary::rank_by_total_return(&metrics)
            .into_iter()
            .map(|(label, m)| Performer {
                label: label.to_string(),
                total_return_pct: m.total_return_pct,
            })
            .collect();
        let overview = summary::overview(&metrics);
        let group_leaders = summary::group_leaders(&metrics, &universe.group_labels());
        let proxies = spread_proxies(&metrics, &self.config.spread_proxies);
        let curve_slope = match (&yields, &self.config.yield_curve) {
            (Some(yields), Some(spec)) => curve_slope_bps(yields, spec),
            _ => None,
        };

        let report = AnalysisReport {
            range,
            fill_policy: self.config.fill_policy,
            view_mode: self.config.view_mode,
            view: transforms::view(&matrix, self.config.view_mode, self.config.normalize_base),
            drawdowns: transforms::drawdown_view(&matrix),
            rolling_volatility: transforms::rolling_volatility(
                &matrix,
                self.config.rolling_window,
                self.config.periods_per_year,
            )?,
            yields,
            metrics,
            ranking,
            overview,
            group_leaders,
            correlation,
            spread_proxies: proxies,
            curve_slope_bps: curve_slope,
            warnings,
        };

        tracing::info!(
            dates = matrix.len(),
            assets = matrix.columns().len(),
            partial = report.is_partial(),
            "Analysis complete"
        );

        Ok(report)
    }

    /// Yields are optional: an empty input or a window without any yield
    /// observation leaves them out with a warning. Sparse yield series are
    /// warned about like sparse prices. Malformed yield series still abort
    /// the request.
    fn align_yields(
        &self,
        yield_series: &[RawSeries],
        range: DateRange,
        warnings: &mut BTreeMap<String, AnalyticsError>,
    ) -> Result<Option<AlignedMatrix>, AnalyticsError> {
        if yield_series.is_empty() {
            return Ok(None);
        }
        match align(yield_series, self.config.fill_policy, range) {
            Ok(alignment) => {
                warnings.extend(alignment.insufficient);
                Ok(Some(alignment.matrix))
            }
            Err(err @ AnalyticsError::InvalidRange { .. }) => {
                tracing::warn!(error = %err, "No yield data in range");
                warnings.insert(YIELDS_WARNING_KEY.to_string(), err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use configuration::{AssetSpec, UniverseGroup};
    use core_types::{AssetCategory, PricePoint, ViewMode};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
    }

    fn series(label: &str, category: AssetCategory, prices: &[(u32, f64)]) -> RawSeries {
        RawSeries::new(
            label,
            label,
            category,
            prices.iter().map(|(day, p)| PricePoint::new(d(*day), *p)).collect(),
        )
    }

    fn asset(label: &str, ticker: &str) -> AssetSpec {
        AssetSpec {
            label: label.to_string(),
            ticker: ticker.to_string(),
        }
    }

    fn universe() -> Universe {
        Universe::new(vec![
            UniverseGroup {
                name: "YIELDS".to_string(),
                category: AssetCategory::Yield,
                assets: vec![asset("US 2Y Yield", "DGS2"), asset("US 10Y Yield", "DGS10")],
            },
            UniverseGroup {
                name: "BOND ETFs".to_string(),
                category: AssetCategory::BondEtf,
                assets: vec![asset("US IG Corporate", "LQD"), asset("US Govt Bonds 7-10Y", "IEF")],
            },
        ])
    }

    fn input() -> Vec<RawSeries> {
        vec![
            series("US IG Corporate", AssetCategory::BondEtf, &[(1, 100.0), (2, 101.0), (3, 100.5), (4, 102.0)]),
            series("US Govt Bonds 7-10Y", AssetCategory::BondEtf, &[(1, 95.0), (2, 95.5), (3, 95.2), (4, 96.0)]),
            series("US 2Y Yield", AssetCategory::Yield, &[(1, 4.1), (4, 4.0)]),
            series("US 10Y Yield", AssetCategory::Yield, &[(1, 3.9), (4, 4.2)]),
        ]
    }

    #[test]
    fn yields_are_kept_out_of_the_price_pipeline() {
        let engine = AnalyticsEngine::new(AnalysisConfig::default());
        let report = engine.run(&input(), DateRange::new(d(1), d(31)), &universe()).unwrap();

        assert_eq!(report.metrics.len(), 2);
        assert!(!report.metrics.contains_key("US 2Y Yield"));
        assert_eq!(report.view_mode, ViewMode::Normalized);
        assert_eq!(report.view.value("US IG Corporate", d(1)), Some(100.0));
        assert_eq!(report.spread_proxies.len(), 1);
        let slope = report.curve_slope_bps.unwrap();
        assert!((slope - 20.0).abs() < 1e-9);
        // The yield group is not ranked.
        assert_eq!(report.group_leaders.len(), 1);
        assert_eq!(report.group_leaders[0].group, "BOND ETFs");
        assert!(!report.is_partial());
    }

    #[test]
    fn missing_yield_category_is_not_an_error() {
        let engine = AnalyticsEngine::new(AnalysisConfig::default());
        let prices: Vec<RawSeries> = input().into_iter().filter(|s| !s.category.is_yield()).collect();
        let report = engine.run(&prices, DateRange::new(d(1), d(31)), &Universe::default()).unwrap();
        assert!(report.yields.is_none());
        assert!(report.curve_slope_bps.is_none());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn sparse_yield_series_is_warned_about() {
        let engine = AnalyticsEngine::new(AnalysisConfig::default());
        let mut data = input();
        data.retain(|s| s.label != "US 2Y Yield");
        data.push(series("US 2Y Yield", AssetCategory::Yield, &[(4, 4.0)]));

        let report = engine.run(&data, DateRange::new(d(1), d(31)), &universe()).unwrap();
        assert!(matches!(
            report.warnings.get("US 2Y Yield"),
            Some(AnalyticsError::InsufficientData { found: 1, .. })
        ));
        assert!(report.is_partial());
        assert!(report.yields.is_some());
    }

    #[test]
    fn yields_without_prices_are_rejected() {
        let engine = AnalyticsEngine::new(AnalysisConfig::default());
        let yields: Vec<RawSeries> = input().into_iter().filter(|s| s.category.is_yield()).collect();
        let err = engine
            .run(&yields, DateRange::new(d(1), d(31)), &universe())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter { .. }));
    }

    #[test]
    fn yields_outside_the_window_only_warn() {
        let engine = AnalyticsEngine::new(AnalysisConfig::default());
        let mut data = input();
        data.push(series("US 30Y Yield", AssetCategory::Yield, &[(20, 4.5)]));
        let data: Vec<RawSeries> = data
            .into_iter()
            .filter(|s| !s.category.is_yield() || s.label == "US 30Y Yield")
            .collect();
        let report = engine.run(&data, DateRange::new(d(1), d(10)), &universe()).unwrap();
        assert!(report.yields.is_none());
        assert!(matches!(
            report.warnings.get(YIELDS_WARNING_KEY),
            Some(AnalyticsError::InvalidRange { .. })
        ));
    }
}
