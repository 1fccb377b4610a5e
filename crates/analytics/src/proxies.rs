use crate::matrix::AlignedMatrix;
use crate::metrics::MetricsByAsset;
use configuration::{SpreadProxySpec, YieldCurveSpec};
use serde::Serialize;

/// Total-return difference between a credit ETF and its government benchmark,
/// in percentage points. An indication of spread change, not an OAS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadProxy {
    pub name: String,
    pub value_pct_points: f64,
}

/// Evaluates every proxy whose two legs both produced metrics.
pub fn spread_proxies(metrics: &MetricsByAsset, specs: &[SpreadProxySpec]) -> Vec<SpreadProxy> {
    specs
        .iter()
        .filter_map(|spec| {
            let credit = metrics.get(&spec.credit)?.as_ref().ok()?;
            let government = metrics.get(&spec.government)?.as_ref().ok()?;
            Some(SpreadProxy {
                name: spec.name.clone(),
                value_pct_points: credit.total_return_pct - government.total_return_pct,
            })
        })
        .collect()
}

/// Long minus short yield at the end of the window, in basis points.
///
/// Each leg uses its own last valid value. Yields are quoted in percent.
pub fn curve_slope_bps(yields: &AlignedMatrix, spec: &YieldCurveSpec) -> Option<f64> {
    let (_, short) = yields.column(&spec.short)?.last_valid()?;
    let (_, long) = yields.column(&spec.long)?.last_valid()?;
    Some((long - short) * 100.0)
}
