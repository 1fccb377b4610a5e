//! Small numeric helpers shared by the metrics, correlation and transform modules.
//!
//! Every helper works on slices of values that are already known to be present;
//! callers decide how missing observations are excluded.

/// Standard deviations at or below this are treated as zero variance.
pub(crate) const ZERO_VARIANCE: f64 = 1e-12;

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample (n - 1) standard deviation. `None` for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Drawdown of each valid price from the running peak of the valid prices
/// before and including it, as a fraction (`0.0` at a new peak, negative below).
///
/// Missing prices stay missing and do not move the peak.
pub(crate) fn drawdown_path(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut peak: Option<f64> = None;
    prices
        .iter()
        .map(|price| {
            let price = (*price)?;
            let running = match peak {
                Some(p) if p >= price => p,
                _ => price,
            };
            peak = Some(running);
            Some(price / running - 1.0)
        })
        .collect()
}
