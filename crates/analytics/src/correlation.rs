use crate::error::AnalyticsError;
use crate::matrix::AlignedMatrix;
use crate::returns::{ReturnSeries, daily_returns};
use crate::stats;
use serde::Serialize;

/// Fewer overlapping returns than this leave a pair undefined.
pub const MIN_OVERLAP: usize = 2;

/// Symmetric matrix of daily-return correlations.
///
/// A cell is either a coefficient in `[-1, 1]` or the reason it is undefined.
/// Undefined is never reported as `0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    assets: Vec<String>,
    cells: Vec<Result<f64, AnalyticsError>>,
}

impl CorrelationMatrix {
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// The cell for `(a, b)`, or `None` when either asset is unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<&Result<f64, AnalyticsError>> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.cells.get(i * self.assets.len() + j)
    }

    /// The coefficient for `(a, b)` when it is defined.
    pub fn value(&self, a: &str, b: &str) -> Option<f64> {
        self.get(a, b)?.as_ref().ok().copied()
    }

    /// Every distinct off-diagonal pair once, in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, &Result<f64, AnalyticsError>)> {
        let n = self.assets.len();
        (0..n).flat_map(move |i| {
            (i + 1..n).map(move |j| {
                (
                    self.assets[i].as_str(),
                    self.assets[j].as_str(),
                    &self.cells[i * n + j],
                )
            })
        })
    }

    fn index_of(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }
}

/// Correlates the daily returns of every pair of assets.
///
/// Each pair only uses the dates on which both returns are defined (pairwise
/// deletion). A diagonal cell is exactly `1.0` once the asset has two valid
/// returns.
pub fn compute_correlation(matrix: &AlignedMatrix) -> CorrelationMatrix {
    let returns = daily_returns(matrix);
    let n = returns.len();
    let mut cells: Vec<Result<f64, AnalyticsError>> = vec![Ok(0.0); n * n];

    for i in 0..n {
        cells[i * n + i] = diagonal(&returns[i]);
        for j in i + 1..n {
            let cell = pairwise(&returns[i], &returns[j]);
            cells[j * n + i] = cell.clone();
            cells[i * n + j] = cell;
        }
    }

    let undefined = cells.iter().filter(|c| c.is_err()).count();
    tracing::debug!(assets = n, undefined, "Computed correlation matrix");

    CorrelationMatrix {
        assets: returns.into_iter().map(|r| r.asset).collect(),
        cells,
    }
}

fn diagonal(series: &ReturnSeries) -> Result<f64, AnalyticsError> {
    let found = series.valid_count();
    if found < MIN_OVERLAP {
        return Err(AnalyticsError::InsufficientData {
            subject: series.asset.clone(),
            required: MIN_OVERLAP,
            found,
            measure: "valid returns",
        });
    }
    Ok(1.0)
}

/// Pearson correlation over the dates where both returns are defined.
pub fn pairwise(a: &ReturnSeries, b: &ReturnSeries) -> Result<f64, AnalyticsError> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .values
        .iter()
        .zip(&b.values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    if xs.len() < MIN_OVERLAP {
        return Err(AnalyticsError::InsufficientData {
            subject: format!("{} / {}", a.asset, b.asset),
            required: MIN_OVERLAP,
            found: xs.len(),
            measure: "overlapping returns",
        });
    }

    let (Some(std_x), Some(std_y)) = (stats::sample_std(&xs), stats::sample_std(&ys)) else {
        return Err(AnalyticsError::InsufficientData {
            subject: format!("{} / {}", a.asset, b.asset),
            required: MIN_OVERLAP,
            found: xs.len(),
            measure: "overlapping returns",
        });
    };
    let flat: Vec<String> = [(std_x, &a.asset), (std_y, &b.asset)]
        .into_iter()
        .filter(|(std, _)| *std <= stats::ZERO_VARIANCE)
        .map(|(_, asset)| asset.clone())
        .collect();
    if !flat.is_empty() {
        return Err(AnalyticsError::ZeroVariance { assets: flat });
    }

    let mean_x = stats::mean(&xs).unwrap_or(0.0);
    let mean_y = stats::mean(&ys).unwrap_or(0.0);
    let covariance = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / (xs.len() - 1) as f64;

    Ok((covariance / (std_x * std_y)).clamp(-1.0, 1.0))
}
