use crate::error::AnalyticsError;
use crate::matrix::AlignedMatrix;
use crate::returns::simple_returns;
use crate::stats;
use chrono::NaiveDate;
use core_types::ViewMode;

/// Rescales every asset so that its first valid price equals `base`.
///
/// Later values become `price / first_price * base`. Missing slots stay
/// missing and an asset without any price stays entirely missing.
pub fn to_normalized(matrix: &AlignedMatrix, base: f64) -> AlignedMatrix {
    matrix.map_columns(|column| match column.first_valid() {
        Some((first_idx, first)) => column
            .values()
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                value.map(|v| if idx == first_idx { base } else { v / first * base })
            })
            .collect(),
        None => column.values().to_vec(),
    })
}

/// The absolute-price view: the matrix as it is.
pub fn to_absolute(matrix: &AlignedMatrix) -> AlignedMatrix {
    matrix.clone()
}

/// Selects the display view requested by the caller.
pub fn view(matrix: &AlignedMatrix, mode: ViewMode, base: f64) -> AlignedMatrix {
    match mode {
        ViewMode::Normalized => to_normalized(matrix, base),
        ViewMode::Absolute => to_absolute(matrix),
    }
}

/// The rows dated within `[start, end]`, as a new matrix.
///
/// # Errors
///
/// `InvalidRange` when `start > end` or when no axis date falls in the window.
pub fn slice_window(
    matrix: &AlignedMatrix,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AlignedMatrix, AnalyticsError> {
    if start > end {
        return Err(AnalyticsError::InvalidRange {
            start,
            end,
            reason: "start is after end".to_string(),
        });
    }
    let dates = matrix.dates();
    let from = dates.partition_point(|d| *d < start);
    let to = dates.partition_point(|d| *d <= end);
    if from >= to {
        return Err(AnalyticsError::InvalidRange {
            start,
            end,
            reason: "window does not overlap the matrix dates".to_string(),
        });
    }
    Ok(matrix.rows(from..to))
}

/// Drawdown from the running peak, in percent, for every valid price.
pub fn drawdown_view(matrix: &AlignedMatrix) -> AlignedMatrix {
    matrix.map_columns(|column| {
        stats::drawdown_path(column.values())
            .into_iter()
            .map(|dd| dd.map(|dd| dd * 100.0))
            .collect()
    })
}

/// Annualised volatility of daily returns over a trailing window, in percent.
///
/// The value at a date uses the `window` returns ending on that date. It is
/// missing until `window` returns exist, and whenever one of them is missing.
///
/// # Errors
///
/// `InvalidParameter` when `window < 2`.
pub fn rolling_volatility(
    matrix: &AlignedMatrix,
    window: usize,
    periods_per_year: u32,
) -> Result<AlignedMatrix, AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidParameter {
            reason: format!("rolling window must be at least 2, got {}", window),
        });
    }
    let scale = f64::from(periods_per_year).sqrt() * 100.0;
    Ok(matrix.map_columns(|column| {
        let returns = simple_returns(column.values());
        (0..returns.len())
            .map(|t| {
                if t + 1 < window {
                    return None;
                }
                let slice: Option<Vec<f64>> = returns[t + 1 - window..=t].iter().copied().collect();
                slice
                    .and_then(|values| stats::sample_std(&values))
                    .map(|std| std * scale)
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::AssetColumn;
    use approx::assert_relative_eq;
    use core_types::AssetCategory;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn matrix() -> AlignedMatrix {
        AlignedMatrix::new(
            vec![d(1), d(2), d(3), d(4)],
            vec![
                AssetColumn::new("EUR/USD", AssetCategory::Currency, vec![Some(1.08), Some(1.10), None, Some(1.05)]),
                AssetColumn::new("Copper", AssetCategory::Commodity, vec![None, Some(4.0), Some(5.0), Some(3.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn normalized_starts_every_asset_at_base() {
        let normalized = to_normalized(&matrix(), 100.0);
        let copper = normalized.column("Copper").unwrap().values();
        assert_eq!(copper[0], None);
        assert_eq!(copper[1], Some(100.0));
        assert_relative_eq!(copper[2].unwrap(), 125.0, epsilon = 1e-9);
        let eur = normalized.column("EUR/USD").unwrap().values();
        assert_eq!(eur[0], Some(100.0));
        assert_eq!(eur[2], None);
    }

    #[test]
    fn view_dispatches_on_mode() {
        let m = matrix();
        assert_eq!(view(&m, ViewMode::Absolute, 100.0), m);
        assert_eq!(view(&m, ViewMode::Normalized, 1.0), to_normalized(&m, 1.0));
    }

    #[test]
    fn slice_window_keeps_inclusive_bounds() {
        let sliced = slice_window(&matrix(), d(2), d(3)).unwrap();
        assert_eq!(sliced.dates(), &[d(2), d(3)]);
        assert_eq!(sliced.column("Copper").unwrap().values(), &[Some(4.0), Some(5.0)]);
    }

    #[test]
    fn slice_window_without_overlap_fails() {
        let m = matrix();
        assert!(matches!(
            slice_window(&m, d(10), d(20)),
            Err(AnalyticsError::InvalidRange { .. })
        ));
        assert!(matches!(
            slice_window(&m, d(3), d(2)),
            Err(AnalyticsError::InvalidRange { .. })
        ));
    }

    #[test]
    fn drawdown_view_is_in_percent() {
        let dd = drawdown_view(&matrix());
        let copper = dd.column("Copper").unwrap().values();
        assert_eq!(copper[0], None);
        assert_eq!(copper[2], Some(0.0));
        assert_relative_eq!(copper[3].unwrap(), -40.0, epsilon = 1e-9);
    }

    #[test]
    fn rolling_volatility_needs_a_full_window_of_returns() {
        let m = AlignedMatrix::new(
            vec![d(1), d(2), d(3), d(4)],
            vec![AssetColumn::new(
                "Gold",
                AssetCategory::Commodity,
                vec![Some(100.0), Some(101.0), Some(99.0), Some(100.0)],
            )],
        )
        .unwrap();
        let vol = rolling_volatility(&m, 2, 252).unwrap();
        let values = vol.column("Gold").unwrap().values();
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        let r1 = 101.0 / 100.0 - 1.0;
        let r2 = 99.0 / 101.0 - 1.0;
        let expected = stats::sample_std(&[r1, r2]).unwrap() * 252f64.sqrt() * 100.0;
        assert_relative_eq!(values[2].unwrap(), expected, epsilon = 1e-9);
        assert!(values[3].is_some());

        // A gap poisons every window that contains it.
        let gappy = rolling_volatility(&matrix(), 2, 252).unwrap();
        assert!(gappy.column("EUR/USD").unwrap().values().iter().all(Option::is_none));

        assert!(rolling_volatility(&m, 1, 252).is_err());
    }
}
