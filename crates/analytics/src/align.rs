use crate::error::AnalyticsError;
use crate::matrix::{AlignedMatrix, AssetColumn};
use chrono::NaiveDate;
use core_types::{DateRange, FillPolicy, RawSeries};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Fewer valid prices than this make every return-based metric impossible.
pub const MIN_VALID_PRICES: usize = 2;

/// The outcome of aligning a batch of series.
///
/// Assets that ended up with too few prices stay in the matrix so that views
/// can still show them, and are listed in `insufficient` with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    pub matrix: AlignedMatrix,
    pub insufficient: BTreeMap<String, AnalyticsError>,
}

/// Merges raw series onto one common date axis.
///
/// The axis is the sorted set of dates inside `range` on which at least one
/// series has a value; no date without any observation is ever created.
/// Slots without a native value are left missing or forward-filled from the
/// same asset's most recent earlier value in the window, per `fill_policy`.
///
/// # Errors
///
/// * `InvalidRange` - the range is inverted or contains no observation at all.
/// * `Alignment` - a series is malformed (duplicate dates, invalid prices) or a
///   label is supplied twice.
pub fn align(
    series: &[RawSeries],
    fill_policy: FillPolicy,
    range: DateRange,
) -> Result<Alignment, AnalyticsError> {
    if range.is_inverted() {
        return Err(AnalyticsError::InvalidRange {
            start: range.start,
            end: range.end,
            reason: "start is after end".to_string(),
        });
    }

    let mut labels = HashSet::with_capacity(series.len());
    for s in series {
        s.validate()?;
        if !labels.insert(s.label.as_str()) {
            return Err(AnalyticsError::Alignment {
                asset: s.label.clone(),
                reason: "series supplied more than once".to_string(),
            });
        }
    }

    // Native observations inside the window, per asset.
    let windows: Vec<BTreeMap<NaiveDate, f64>> = series
        .iter()
        .map(|s| {
            s.observations()
                .filter(|(date, _)| range.contains(*date))
                .collect()
        })
        .collect();

    let axis: Vec<NaiveDate> = windows
        .iter()
        .flat_map(|w| w.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if axis.is_empty() {
        return Err(AnalyticsError::InvalidRange {
            start: range.start,
            end: range.end,
            reason: "no series has an observation inside the range".to_string(),
        });
    }

    let mut insufficient = BTreeMap::new();
    let columns: Vec<AssetColumn> = series
        .iter()
        .zip(&windows)
        .map(|(s, window)| {
            let values = fill_column(&axis, window, fill_policy);
            let column = AssetColumn::new(s.label.clone(), s.category, values);
            let found = column.valid_count();
            tracing::debug!(
                asset = %s.label,
                native = window.len(),
                valid = found,
                "Aligned series"
            );
            if found < MIN_VALID_PRICES {
                tracing::warn!(asset = %s.label, found, "Too few prices after alignment");
                insufficient.insert(
                    s.label.clone(),
                    AnalyticsError::InsufficientData {
                        subject: s.label.clone(),
                        required: MIN_VALID_PRICES,
                        found,
                        measure: "valid prices",
                    },
                );
            }
            column
        })
        .collect();

    let matrix = AlignedMatrix::new(axis, columns)?;
    tracing::debug!(
        dates = matrix.len(),
        assets = matrix.columns().len(),
        %fill_policy,
        "Alignment complete"
    );

    Ok(Alignment {
        matrix,
        insufficient,
    })
}

fn fill_column(
    axis: &[NaiveDate],
    window: &BTreeMap<NaiveDate, f64>,
    fill_policy: FillPolicy,
) -> Vec<Option<f64>> {
    let mut last: Option<f64> = None;
    axis.iter()
        .map(|date| match window.get(date) {
            Some(price) => {
                last = Some(*price);
                Some(*price)
            }
            None => match fill_policy {
                FillPolicy::None => None,
                FillPolicy::ForwardFill => last,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{AssetCategory, PricePoint};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn series(label: &str, points: &[(u32, f64)]) -> RawSeries {
        RawSeries::new(
            label,
            label,
            AssetCategory::Index,
            points.iter().map(|(day, p)| PricePoint::new(d(*day), *p)).collect(),
        )
    }

    fn june() -> DateRange {
        DateRange::new(d(1), d(30))
    }

    #[test]
    fn axis_is_union_of_observed_dates() {
        let input = vec![
            series("FTSE 100", &[(3, 1.0), (4, 2.0), (6, 3.0)]),
            series("Nikkei 225", &[(4, 10.0), (5, 11.0), (6, 12.0)]),
        ];
        let aligned = align(&input, FillPolicy::None, june()).unwrap();
        assert_eq!(aligned.matrix.dates(), &[d(3), d(4), d(5), d(6)]);
        assert_eq!(
            aligned.matrix.column("FTSE 100").unwrap().values(),
            &[Some(1.0), Some(2.0), None, Some(3.0)]
        );
        assert_eq!(
            aligned.matrix.column("Nikkei 225").unwrap().values(),
            &[None, Some(10.0), Some(11.0), Some(12.0)]
        );
        assert!(aligned.insufficient.is_empty());
    }

    #[test]
    fn forward_fill_never_precedes_first_observation() {
        let input = vec![
            series("FTSE 100", &[(3, 1.0), (4, 2.0), (6, 3.0)]),
            series("Nikkei 225", &[(4, 10.0), (6, 12.0)]),
        ];
        let aligned = align(&input, FillPolicy::ForwardFill, june()).unwrap();
        assert_eq!(
            aligned.matrix.column("Nikkei 225").unwrap().values(),
            &[None, Some(10.0), Some(12.0)]
        );

        let input = vec![
            series("FTSE 100", &[(3, 1.0), (5, 2.0)]),
            series("Nikkei 225", &[(3, 10.0), (4, 11.0)]),
        ];
        let aligned = align(&input, FillPolicy::ForwardFill, june()).unwrap();
        assert_eq!(
            aligned.matrix.column("FTSE 100").unwrap().values(),
            &[Some(1.0), Some(1.0), Some(2.0)]
        );
        assert_eq!(
            aligned.matrix.column("Nikkei 225").unwrap().values(),
            &[Some(10.0), Some(11.0), Some(11.0)]
        );
    }

    #[test]
    fn observations_outside_range_are_ignored() {
        let input = vec![series("DAX", &[(1, 1.0), (10, 2.0), (11, 3.0), (20, 4.0)])];
        let aligned = align(&input, FillPolicy::ForwardFill, DateRange::new(d(5), d(15))).unwrap();
        assert_eq!(aligned.matrix.dates(), &[d(10), d(11)]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let input = vec![series("DAX", &[(1, 1.0), (2, 2.0)])];
        let result = align(&input, FillPolicy::None, DateRange::new(d(9), d(1)));
        assert!(matches!(result, Err(AnalyticsError::InvalidRange { .. })));
    }

    #[test]
    fn duplicate_dates_abort_alignment() {
        let input = vec![series("DAX", &[(1, 1.0), (1, 2.0)])];
        let result = align(&input, FillPolicy::None, june());
        assert!(matches!(result, Err(AnalyticsError::Alignment { asset, .. }) if asset == "DAX"));
    }

    #[test]
    fn duplicate_labels_abort_alignment() {
        let input = vec![series("DAX", &[(1, 1.0)]), series("DAX", &[(2, 2.0)])];
        assert!(matches!(
            align(&input, FillPolicy::None, june()),
            Err(AnalyticsError::Alignment { .. })
        ));
    }

    #[test]
    fn sparse_asset_is_flagged_not_fatal() {
        let input = vec![
            series("S&P 500", &[(3, 1.0), (4, 2.0), (5, 3.0)]),
            series("New ETF", &[(5, 50.0)]),
        ];
        let aligned = align(&input, FillPolicy::ForwardFill, june()).unwrap();
        assert_eq!(aligned.matrix.columns().len(), 2);
        assert_eq!(
            aligned.insufficient.get("New ETF"),
            Some(&AnalyticsError::InsufficientData {
                subject: "New ETF".to_string(),
                required: 2,
                found: 1,
                measure: "valid prices",
            })
        );
    }

    #[test]
    fn missing_points_do_not_create_axis_dates() {
        let mut raw = series("DAX", &[(3, 1.0), (5, 2.0)]);
        raw.points.push(PricePoint::missing(d(4)));
        let aligned = align(&[raw], FillPolicy::None, june()).unwrap();
        assert_eq!(aligned.matrix.dates(), &[d(3), d(5)]);
    }
}
