use analytics::transforms::to_normalized;
use analytics::{align, compute_correlation, compute_metrics};
use chrono::{Days, NaiveDate};
use core_types::{AssetCategory, DateRange, FillPolicy, PricePoint, RawSeries};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn range() -> DateRange {
    DateRange::new(base_date(), base_date() + Days::new(60))
}

/// Up to four series of sparse, positive prices on the first 60 days of 2024.
fn universe_strategy() -> impl Strategy<Value = Vec<RawSeries>> {
    prop::collection::vec(
        prop::collection::btree_map(0u64..60, 1.0f64..1000.0, 1..25),
        1..5,
    )
    .prop_map(|assets| {
        assets
            .into_iter()
            .enumerate()
            .map(|(i, prices): (usize, BTreeMap<u64, f64>)| {
                RawSeries::new(
                    format!("Asset {}", i),
                    format!("T{}", i),
                    AssetCategory::Index,
                    prices
                        .into_iter()
                        .map(|(offset, p)| PricePoint::new(base_date() + Days::new(offset), p))
                        .collect(),
                )
            })
            .collect()
    })
}

fn fill_policy_strategy() -> impl Strategy<Value = FillPolicy> {
    prop_oneof![Just(FillPolicy::None), Just(FillPolicy::ForwardFill)]
}

proptest! {
    #[test]
    fn axis_is_strictly_increasing(series in universe_strategy(), policy in fill_policy_strategy()) {
        let alignment = align(&series, policy, range()).unwrap();
        let dates = alignment.matrix.dates();
        prop_assert!(!dates.is_empty());
        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn forward_fill_never_precedes_first_observation(series in universe_strategy()) {
        let alignment = align(&series, FillPolicy::ForwardFill, range()).unwrap();
        let dates = alignment.matrix.dates();
        for s in &series {
            let (first, _) = s.coverage().unwrap();
            let column = alignment.matrix.column(&s.label).unwrap();
            for (date, value) in dates.iter().zip(column.values()) {
                if *date < first {
                    prop_assert!(value.is_none());
                } else {
                    prop_assert!(value.is_some());
                }
            }
        }
    }

    #[test]
    fn max_drawdown_is_never_positive(prices in prop::collection::vec(1.0f64..500.0, 3..40)) {
        let series = vec![RawSeries::new(
            "Asset",
            "T",
            AssetCategory::Index,
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| PricePoint::new(base_date() + Days::new(i as u64), *p))
                .collect(),
        )];
        let matrix = align(&series, FillPolicy::None, range()).unwrap().matrix;
        let metrics = compute_metrics(&matrix, 252);
        let dd = metrics["Asset"].as_ref().unwrap().max_drawdown_pct;
        let non_decreasing = prices.windows(2).all(|w| w[1] >= w[0]);
        prop_assert!(dd <= 0.0);
        prop_assert_eq!(dd == 0.0, non_decreasing);
    }

    #[test]
    fn normalized_first_value_is_base(series in universe_strategy(), base in 1.0f64..1000.0) {
        let matrix = align(&series, FillPolicy::ForwardFill, range()).unwrap().matrix;
        let normalized = to_normalized(&matrix, base);
        for column in normalized.columns() {
            if let Some((_, first)) = column.first_valid() {
                prop_assert_eq!(first, base);
            }
        }
    }

    #[test]
    fn correlation_diagonal_is_one(series in universe_strategy(), policy in fill_policy_strategy()) {
        let matrix = align(&series, policy, range()).unwrap().matrix;
        let returns = analytics::daily_returns(&matrix);
        let corr = compute_correlation(&matrix);
        for r in &returns {
            if r.valid_count() >= 2 {
                prop_assert_eq!(corr.value(&r.asset, &r.asset), Some(1.0));
            } else {
                prop_assert!(corr.get(&r.asset, &r.asset).unwrap().is_err());
            }
            for (a, b, cell) in corr.pairs() {
                if let Ok(v) = cell {
                    prop_assert!((-1.0..=1.0).contains(v), "{} / {} = {}", a, b, v);
                }
            }
        }
    }
}
