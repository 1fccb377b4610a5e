use crate::matrix::AlignedMatrix;
use chrono::NaiveDate;
use serde::Serialize;

/// Daily simple returns of one asset, one slot per matrix date.
///
/// The slot at position `t` holds `price[t] / price[t-1] - 1` when both prices
/// are present. The first slot, and any transition touching a missing price,
/// is `None`; a gap is never read as a zero return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub asset: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

impl ReturnSeries {
    /// The defined returns with the date they were realised on.
    pub fn valid(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .filter_map(|(date, r)| r.map(|r| (*date, r)))
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|r| r.is_some()).count()
    }
}

/// Simple returns between adjacent slots of a price column.
pub fn simple_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return returns;
    }
    returns.push(None);
    returns.extend(prices.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(curr)) => {
            let r = curr / prev - 1.0;
            r.is_finite().then_some(r)
        }
        _ => None,
    }));
    returns
}

/// Returns for every asset of the matrix, in column order.
pub fn daily_returns(matrix: &AlignedMatrix) -> Vec<ReturnSeries> {
    matrix
        .columns()
        .iter()
        .map(|column| ReturnSeries {
            asset: column.label().to_string(),
            dates: matrix.dates().to_vec(),
            values: simple_returns(column.values()),
        })
        .collect()
}

/// Number of elapsed intervals between consecutive valid prices, from the
/// first valid price to the last.
///
/// Missing slots are stepped over rather than counted, so a price on day 1
/// and day 3 with day 2 missing is one interval. This is the exponent base
/// used for annualisation; it is independent of how many returns are defined.
pub fn observation_count(prices: &[Option<f64>]) -> usize {
    prices.iter().filter(|p| p.is_some()).count().saturating_sub(1)
}
