use crate::enums::AssetCategory;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single daily observation. `price` is `None` when the provider reported
/// the date but had no usable value for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            price: Some(price),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, price: None }
    }
}

/// The daily history of one asset as handed over by the data provider.
///
/// Points may arrive in any order; the aligner sorts them. A series is
/// treated as immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// The display label, unique across a request (e.g. "S&P 500").
    pub label: String,
    /// The provider symbol (e.g. "^GSPC").
    pub ticker: String,
    pub category: AssetCategory,
    pub points: Vec<PricePoint>,
}

impl RawSeries {
    pub fn new(
        label: impl Into<String>,
        ticker: impl Into<String>,
        category: AssetCategory,
        points: Vec<PricePoint>,
    ) -> Self {
        Self {
            label: label.into(),
            ticker: ticker.into(),
            category,
            points,
        }
    }

    /// Checks the structural invariants of the series.
    ///
    /// Rejects duplicate dates and non-finite values. Prices must be strictly
    /// positive; yields only need to be finite.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::with_capacity(self.points.len());
        for point in &self.points {
            if !seen.insert(point.date) {
                return Err(CoreError::InvalidInput(
                    self.label.clone(),
                    format!("duplicate date {}", point.date),
                ));
            }
            if let Some(price) = point.price {
                let acceptable = if self.category.is_yield() {
                    price.is_finite()
                } else {
                    price.is_finite() && price > 0.0
                };
                if !acceptable {
                    return Err(CoreError::InvalidInput(
                        self.label.clone(),
                        format!("invalid value {} on {}", price, point.date),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Iterates over the points that carry a value.
    pub fn observations(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.price.map(|price| (p.date, price)))
    }

    /// The earliest and latest dates with a value, if any.
    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.observations().fold(None, |acc, (date, _)| match acc {
            None => Some((date, date)),
            Some((first, last)) => Some((first.min(date), last.max(date))),
        })
    }
}

/// An inclusive calendar window `[start, end]`.
///
/// Construction does not reorder the bounds; an inverted range is carried
/// through so that the analytics layer can reject it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
