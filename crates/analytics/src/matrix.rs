use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::AssetCategory;
use serde::Serialize;
use std::collections::HashSet;

/// The values of one asset along the matrix axis. `None` is an explicit
/// missing marker, never a stand-in for zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetColumn {
    label: String,
    category: AssetCategory,
    values: Vec<Option<f64>>,
}

impl AssetColumn {
    pub fn new(label: impl Into<String>, category: AssetCategory, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            category,
            values,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of slots holding a value.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Position and value of the first slot holding a value.
    pub fn first_valid(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .find_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Position and value of the last slot holding a value.
    pub fn last_valid(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, v)| v.map(|v| (i, v)))
    }

    fn with_values(&self, values: Vec<Option<f64>>) -> Self {
        Self {
            label: self.label.clone(),
            category: self.category,
            values,
        }
    }
}

/// Prices of several assets on one shared, strictly increasing date axis.
///
/// Every column has exactly one slot per axis date. The matrix is immutable;
/// every transform returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedMatrix {
    dates: Vec<NaiveDate>,
    columns: Vec<AssetColumn>,
}

impl AlignedMatrix {
    /// Builds a matrix, checking the axis ordering, the column lengths and
    /// the uniqueness of asset labels.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<AssetColumn>) -> Result<Self, AnalyticsError> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::Alignment {
                asset: "<axis>".to_string(),
                reason: format!("dates are not strictly increasing at {} -> {}", pair[0], pair[1]),
            });
        }
        let mut labels = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.values.len() != dates.len() {
                return Err(AnalyticsError::Alignment {
                    asset: column.label.clone(),
                    reason: format!(
                        "column has {} slots but the axis has {} dates",
                        column.values.len(),
                        dates.len()
                    ),
                });
            }
            if !labels.insert(column.label.as_str()) {
                return Err(AnalyticsError::Alignment {
                    asset: column.label.clone(),
                    reason: "asset appears more than once".to_string(),
                });
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[AssetColumn] {
        &self.columns
    }

    pub fn column(&self, label: &str) -> Option<&AssetColumn> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The value of `label` on `date`; `None` when the asset is missing that
    /// day or the date is not on the axis.
    pub fn value(&self, label: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.column(label)?.values[idx]
    }

    /// Same axis and assets, each column's values replaced by `f(column)`.
    ///
    /// `f` must return one slot per axis date.
    pub(crate) fn map_columns<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&AssetColumn) -> Vec<Option<f64>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = f(column);
                debug_assert_eq!(values.len(), self.dates.len());
                column.with_values(values)
            })
            .collect();
        Self {
            dates: self.dates.clone(),
            columns,
        }
    }

    /// The rows whose positions fall in `range`, keeping every asset.
    pub(crate) fn rows(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            dates: self.dates[range.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| c.with_values(c.values[range.clone()].to_vec()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn rejects_unsorted_axis() {
        let result = AlignedMatrix::new(vec![d(3), d(2)], vec![]);
        assert!(matches!(result, Err(AnalyticsError::Alignment { .. })));
    }

    #[test]
    fn rejects_ragged_columns() {
        let column = AssetColumn::new("DAX", AssetCategory::Index, vec![Some(1.0)]);
        let result = AlignedMatrix::new(vec![d(2), d(3)], vec![column]);
        assert!(matches!(result, Err(AnalyticsError::Alignment { asset, .. }) if asset == "DAX"));
    }

    #[test]
    fn value_lookup() {
        let matrix = AlignedMatrix::new(
            vec![d(2), d(3)],
            vec![
                AssetColumn::new("DAX", AssetCategory::Index, vec![Some(1.0), None]),
                AssetColumn::new("Gold", AssetCategory::Commodity, vec![Some(5.0), Some(6.0)]),
            ],
        )
        .unwrap();

        assert_eq!(matrix.value("Gold", d(3)), Some(6.0));
        assert_eq!(matrix.value("DAX", d(3)), None);
        assert_eq!(matrix.value("DAX", d(9)), None);
        assert!(matrix.column("Oil").is_none());
    }
}
