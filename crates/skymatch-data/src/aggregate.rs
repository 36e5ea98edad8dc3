//! Per-object averaging of a merged catalog

use crate::catalog::{Catalog, Column, DATA_NUM_COLUMN, NUM_SOURCES_COLUMN, UNMATCHED};
use crate::error::CatalogResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with rows whose `DataNum` is 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmatchedPolicy {
    /// Unmatched rows are averaged together as group 0
    #[default]
    Include,
    /// Unmatched rows are dropped before grouping
    Exclude,
}

/// Groups rows by `DataNum` and averages every numeric column
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    pub unmatched: UnmatchedPolicy,
}

impl Aggregator {
    pub fn new(unmatched: UnmatchedPolicy) -> Self {
        Self { unmatched }
    }

    /// One row per distinct `DataNum`, ascending.
    ///
    /// Output columns are `DataNum`, `NumSources`, then the mean of each
    /// numeric input column in schema order. Text columns are dropped. NaN
    /// cells do not contribute to a mean.
    pub fn aggregate(&self, catalog: &Catalog) -> CatalogResult<Catalog> {
        let ids = catalog.integer_values(DATA_NUM_COLUMN)?;

        let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (row, &id) in ids.iter().enumerate() {
            if id == UNMATCHED && self.unmatched == UnmatchedPolicy::Exclude {
                continue;
            }
            groups.entry(id).or_default().push(row);
        }

        let mut columns = vec![
            (
                DATA_NUM_COLUMN.to_string(),
                Column::Integer(groups.keys().copied().collect()),
            ),
            (
                NUM_SOURCES_COLUMN.to_string(),
                Column::Integer(groups.values().map(|rows| rows.len() as i64).collect()),
            ),
        ];

        for (field, column) in catalog.columns() {
            if field.name == DATA_NUM_COLUMN || field.name == NUM_SOURCES_COLUMN {
                continue;
            }
            let Some(values) = column.to_f64() else {
                continue;
            };
            let means = groups.values().map(|rows| mean(rows.iter().map(|&r| values[r]))).collect();
            columns.push((field.name.clone(), Column::Float(means)));
        }

        tracing::info!(
            "Averaged {} rows of {} into {} objects",
            catalog.len(),
            catalog.source_file(),
            groups.len()
        );

        Catalog::from_columns(format!("Avg{}", catalog.source_file()), columns)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}
