//! Pure aggregates over a movement collection. Every function here is deterministic and
//! leaves its input untouched.

use crate::domain::dimension::{Dimension, Metric};
use crate::domain::movement::MovementCollection;
use crate::error::{CoreError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Count per observed value of `dimension`. Values with no rows are omitted.
pub fn count_by(collection: &MovementCollection, dimension: Dimension) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for m in collection {
        *out.entry(dimension.key(m).to_string()).or_insert(0) += 1;
    }
    out
}

/// Dense count matrix over the observed row and column values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[r][c]` pairs `rows[r]` with `columns[c]`; unobserved pairs hold 0.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let r = self.rows.iter().position(|v| v == row)?;
        let c = self.columns.iter().position(|v| v == column)?;
        Some(self.counts[r][c])
    }

    /// Every `(row, column) -> count` cell, zeros included, row-major.
    pub fn cells(&self) -> impl Iterator<Item = ((&str, &str), usize)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(r, row)| {
            self.columns
                .iter()
                .enumerate()
                .map(move |(c, col)| ((row.as_str(), col.as_str()), self.counts[r][c]))
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

pub fn cross_tab(collection: &MovementCollection, rows: Dimension, columns: Dimension) -> CrossTab {
    let mut observed = BTreeMap::<(&str, &str), usize>::new();
    let mut row_keys = BTreeSet::new();
    let mut col_keys = BTreeSet::new();
    for m in collection {
        let (r, c) = (rows.key(m), columns.key(m));
        row_keys.insert(r);
        col_keys.insert(c);
        *observed.entry((r, c)).or_insert(0) += 1;
    }

    let counts = row_keys
        .iter()
        .map(|r| {
            col_keys
                .iter()
                .map(|c| observed.get(&(*r, *c)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTab {
        row_dimension: rows,
        column_dimension: columns,
        rows: row_keys.into_iter().map(str::to_string).collect(),
        columns: col_keys.into_iter().map(str::to_string).collect(),
        counts,
    }
}

/// Mean of `metric` per observed value of `dimension`.
pub fn grouped_mean(
    collection: &MovementCollection,
    dimension: Dimension,
    metric: Metric,
) -> BTreeMap<String, f64> {
    let mut sums = BTreeMap::<&str, (f64, usize)>::new();
    for m in collection {
        let slot = sums.entry(dimension.key(m)).or_insert((0.0, 0));
        slot.0 += metric.value(m);
        slot.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect()
}

/// Mean relevance. An empty collection has no mean and reports `NoData`.
pub fn mean_relevance(collection: &MovementCollection) -> Result<f64> {
    mean_of(collection, Metric::Relevance)
}

pub fn mean_of(collection: &MovementCollection, metric: Metric) -> Result<f64> {
    if collection.is_empty() {
        return Err(CoreError::NoData("mean over an empty collection"));
    }
    let sum: f64 = collection.iter().map(|m| metric.value(m)).sum();
    Ok(sum / collection.len() as f64)
}

/// Total engagement; 0 for an empty collection.
pub fn sum_engagement(collection: &MovementCollection) -> u64 {
    collection.iter().map(|m| u64::from(m.engagement)).sum()
}

/// Fraction of rows with `metric >= threshold`, in `0.0..=1.0`.
pub fn share_above_threshold(
    collection: &MovementCollection,
    metric: Metric,
    threshold: f64,
) -> Result<f64> {
    if collection.is_empty() {
        return Err(CoreError::NoData("share over an empty collection"));
    }
    let hits = collection
        .iter()
        .filter(|m| metric.value(m) >= threshold)
        .count();
    Ok(hits as f64 / collection.len() as f64)
}

/// Movements per observed date, ascending.
pub fn count_by_day(collection: &MovementCollection) -> BTreeMap<NaiveDate, usize> {
    let mut out = BTreeMap::new();
    for m in collection {
        *out.entry(m.date).or_insert(0) += 1;
    }
    out
}

/// The `n` movements with the highest `metric`; ties keep collection order.
pub fn top_by(collection: &MovementCollection, metric: Metric, n: usize) -> MovementCollection {
    let mut rows: Vec<_> = collection.iter().collect();
    rows.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.into_iter().take(n).cloned().collect()
}

/// Per-group headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub count: usize,
    pub mean_relevance: f64,
    pub sum_engagement: u64,
}

pub type AggregateSnapshot = BTreeMap<String, GroupSummary>;

/// Count, mean relevance and engagement total for each observed value of `dimension`.
pub fn snapshot(collection: &MovementCollection, dimension: Dimension) -> AggregateSnapshot {
    let mut acc = BTreeMap::<&str, (usize, u64, u64)>::new();
    for m in collection {
        let slot = acc.entry(dimension.key(m)).or_insert((0, 0, 0));
        slot.0 += 1;
        slot.1 += u64::from(m.relevance);
        slot.2 += u64::from(m.engagement);
    }
    acc.into_iter()
        .map(|(k, (count, relevance, engagement))| {
            (
                k.to_string(),
                GroupSummary {
                    count,
                    mean_relevance: relevance as f64 / count as f64,
                    sum_engagement: engagement,
                },
            )
        })
        .collect()
}
