//! Aggregators: pure functions from a [`Dataset`](crate::data::model::Dataset)
//! to chart-ready summaries.
//!
//! Nothing here performs I/O or keeps state between calls. Functions that
//! can legitimately find nothing to summarise return `Option` or
//! [`DataError::Empty`](crate::error::DataError::Empty) instead of NaN.

pub mod composition;
pub mod cross;
pub mod kpi;
pub mod sex;
pub mod temporal;
pub mod weight;

use std::hash::Hash;

use serde::Serialize;

/// Round to `decimals` places, exact halves to the even neighbour.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `part / total` as a percentage, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// One category of a [`SummaryStat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub count: usize,
    /// Share of the total, rounded to one decimal.
    pub percentage: f64,
}

/// Counts and shares per category, most frequent first.
///
/// Each percentage is rounded on its own, so the sum may be off 100 by up
/// to 0.1 per category. They are not re-normalised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStat {
    pub entries: Vec<CategoryShare>,
    pub total: usize,
}

impl SummaryStat {
    /// Shares relative to the sum of `counts`.
    pub fn from_counts(counts: Vec<(String, usize)>) -> Self {
        let total = counts.iter().map(|(_, n)| n).sum();
        Self::over_total(counts, total)
    }

    /// Shares relative to an explicit `total`, which may exceed the sum of
    /// the counts when some records carry no value.
    pub fn over_total(counts: Vec<(String, usize)>, total: usize) -> Self {
        let entries = counts
            .into_iter()
            .map(|(label, count)| CategoryShare {
                label,
                count,
                percentage: round_to(percentage(count, total), 1),
            })
            .collect();
        SummaryStat { entries, total }
    }

    pub fn get(&self, label: &str) -> Option<&CategoryShare> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.count).collect()
    }

    pub fn percentages(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.percentage).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Frequency of each key, descending by count. Ties keep the order in which
/// the keys were first seen.
pub fn value_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut order: Vec<(T, usize)> = Vec::new();
    let mut index: std::collections::HashMap<T, usize> = std::collections::HashMap::new();
    for value in values {
        match index.get(&value) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(value.clone(), order.len());
                order.push((value, 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}
