use serde::Serialize;

use super::round_to;
use crate::data::filter::RecordFilter;
use crate::data::model::{Dataset, Record};

/// Summary of `weight_kg` over a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl WeightStats {
    /// Compute statistics from raw weights, ignoring non-finite values.
    /// Returns `None` when nothing is left.
    pub fn compute(weights: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut vals: Vec<f64> = weights.into_iter().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Clamp guards the last-ulp drift of the summed mean.
        let mean = (vals.iter().sum::<f64>() / count as f64).clamp(min, max);

        vals.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };

        Some(WeightStats {
            count,
            min,
            max,
            mean,
            median,
        })
    }

    /// Copy with every figure rounded to two decimals for display.
    pub fn rounded(&self) -> Self {
        WeightStats {
            count: self.count,
            min: round_to(self.min, 2),
            max: round_to(self.max, 2),
            mean: round_to(self.mean, 2),
            median: round_to(self.median, 2),
        }
    }
}

/// Weight statistics over `records`; records without a weight are skipped.
pub fn weight_stats<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<WeightStats> {
    WeightStats::compute(records.into_iter().filter_map(|r| r.weight_kg))
}

/// Weight statistics over the records of `dataset` that pass `filter`.
pub fn weight_stats_for(dataset: &Dataset, filter: &RecordFilter) -> Option<WeightStats> {
    weight_stats(filter.apply(dataset))
}
