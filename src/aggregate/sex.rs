use serde::Serialize;

use super::{percentage, round_to, value_counts, SummaryStat};
use crate::data::model::{Dataset, Sex};
use crate::error::{DataError, Result};

/// Counts per sex plus the figures behind the male:female display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexDistribution {
    pub summary: SummaryStat,
    pub males: usize,
    pub females: usize,
    /// Male share of the total, two decimals.
    pub male_percentage: f64,
    /// Males per female, two decimals; 0 when there are no females.
    pub male_female_ratio: f64,
}

/// Males per female rounded to two decimals, 0 when `females` is 0.
pub fn male_female_ratio(males: usize, females: usize) -> f64 {
    if females == 0 {
        0.0
    } else {
        round_to(males as f64 / females as f64, 2)
    }
}

/// Counts per sex. Shares are relative to every record in the dataset, so
/// records with a blank sex lower every share.
pub fn sex_distribution(dataset: &Dataset) -> Result<SexDistribution> {
    let sexes: Vec<&Sex> = dataset.records.iter().filter_map(|r| r.sex.as_ref()).collect();
    if sexes.is_empty() {
        return Err(DataError::Empty("sex distribution"));
    }

    let males = sexes.iter().filter(|s| ***s == Sex::Male).count();
    let females = sexes.iter().filter(|s| ***s == Sex::Female).count();
    let summary = SummaryStat::over_total(
        value_counts(sexes.iter().map(|s| s.label().to_string())),
        dataset.len(),
    );

    Ok(SexDistribution {
        male_percentage: round_to(percentage(males, dataset.len()), 2),
        male_female_ratio: male_female_ratio(males, females),
        summary,
        males,
        females,
    })
}
