use serde::Serialize;

use super::sex::male_female_ratio;
use super::weight::weight_stats;
use super::{percentage, round_to};
use crate::data::model::{AgeClass, Dataset, Sex};

/// Headline figures shown on the dashboard cards and served by `/api/kpis`.
///
/// Shares are relative to every loaded record, including records with a
/// blank age class or sex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_individuals: usize,
    pub adults: usize,
    pub subadults: usize,
    pub juveniles: usize,
    pub adults_pct: f64,
    pub subadults_pct: f64,
    pub juveniles_pct: f64,
    pub males: usize,
    pub females: usize,
    pub males_pct: f64,
    pub females_pct: f64,
    /// Two-decimal male share.
    pub male_proportion: f64,
    /// Two-decimal female share.
    pub female_proportion: f64,
    pub male_female_ratio: f64,
    pub weight_mean: Option<f64>,
    pub weight_median: Option<f64>,
    pub weight_min: Option<f64>,
    pub weight_max: Option<f64>,
}

impl KpiSummary {
    pub fn compute(dataset: &Dataset) -> Self {
        let total = dataset.len();
        let count_age = |age: AgeClass| {
            dataset
                .records
                .iter()
                .filter(|r| r.age_class.as_ref() == Some(&age))
                .count()
        };
        let count_sex = |sex: Sex| {
            dataset
                .records
                .iter()
                .filter(|r| r.sex.as_ref() == Some(&sex))
                .count()
        };

        let adults = count_age(AgeClass::Adult);
        let subadults = count_age(AgeClass::Subadult);
        let juveniles = count_age(AgeClass::Juvenile);
        let males = count_sex(Sex::Male);
        let females = count_sex(Sex::Female);
        let weights = weight_stats(&dataset.records).map(|s| s.rounded());

        KpiSummary {
            total_individuals: total,
            adults,
            subadults,
            juveniles,
            adults_pct: round_to(percentage(adults, total), 1),
            subadults_pct: round_to(percentage(subadults, total), 1),
            juveniles_pct: round_to(percentage(juveniles, total), 1),
            males,
            females,
            males_pct: round_to(percentage(males, total), 1),
            females_pct: round_to(percentage(females, total), 1),
            male_proportion: round_to(percentage(males, total), 2),
            female_proportion: round_to(percentage(females, total), 2),
            male_female_ratio: male_female_ratio(males, females),
            weight_mean: weights.map(|w| w.mean),
            weight_median: weights.map(|w| w.median),
            weight_min: weights.map(|w| w.min),
            weight_max: weights.map(|w| w.max),
        }
    }
}
