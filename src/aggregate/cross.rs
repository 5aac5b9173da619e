use serde::Serialize;

use crate::data::filter::{distinct, RecordFilter};
use crate::data::model::{AgeClass, Dataset, Sex};

/// Raw weights of one sex × age-class combination, for box plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightGroup {
    /// `"{sex} - {age class}"`.
    pub label: String,
    pub sex: String,
    pub age_class: String,
    pub weights: Vec<f64>,
}

/// Weights grouped by sex, then by age class.
///
/// Sexes come out as Male, Female, then any other label in first-seen
/// order; age classes in first-seen order. Combinations without a single
/// weighed record are omitted.
pub fn weight_by_age_and_sex(dataset: &Dataset) -> Vec<WeightGroup> {
    let mut sexes: Vec<Sex> = distinct(&dataset.records, |r| r.sex.as_ref());
    // Stable: unknown labels keep their first-seen order.
    sexes.sort_by(|a, b| match (a, b) {
        (Sex::Other(_), Sex::Other(_)) => std::cmp::Ordering::Equal,
        _ => a.cmp(b),
    });
    let ages: Vec<AgeClass> = distinct(&dataset.records, |r| r.age_class.as_ref());

    let mut groups = Vec::new();
    for sex in &sexes {
        for age in &ages {
            let filter = RecordFilter::default().sex(sex.clone()).age_class(age.clone());
            let weights: Vec<f64> = filter
                .apply(dataset)
                .into_iter()
                .filter_map(|r| r.weight_kg)
                .collect();
            if weights.is_empty() {
                continue;
            }
            log::debug!("{sex} - {age}: {} individuals", weights.len());
            groups.push(WeightGroup {
                label: format!("{sex} - {age}"),
                sex: sex.label().to_string(),
                age_class: age.label().to_string(),
                weights,
            });
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    #[test]
    fn groups_follow_sex_then_age_order() {
        let ds = Dataset::from_records(vec![
            Record::new("Juvenil", "Hembra", 0.4),
            Record::new("Adulto", "Macho", 2.1),
            Record::new("Adulto", "Hembra", 1.8),
            Record::new("Juvenil", "Macho", 0.5),
            Record::new("Adulto", "Macho", 2.4),
        ]);
        let groups = weight_by_age_and_sex(&ds);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Macho - Juvenil",
                "Macho - Adulto",
                "Hembra - Juvenil",
                "Hembra - Adulto"
            ]
        );
        assert_eq!(groups[1].weights, vec![2.1, 2.4]);
    }

    #[test]
    fn empty_combinations_are_omitted() {
        let mut unweighed = Record::new("Subadulto", "Hembra", 1.0);
        unweighed.weight_kg = None;
        let ds = Dataset::from_records(vec![
            Record::new("Adulto", "Macho", 2.1),
            Record::new("Subadulto", "Macho", 1.2),
            unweighed,
        ]);
        let groups = weight_by_age_and_sex(&ds);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.weights.is_empty()));
        assert!(groups.iter().all(|g| g.sex == "Macho"));
    }

    #[test]
    fn unknown_sexes_come_last() {
        let ds = Dataset::from_records(vec![
            Record::new("Adulto", "Indeterminado", 1.0),
            Record::new("Adulto", "Hembra", 1.8),
            Record::new("Adulto", "Macho", 2.1),
        ]);
        let sexes: Vec<String> = weight_by_age_and_sex(&ds).into_iter().map(|g| g.sex).collect();
        assert_eq!(sexes, vec!["Macho", "Hembra", "Indeterminado"]);
    }
}
