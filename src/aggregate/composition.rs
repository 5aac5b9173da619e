use super::{value_counts, SummaryStat};
use crate::data::model::Dataset;
use crate::error::{DataError, Result};

/// Population composition by age class, most frequent class first.
///
/// Records with a blank age class are left out of both the counts and the
/// total.
pub fn age_composition(dataset: &Dataset) -> Result<SummaryStat> {
    let counts = value_counts(
        dataset
            .records
            .iter()
            .filter_map(|r| r.age_class.as_ref())
            .map(|age| age.label().to_string()),
    );
    if counts.is_empty() {
        return Err(DataError::Empty("age composition"));
    }
    let summary = SummaryStat::from_counts(counts);
    log::debug!("age composition: {:?} (total {})", summary.entries, summary.total);
    Ok(summary)
}

/// Age-class counts with shares relative to every record, blank age
/// classes included in the denominator. Used by the data-table view.
pub fn age_distribution(dataset: &Dataset) -> Result<SummaryStat> {
    let composition = age_composition(dataset)?;
    let counts = composition
        .entries
        .into_iter()
        .map(|e| (e.label, e.count))
        .collect();
    Ok(SummaryStat::over_total(counts, dataset.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    #[test]
    fn three_row_example() {
        let ds = Dataset::from_records(vec![
            Record::new("Adulto", "Macho", 2.1),
            Record::new("Adulto", "Hembra", 1.8),
            Record::new("Juvenil", "Macho", 0.5),
        ]);
        let stat = age_composition(&ds).unwrap();
        assert_eq!(stat.total, 3);
        assert_eq!(stat.labels(), vec!["Adulto", "Juvenil"]);
        assert_eq!(stat.counts(), vec![2, 1]);
        assert_eq!(stat.percentages(), vec![66.7, 33.3]);
    }

    #[test]
    fn percentages_sum_to_100_within_rounding() {
        let mut records = Vec::new();
        for (label, n) in [("Adulto", 7), ("Subadulto", 5), ("Juvenil", 3)] {
            for _ in 0..n {
                records.push(Record::new(label, "Macho", 1.0));
            }
        }
        let stat = age_composition(&Dataset::from_records(records)).unwrap();
        let sum: f64 = stat.percentages().iter().sum();
        assert!((sum - 100.0).abs() <= 0.1 * stat.entries.len() as f64, "{sum}");
        assert_eq!(stat.entries[0].label, "Adulto");
    }

    #[test]
    fn composition_and_distribution_differ_only_on_blank_ages() {
        let mut blank = Record::new("Adulto", "Macho", 1.0);
        blank.age_class = None;
        let ds = Dataset::from_records(vec![
            Record::new("Adulto", "Macho", 2.1),
            Record::new("Juvenil", "Hembra", 0.5),
            Record::new("Adulto", "Hembra", 1.8),
            blank,
        ]);
        let composition = age_composition(&ds).unwrap();
        assert_eq!(composition.total, 3);
        assert_eq!(composition.percentages(), vec![66.7, 33.3]);

        let distribution = age_distribution(&ds).unwrap();
        assert_eq!(distribution.total, 4);
        assert_eq!(distribution.counts(), vec![2, 1]);
        assert_eq!(distribution.percentages(), vec![50.0, 25.0]);
    }

    #[test]
    fn one_in_sixteen_rounds_half_to_even() {
        let mut records = vec![Record::new("Juvenil", "Macho", 0.4)];
        records.extend((0..15).map(|_| Record::new("Adulto", "Hembra", 2.0)));
        let stat = age_composition(&Dataset::from_records(records)).unwrap();
        assert_eq!(stat.labels(), vec!["Adulto", "Juvenil"]);
        assert_eq!(stat.percentages(), vec![93.8, 6.2]);
    }

    #[test]
    fn empty_dataset_has_no_composition() {
        let ds = Dataset::from_records(Vec::new());
        assert!(matches!(age_composition(&ds), Err(DataError::Empty(_))));
    }
}
