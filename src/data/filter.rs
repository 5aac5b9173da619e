use super::model::{AgeClass, Dataset, Record, Sex};

// ---------------------------------------------------------------------------
// Record predicate: which sex / age class to keep
// ---------------------------------------------------------------------------

/// Selects a subset of records. A field left as `None` places no
/// constraint on that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub sex: Option<Sex>,
    pub age_class: Option<AgeClass>,
}

impl RecordFilter {
    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn age_class(mut self, age_class: AgeClass) -> Self {
        self.age_class = Some(age_class);
        self
    }

    /// A record passes when every constrained attribute matches. Records
    /// with a blank value never match a constraint on that attribute.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(sex) = &self.sex {
            if record.sex.as_ref() != Some(sex) {
                return false;
            }
        }
        if let Some(age) = &self.age_class {
            if record.age_class.as_ref() != Some(age) {
                return false;
            }
        }
        true
    }

    /// Records of `dataset` passing the filter, in dataset order.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Record> {
        dataset.records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct values of a categorical attribute in first-encountered order.
pub fn distinct<T, F>(records: &[Record], key: F) -> Vec<T>
where
    T: PartialEq + Clone,
    F: Fn(&Record) -> Option<&T>,
{
    let mut seen: Vec<T> = Vec::new();
    for value in records.iter().filter_map(key) {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            Record::new("Adulto", "Macho", 2.1),
            Record::new("Adulto", "Hembra", 1.8),
            Record::new("Juvenil", "Macho", 0.5),
        ])
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let ds = sample();
        assert_eq!(RecordFilter::default().apply(&ds).len(), 3);
    }

    #[test]
    fn filters_combine() {
        let ds = sample();
        let males = RecordFilter::default().sex(Sex::Male);
        assert_eq!(males.apply(&ds).len(), 2);

        let adult_males = males.age_class(AgeClass::Adult);
        let hits = adult_males.apply(&ds);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].weight_kg, Some(2.1));
    }

    #[test]
    fn distinct_preserves_first_seen_order() {
        let ds = sample();
        let ages = distinct(&ds.records, |r| r.age_class.as_ref());
        assert_eq!(ages, vec![AgeClass::Adult, AgeClass::Juvenile]);
    }
}
