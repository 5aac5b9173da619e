use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::data::model::{Dataset, DATE_COLUMN};
use crate::error::{DataError, Result};

/// Captures recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Daily capture counts, strictly ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyCaptureSeries {
    pub points: Vec<DailyCount>,
    /// Non-blank date cells that could not be parsed.
    pub discarded: usize,
}

impl DailyCaptureSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }
}

/// Group parseable capture dates by day.
///
/// No parseable date at all yields an empty series, not an error. Only a
/// dataset lacking the capture-date column is an error.
pub fn daily_captures(dataset: &Dataset) -> Result<DailyCaptureSeries> {
    if !dataset.has_column(DATE_COLUMN) {
        return Err(DataError::MissingColumn(DATE_COLUMN.to_string()));
    }

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut discarded = 0;
    for raw in dataset.records.iter().filter_map(|r| r.capture_date.as_deref()) {
        match parse_day_first(raw) {
            Some(date) => *per_day.entry(date).or_default() += 1,
            None => discarded += 1,
        }
    }

    if per_day.is_empty() {
        log::info!("no valid capture dates ({discarded} unparsable)");
    } else if discarded > 0 {
        log::debug!("{discarded} capture dates could not be parsed");
    }

    Ok(DailyCaptureSeries {
        points: per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        discarded,
    })
}

/// Parse a free-text date, day before month.
///
/// Accepted shapes, each optionally followed by a time of day (which is
/// validated and then dropped):
/// * `dd/mm/yyyy`, `dd-mm-yyyy`, `dd.mm.yyyy` and the same with a two-digit year
/// * `yyyy-mm-dd`, `yyyy/mm/dd`
///
/// When the day-first reading is impossible but the month-first one is not
/// (`03/25/2024`), the month-first reading is used.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let (date_part, time_part) = match text.find(|c: char| c == ' ' || c == 'T') {
        Some(idx) => (&text[..idx], Some(text[idx + 1..].trim())),
        None => (text, None),
    };

    if let Some(time) = time_part {
        if !time.is_empty() && parse_time(time).is_none() {
            return None;
        }
    }

    let sep = date_part.chars().find(|c| matches!(*c, '/' | '-' | '.'))?;
    let parts: Vec<&str> = date_part.split(sep).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    if [a, b, c].iter().any(|p| p.is_empty() || !p.chars().all(|ch| ch.is_ascii_digit())) {
        return None;
    }

    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }

    let year = match c.len() {
        4 => c.parse::<i32>().ok()?,
        // Same pivot as strptime's %y.
        2 => {
            let yy = c.parse::<i32>().ok()?;
            if yy < 70 {
                2000 + yy
            } else {
                1900 + yy
            }
        }
        _ => return None,
    };
    let first: u32 = a.parse().ok()?;
    let second: u32 = b.parse().ok()?;
    NaiveDate::from_ymd_opt(year, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_dates(dates: &[&str]) -> Dataset {
        Dataset::from_records(
            dates
                .iter()
                .map(|d| Record::new("Adulto", "Macho", 1.0).with_capture_date(d))
                .collect(),
        )
    }

    #[test]
    fn day_first_parsing() {
        assert_eq!(parse_day_first("05/03/2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day_first("5-3-2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day_first("05.03.24"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day_first("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day_first("2024-03-05 00:00:00"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day_first("05/03/2024 14:30"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day_first("03/25/2024"), Some(date(2024, 3, 25)));
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in [
            "",
            "sin fecha",
            "32/13/2024",
            "05/03",
            "05/03/2024 lunch",
            "1/2/3/4",
            "2024-02-30",
        ] {
            assert_eq!(parse_day_first(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn series_is_sorted_and_deduplicated() {
        let ds = with_dates(&[
            "10/01/2024",
            "02/01/2024",
            "10/01/2024 08:15",
            "not a date",
            "2024-01-02",
            "05/01/2024",
        ]);
        let series = daily_captures(&ds).unwrap();
        let points: Vec<(NaiveDate, usize)> =
            series.points.iter().map(|p| (p.date, p.count)).collect();
        assert_eq!(
            points,
            vec![(date(2024, 1, 2), 2), (date(2024, 1, 5), 1), (date(2024, 1, 10), 2)]
        );
        assert!(series.points.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series.points.iter().all(|p| p.count >= 1));
        assert_eq!(series.discarded, 1);
        assert_eq!(series.total(), 5);
    }

    #[test]
    fn all_unparseable_dates_give_an_empty_series() {
        let ds = with_dates(&["???", "pendiente", ""]);
        let series = daily_captures(&ds).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn missing_column_is_an_error() {
        let table = crate::data::model::RawTable {
            columns: vec!["Edad".into(), "Sexo".into(), "Peso_Kg".into()],
            rows: vec![],
        };
        let ds = Dataset::from_table(table).unwrap();
        assert!(matches!(daily_captures(&ds), Err(DataError::MissingColumn(_))));
    }
}
