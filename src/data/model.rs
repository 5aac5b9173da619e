use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DataError, Result};

/// Column holding the age class (`Adulto`, `Subadulto`, `Juvenil`).
pub const AGE_COLUMN: &str = "Edad";
/// Column holding the sex (`Macho`, `Hembra`).
pub const SEX_COLUMN: &str = "Sexo";
/// Column holding the body weight in kilograms.
pub const WEIGHT_COLUMN: &str = "Peso_Kg";
/// Free-text, day-first capture (delivery) date.
pub const DATE_COLUMN: &str = "Fecha_entrga_CAV";
/// Optional individual identifier.
pub const ID_COLUMN: &str = "Individuos";

/// Columns every dataset must carry after header normalisation.
pub const REQUIRED_COLUMNS: [&str; 3] = [AGE_COLUMN, SEX_COLUMN, WEIGHT_COLUMN];

// ---------------------------------------------------------------------------
// CellValue – a single raw cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it came out of the input file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date or date-time kept as text.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) | CellValue::Date(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) | CellValue::Date(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Float(_) | CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a number. Text is accepted with either `.` or
    /// `,` as the decimal separator.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Trimmed textual content, `None` for null and blank cells.
    pub fn as_text(&self) -> Option<String> {
        let text = self.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Categorical fields
// ---------------------------------------------------------------------------

/// Age class of an individual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeClass {
    Adult,
    Subadult,
    Juvenile,
    Other(String),
}

impl AgeClass {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Adulto" => AgeClass::Adult,
            "Subadulto" => AgeClass::Subadult,
            "Juvenil" => AgeClass::Juvenile,
            other => AgeClass::Other(other.to_string()),
        }
    }

    /// Label as written in the dataset.
    pub fn label(&self) -> &str {
        match self {
            AgeClass::Adult => "Adulto",
            AgeClass::Subadult => "Subadulto",
            AgeClass::Juvenile => "Juvenil",
            AgeClass::Other(s) => s,
        }
    }
}

impl fmt::Display for AgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sex of an individual. `Male` sorts before `Female`, which sorts before
/// any unrecognised label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sex {
    Male,
    Female,
    Other(String),
}

impl Sex {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Macho" => Sex::Male,
            "Hembra" => Sex::Female,
            other => Sex::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Sex::Male => "Macho",
            Sex::Female => "Hembra",
            Sex::Other(s) => s,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one typed row
// ---------------------------------------------------------------------------

/// One captured individual.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub individual: Option<String>,
    /// `None` when the cell was blank.
    pub age_class: Option<AgeClass>,
    pub sex: Option<Sex>,
    /// Positive weight in kg; `None` when the cell is blank, non-numeric or
    /// not a positive number.
    pub weight_kg: Option<f64>,
    /// Raw capture-date text, parsed later by the temporal aggregator.
    pub capture_date: Option<String>,
}

impl Record {
    /// Shorthand used heavily by tests and the sample generator.
    pub fn new(age_class: &str, sex: &str, weight_kg: f64) -> Self {
        Record {
            individual: None,
            age_class: Some(AgeClass::from_label(age_class)),
            sex: Some(Sex::from_label(sex)),
            weight_kg: Some(weight_kg).filter(|w| w.is_finite() && *w > 0.0),
            capture_date: None,
        }
    }

    pub fn with_capture_date(mut self, date: &str) -> Self {
        self.capture_date = Some(date.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// RawTable – parser output before validation
// ---------------------------------------------------------------------------

/// Header + rows exactly as a parser produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Dataset – the validated, typed dataset
// ---------------------------------------------------------------------------

/// The loaded dataset: typed records plus the raw table they came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Trimmed column names in file order.
    pub column_names: Vec<String>,
    /// Raw cells, one `Vec` per record, aligned with `column_names`.
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Normalise headers, check the schema and build typed records.
    pub fn from_table(table: RawTable) -> Result<Self> {
        let column_names: Vec<String> = table
            .columns
            .iter()
            .map(|c| c.trim().to_string())
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|req| !column_names.iter().any(|c| c == *req))
            .map(|req| req.to_string())
            .collect();
        if !missing.is_empty() {
            log::error!("required column(s) {missing:?} not found; available: {column_names:?}");
            return Err(DataError::Schema {
                missing,
                found: column_names,
            });
        }

        let index_of = |name: &str| column_names.iter().position(|c| c == name);
        // Presence checked above.
        let age_idx = index_of(AGE_COLUMN).unwrap_or_default();
        let sex_idx = index_of(SEX_COLUMN).unwrap_or_default();
        let weight_idx = index_of(WEIGHT_COLUMN).unwrap_or_default();
        let date_idx = index_of(DATE_COLUMN);
        let id_idx = index_of(ID_COLUMN);

        let width = column_names.len();
        let mut rows = Vec::with_capacity(table.rows.len());
        let mut records = Vec::with_capacity(table.rows.len());

        for mut row in table.rows {
            if row.iter().all(CellValue::is_null) {
                continue;
            }
            row.resize(width, CellValue::Null);

            let text_at = |idx: usize| row[idx].as_text();
            records.push(Record {
                individual: id_idx.and_then(text_at),
                age_class: text_at(age_idx).map(|s| AgeClass::from_label(&s)),
                sex: text_at(sex_idx).map(|s| Sex::from_label(&s)),
                weight_kg: row[weight_idx]
                    .as_f64()
                    .filter(|w| w.is_finite() && *w > 0.0),
                capture_date: date_idx.and_then(text_at),
            });
            rows.push(row);
        }

        Ok(Dataset {
            records,
            column_names,
            rows,
        })
    }

    /// Build a dataset straight from typed records, synthesising the raw
    /// table. Used by tests and by callers that already hold records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let column_names: Vec<String> =
            [ID_COLUMN, AGE_COLUMN, SEX_COLUMN, WEIGHT_COLUMN, DATE_COLUMN]
                .iter()
                .map(|c| c.to_string())
                .collect();
        let text = |v: Option<&str>| {
            v.map(|s| CellValue::String(s.to_string()))
                .unwrap_or(CellValue::Null)
        };
        let rows = records
            .iter()
            .map(|r| {
                vec![
                    text(r.individual.as_deref()),
                    text(r.age_class.as_ref().map(AgeClass::label)),
                    text(r.sex.as_ref().map(Sex::label)),
                    r.weight_kg.map(CellValue::Float).unwrap_or(CellValue::Null),
                    text(r.capture_date.as_deref()),
                ]
            })
            .collect();
        Dataset {
            records,
            column_names,
            rows,
        }
    }

    /// Whether the named column exists (after trimming).
    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
