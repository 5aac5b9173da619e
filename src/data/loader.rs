use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{open_workbook, open_workbook_auto, Data, Range, Reader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::filter::distinct;
use super::model::{CellValue, Dataset, RawTable, AGE_COLUMN, ID_COLUMN, SEX_COLUMN};
use crate::error::{DataError, Result};

/// A single way of turning a file into a table. Failures are reported as
/// text so that several attempts can be summarised in one error.
type TableParser = fn(&Path) -> std::result::Result<RawTable, String>;

/// Workbook readers, tried in order until one succeeds.
const WORKBOOK_PARSERS: &[(&str, TableParser)] = &[
    ("xlsx", read_xlsx),
    ("auto-detect", read_workbook_auto),
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and validate a dataset. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.xlsb` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row, comma separated
/// * `.json`    – `[{ "Edad": "Adulto", "Sexo": "Macho", ... }, ...]`
/// * `.parquet` – flat columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let table = read_table(path)?;
    log::debug!("columns after trimming: {:?}", trimmed(&table.columns));

    let dataset = Dataset::from_table(table)?;
    log::info!(
        "loaded {} records ({} columns) from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    if log::log_enabled!(log::Level::Debug) {
        let ages = distinct(&dataset.records, |r| r.age_class.as_ref());
        let sexes = distinct(&dataset.records, |r| r.sex.as_ref());
        log::debug!("distinct {AGE_COLUMN} values: {ages:?}");
        log::debug!("distinct {SEX_COLUMN} values: {sexes:?}");
    }
    Ok(dataset)
}

/// Parse the file into a raw table without schema validation.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !path.exists() {
        return Err(DataError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => first_successful(path, WORKBOOK_PARSERS),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

fn trimmed(columns: &[String]) -> Vec<&str> {
    columns.iter().map(|c| c.trim()).collect()
}

/// Run `parsers` in order and return the first table produced.
fn first_successful(path: &Path, parsers: &[(&str, TableParser)]) -> Result<RawTable> {
    let mut failures = Vec::with_capacity(parsers.len());
    for (name, parse) in parsers {
        match parse(path) {
            Ok(table) => {
                if !failures.is_empty() {
                    log::info!("{} read with fallback reader '{name}'", path.display());
                }
                return Ok(table);
            }
            Err(reason) => {
                log::warn!("reader '{name}' failed on {}: {reason}", path.display());
                failures.push(format!("{name}: {reason}"));
            }
        }
    }
    Err(DataError::Load {
        path: path.to_path_buf(),
        reason: failures.join("; "),
    })
}

// ---------------------------------------------------------------------------
// Workbook readers
// ---------------------------------------------------------------------------

fn read_xlsx(path: &Path) -> std::result::Result<RawTable, String> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;
    range_to_table(&range)
}

fn read_workbook_auto(path: &Path) -> std::result::Result<RawTable, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;
    range_to_table(&range)
}

/// First row is the header, the rest are records.
fn range_to_table(range: &Range<Data>) -> std::result::Result<RawTable, String> {
    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| "worksheet is empty".to_string())?;
    let columns: Vec<String> = header.iter().map(|c| data_to_cell(c).to_string()).collect();
    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();
    Ok(RawTable { columns, rows })
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => CellValue::Date(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let load_err = |e: csv::Error| DataError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(load_err)?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(load_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    // Identifiers stay text so codes like "007" survive the export.
    let id_idx = columns.iter().position(|c| c.trim() == ID_COLUMN);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(load_err)?;
        rows.push(
            record
                .iter()
                .enumerate()
                .map(|(i, field)| match id_idx {
                    Some(id) if id == i && !field.is_empty() => {
                        CellValue::String(field.to_string())
                    }
                    _ => guess_cell_type(field),
                })
                .collect(),
        );
    }
    Ok(RawTable { columns, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if has_leading_zero(s) {
        return CellValue::String(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

/// `007` or `-01`, but not `0`, `0.5` or `-0.25`.
fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut chars = digits.chars();
    chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by the `/api/records` export:
///
/// ```json
/// [
///   { "Edad": "Adulto", "Sexo": "Macho", "Peso_Kg": 2.1 },
///   ...
/// ]
/// ```
///
/// A wrapping object with a `records` array is accepted as well.
fn load_json(path: &Path) -> Result<RawTable> {
    let load_err = |reason: String| DataError::Load {
        path: path.to_path_buf(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))?;

    let records = root
        .as_array()
        .or_else(|| root.get("records").and_then(JsonValue::as_array))
        .ok_or_else(|| load_err("expected a top-level JSON array of records".into()))?;

    // An exported `{columns, records}` document restores its column order.
    let mut columns: Vec<String> = root
        .get("columns")
        .and_then(JsonValue::as_array)
        .map(|cols| {
            cols.iter()
                .filter_map(|c| c.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| load_err(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<CellValue>> = records
        .iter()
        .map(|rec| {
            columns
                .iter()
                .map(|col| rec.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat Parquet file: one column per field, as written by
/// `df.to_parquet()` or by the `generate_sample` binary.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let load_err = |reason: String| DataError::Load {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| load_err(format!("reading parquet metadata: {e}")))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| load_err(format!("building parquet reader: {e}")))?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| load_err(format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => match col.as_primitive::<Date32Type>().value_as_date(row) {
            Some(date) => CellValue::Date(date.format("%Y-%m-%d").to_string()),
            None => CellValue::Null,
        },
        other => CellValue::String(format!("{other:?}")),
    }
}
