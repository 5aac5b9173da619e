use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::model::Dataset;

/// Records-oriented export: `{ "columns": [...], "records": [{col: value}] }`.
///
/// The `records` array is exactly what the JSON loader reads back.
#[derive(Debug, Serialize)]
pub struct RecordExport {
    pub columns: Vec<String>,
    pub records: Vec<Map<String, Value>>,
}

impl RecordExport {
    pub fn from_dataset(dataset: &Dataset) -> serde_json::Result<Self> {
        let records = dataset
            .rows
            .iter()
            .map(|row| {
                dataset
                    .column_names
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| Ok((col.clone(), serde_json::to_value(cell)?)))
                    .collect::<serde_json::Result<Map<String, Value>>>()
            })
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(RecordExport {
            columns: dataset.column_names.clone(),
            records,
        })
    }
}

/// The raw table as CSV, header first. Null cells become empty fields.
pub fn records_csv(dataset: &Dataset) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&dataset.column_names)?;
    for row in &dataset.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new("Adulto", "Macho", 2.5).with_capture_date("01/02/2024"),
            Record::new("Juvenil", "Hembra", -1.0),
        ])
    }

    #[test]
    fn json_export_lists_columns_and_nulls() {
        let export = RecordExport::from_dataset(&dataset()).unwrap();
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(
            value["columns"],
            json!(["Individuos", "Edad", "Sexo", "Peso_Kg", "Fecha_entrga_CAV"])
        );
        assert_eq!(
            value["records"][0],
            json!({
                "Individuos": null,
                "Edad": "Adulto",
                "Sexo": "Macho",
                "Peso_Kg": 2.5,
                "Fecha_entrga_CAV": "01/02/2024"
            })
        );
        assert_eq!(value["records"][1]["Peso_Kg"], Value::Null);
    }

    #[test]
    fn csv_export() {
        let csv = records_csv(&dataset()).unwrap();
        assert_eq!(
            csv,
            "Individuos,Edad,Sexo,Peso_Kg,Fecha_entrga_CAV\n\
             ,Adulto,Macho,2.5,01/02/2024\n\
             ,Juvenil,Hembra,,\n"
        );
    }
}
