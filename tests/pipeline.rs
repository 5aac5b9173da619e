use std::io::Write;

use iguana_dashboard::aggregate::composition::age_composition;
use iguana_dashboard::aggregate::kpi::KpiSummary;
use iguana_dashboard::aggregate::temporal::daily_captures;
use iguana_dashboard::chart::ChartBuilder;
use iguana_dashboard::data::loader::load_file;
use iguana_dashboard::report::{load_dataset, Report};
use iguana_dashboard::{DashboardConfig, DataError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;

const CAPTURES: &str = "\
Individuos, Edad ,Sexo,Peso_Kg,Fecha_entrga_CAV
IG-1,Adulto,Macho,3.1,05/03/2024
IG-2,Adulto,Hembra,2.4,05/03/2024
IG-3,Juvenil,Macho,0.4,04/03/2024 10:30
IG-4,Subadulto,Hembra,,2024-03-06
IG-5,Adulto,Macho,2.9,sin fecha
";

fn fixture(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_for(file: &NamedTempFile) -> DashboardConfig {
    DashboardConfig {
        data_path: file.path().to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn csv_to_full_report() {
    let file = fixture(".csv", CAPTURES);
    let report = Report::build(&config_for(&file)).unwrap();

    assert_eq!(report.kpis.total_individuals, 5);
    assert_eq!(report.kpis.adults, 3);
    assert_eq!(report.kpis.adults_pct, 60.0);
    assert_eq!(report.kpis.males, 3);
    assert_eq!(report.kpis.male_female_ratio, 1.5);
    assert_eq!(report.kpis.weight_max, Some(3.1));
    assert_eq!(report.charts.rendered(), 5);
}

#[test]
fn headers_are_trimmed_and_composition_is_ordered() {
    let file = fixture(".csv", CAPTURES);
    let dataset = load_file(file.path()).unwrap();
    assert!(dataset.has_column("Edad"));

    let stat = age_composition(&dataset).unwrap();
    assert_eq!(stat.labels(), vec!["Adulto", "Juvenil", "Subadulto"]);
    assert_eq!(stat.percentages(), vec![60.0, 20.0, 20.0]);
}

#[test]
fn capture_days_are_ascending_and_bad_dates_dropped() {
    let file = fixture(".csv", CAPTURES);
    let dataset = load_file(file.path()).unwrap();
    let series = daily_captures(&dataset).unwrap();

    let days: Vec<(String, usize)> = series
        .points
        .iter()
        .map(|p| (p.date.to_string(), p.count))
        .collect();
    assert_eq!(
        days,
        vec![
            ("2024-03-04".to_string(), 1),
            ("2024-03-05".to_string(), 2),
            ("2024-03-06".to_string(), 1),
        ]
    );
    assert_eq!(series.discarded, 1);
}

#[test]
fn missing_weight_column_is_a_schema_error() {
    let file = fixture(".csv", "Edad,Sexo\nAdulto,Macho\n");
    match load_file(file.path()) {
        Err(DataError::Schema { missing, found }) => {
            assert_eq!(missing, vec!["Peso_Kg".to_string()]);
            assert_eq!(found, vec!["Edad".to_string(), "Sexo".to_string()]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn header_only_file_is_no_data() {
    let file = fixture(".csv", "Edad,Sexo,Peso_Kg\n");
    let err = load_dataset(&config_for(&file)).unwrap_err();
    assert!(matches!(err, DataError::Empty(_)));
}

#[test]
fn exported_json_loads_back() {
    let file = fixture(
        ".json",
        &json!({
            "columns": ["Edad", "Sexo", "Peso_Kg"],
            "records": [
                {"Edad": "Adulto", "Sexo": "Hembra", "Peso_Kg": 2.0},
                {"Edad": "Juvenil", "Sexo": "Macho", "Peso_Kg": null}
            ]
        })
        .to_string(),
    );
    let dataset = load_file(file.path()).unwrap();
    assert_eq!(dataset.column_names, vec!["Edad", "Sexo", "Peso_Kg"]);

    let kpis = KpiSummary::compute(&dataset);
    assert_eq!(kpis.weight_mean, Some(2.0));
    assert_eq!(kpis.male_female_ratio, 1.0);
}

#[test]
fn custom_palette_reaches_the_charts() {
    let file = fixture(".csv", CAPTURES);
    let dataset = load_file(file.path()).unwrap();
    let config = DashboardConfig::from_lookup(|key| {
        (key == "DASHBOARD_PALETTE").then(|| "#112233,#445566,#778899,#AABBCC".to_string())
    })
    .unwrap();

    let report = Report::from_dataset(&dataset, &ChartBuilder::new(config.palette));
    let sex = serde_json::to_value(report.charts.sex.unwrap()).unwrap();
    assert_eq!(sex["data"][0]["marker"]["color"], json!(["#112233", "#AABBCC"]));
}
