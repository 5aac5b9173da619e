use std::io::Write;

use iguana_dashboard::server::{handle, CSV, HTML, JSON};
use iguana_dashboard::DashboardConfig;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::NamedTempFile;

fn dataset_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(
        b"Edad,Sexo,Peso_Kg,Fecha_entrga_CAV\n\
          Adulto,Macho,3.0,01/04/2024\n\
          Juvenil,Hembra,0.5,02/04/2024\n\
          Adulto,Hembra,2.5,02/04/2024\n",
    )
    .unwrap();
    file
}

fn config(file: &NamedTempFile) -> DashboardConfig {
    DashboardConfig {
        data_path: file.path().to_path_buf(),
        ..Default::default()
    }
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[test]
fn pages_render() {
    let file = dataset_file();
    let config = config(&file);
    for path in ["/", "/dashboard", "/charts", "/data-table"] {
        let reply = handle(&config, "GET", path);
        assert_eq!(reply.status, 200, "{path}");
        assert_eq!(reply.content_type, HTML);
    }
}

#[test]
fn kpis_endpoint() {
    let file = dataset_file();
    let reply = handle(&config(&file), "GET", "/api/kpis");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, JSON);

    let kpis = json_body(&reply.body);
    assert_eq!(kpis["total_individuals"], 3);
    assert_eq!(kpis["adults"], 2);
    assert_eq!(kpis["females"], 2);
    assert_eq!(kpis["male_female_ratio"], 0.5);
}

#[test]
fn charts_endpoint_returns_all_five() {
    let file = dataset_file();
    let charts = json_body(&handle(&config(&file), "GET", "/api/charts").body);
    for name in [
        "composition",
        "sex",
        "weight_histogram",
        "weight_boxplot",
        "daily_captures",
    ] {
        assert!(charts[name]["data"].is_array(), "{name}");
    }
    assert_eq!(charts["weight_histogram"]["data"][0]["nbinsx"], 30);
}

#[test]
fn record_exports() {
    let file = dataset_file();
    let config = config(&file);

    let records = json_body(&handle(&config, "GET", "/api/records").body);
    assert_eq!(records["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(records["records"][1]["Sexo"], "Hembra");

    let csv = handle(&config, "GET", "/api/records.csv");
    assert_eq!(csv.content_type, CSV);
    assert_eq!(
        csv.body.lines().next(),
        Some("Edad,Sexo,Peso_Kg,Fecha_entrga_CAV")
    );
    assert_eq!(csv.body.lines().count(), 4);
}

#[test]
fn file_changes_are_picked_up_per_request() {
    let mut file = dataset_file();
    let config = config(&file);
    let before = json_body(&handle(&config, "GET", "/api/kpis").body);

    file.write_all(b"Subadulto,Macho,1.2,03/04/2024\n").unwrap();
    file.flush().unwrap();
    let after = json_body(&handle(&config, "GET", "/api/kpis").body);

    assert_eq!(before["total_individuals"], 3);
    assert_eq!(after["total_individuals"], 4);
}

#[test]
fn schema_failure_is_503() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(b"Edad,Peso_Kg\nAdulto,2.0\n").unwrap();
    let config = config(&file);

    let page = handle(&config, "GET", "/data-table");
    assert_eq!(page.status, 503);
    assert!(page.body.contains("Sexo"));

    let api = handle(&config, "GET", "/api/records.csv");
    assert_eq!(api.status, 503);
    assert!(json_body(&api.body)["error"].is_string());
}

#[test]
fn data_table_shares_count_blank_cells() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(
        b"Edad,Sexo,Peso_Kg\n\
          Adulto,Macho,3.0\n\
          Adulto,Macho,2.8\n\
          Juvenil,Hembra,0.5\n\
          ,,1.0\n",
    )
    .unwrap();
    let page = handle(&config(&file), "GET", "/data-table");
    assert_eq!(page.status, 200);
    // Two of four records in each category.
    assert!(page.body.contains("<td>Adulto</td><td>2</td><td>50.0</td>"));
    assert!(page.body.contains("<td>Macho</td><td>2</td><td>50.0</td>"));
    assert!(page.body.contains("<td>Hembra</td><td>1</td><td>25.0</td>"));
}
