//! HTTP presentation layer.
//!
//! ```text
//!   tiny_http::Server ──► serve() ──► handle(method, path) ──► Reply
//!                                         │
//!                                         ├─ pages   (HTML)
//!                                         └─ export  (JSON / CSV)
//! ```
//!
//! [`handle`] is pure with respect to the network, so routing is tested
//! without opening a socket.

pub mod export;
pub mod pages;

use anyhow::{anyhow, Context};
use serde::Serialize;
use serde_json::json;

use crate::aggregate::composition::age_distribution;
use crate::aggregate::kpi::KpiSummary;
use crate::aggregate::sex::sex_distribution;
use crate::config::DashboardConfig;
use crate::error::DataError;
use crate::report::{load_dataset, Report};
use export::RecordExport;

pub const HTML: &str = "text/html; charset=utf-8";
pub const JSON: &str = "application/json";
pub const CSV: &str = "text/csv; charset=utf-8";

/// A fully rendered response, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn html(status: u16, body: String) -> Self {
        Reply {
            status,
            content_type: HTML,
            body,
        }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Reply {
                status,
                content_type: JSON,
                body,
            },
            Err(e) => Self::internal(&e.to_string()),
        }
    }

    fn internal(reason: &str) -> Self {
        log::error!("response could not be rendered: {reason}");
        Reply {
            status: 500,
            content_type: JSON,
            body: json!({ "error": reason }).to_string(),
        }
    }

    fn json_error(status: u16, err: &DataError) -> Self {
        Self::json(status, &json!({ "error": err.to_string() }))
    }
}

/// Status for a dataset that could not be produced.
fn data_failure(err: &DataError) -> u16 {
    log::error!("data unavailable: {err}");
    503
}

/// Route one request. The data file is re-read for every data route.
pub fn handle(config: &DashboardConfig, method: &str, path: &str) -> Reply {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if !method.eq_ignore_ascii_case("GET") {
        return Reply {
            status: 405,
            content_type: "text/plain; charset=utf-8",
            body: format!("method {method} not allowed"),
        };
    }

    match path {
        "/" | "/index.html" => Reply::html(200, pages::landing()),
        "/dashboard" => match Report::build(config) {
            Ok(report) => Reply::html(200, pages::dashboard(&report)),
            Err(e) => Reply::html(data_failure(&e), pages::unavailable(&e.to_string())),
        },
        "/charts" => match Report::build(config) {
            Ok(report) => Reply::html(200, pages::charts(&report.charts)),
            Err(e) => Reply::html(data_failure(&e), pages::unavailable(&e.to_string())),
        },
        "/data-table" => match load_dataset(config) {
            Ok(dataset) => {
                let ages = age_distribution(&dataset).ok();
                let sexes = sex_distribution(&dataset).ok();
                Reply::html(
                    200,
                    pages::data_table(&dataset, ages.as_ref(), sexes.as_ref()),
                )
            }
            Err(e) => Reply::html(data_failure(&e), pages::unavailable(&e.to_string())),
        },
        "/api/kpis" => match load_dataset(config) {
            Ok(dataset) => Reply::json(200, &KpiSummary::compute(&dataset)),
            Err(e) => Reply::json_error(data_failure(&e), &e),
        },
        "/api/charts" => match Report::build(config) {
            Ok(report) => Reply::json(200, &report.charts),
            Err(e) => Reply::json_error(data_failure(&e), &e),
        },
        "/api/records" => match load_dataset(config) {
            Ok(dataset) => match RecordExport::from_dataset(&dataset) {
                Ok(export) => Reply::json(200, &export),
                Err(e) => Reply::internal(&e.to_string()),
            },
            Err(e) => Reply::json_error(data_failure(&e), &e),
        },
        "/api/records.csv" => match load_dataset(config) {
            Ok(dataset) => match export::records_csv(&dataset) {
                Ok(body) => Reply {
                    status: 200,
                    content_type: CSV,
                    body,
                },
                Err(e) => Reply::internal(&e.to_string()),
            },
            Err(e) => Reply::json_error(data_failure(&e), &e),
        },
        other => Reply::html(404, pages::not_found(other)),
    }
}

/// Bind and answer requests one at a time until the process is stopped.
pub fn serve(config: &DashboardConfig) -> anyhow::Result<()> {
    let address = config.bind_address();
    let server = tiny_http::Server::http(&address)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("failed to bind {address}"))?;
    log::info!(
        "serving iguana dashboard on http://{address} (data: {})",
        config.data_path.display()
    );

    for request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        let reply = handle(config, &method, &url);
        log::info!("{method} {url} -> {}", reply.status);

        let mut response =
            tiny_http::Response::from_string(reply.body).with_status_code(reply.status);
        if let Ok(header) = tiny_http::Header::from_bytes("Content-Type", reply.content_type) {
            response = response.with_header(header);
        }
        if let Err(e) = request.respond(response) {
            log::warn!("failed to send response for {url}: {e}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_data() -> DashboardConfig {
        DashboardConfig {
            data_path: "/nonexistent/especies.xlsx".into(),
            ..Default::default()
        }
    }

    #[test]
    fn landing_needs_no_data() {
        let reply = handle(&missing_data(), "GET", "/");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, HTML);
    }

    #[test]
    fn query_strings_are_ignored_for_routing() {
        assert_eq!(handle(&missing_data(), "GET", "/?tab=1").status, 200);
    }

    #[test]
    fn unknown_paths_and_methods() {
        assert_eq!(handle(&missing_data(), "GET", "/graficos").status, 404);
        assert_eq!(handle(&missing_data(), "POST", "/").status, 405);
    }

    #[test]
    fn data_routes_report_unavailable_data() {
        let config = missing_data();
        let page = handle(&config, "GET", "/dashboard");
        assert_eq!(page.status, 503);
        assert!(page.body.contains("Data unavailable"));

        let api = handle(&config, "GET", "/api/kpis");
        assert_eq!(api.status, 503);
        let body: serde_json::Value = serde_json::from_str(&api.body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("especies.xlsx"));
    }
}
