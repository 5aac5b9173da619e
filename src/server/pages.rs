//! HTML pages. Charts are drawn client-side by Plotly from the embedded
//! chart JSON.

use crate::aggregate::kpi::KpiSummary;
use crate::aggregate::sex::SexDistribution;
use crate::aggregate::SummaryStat;
use crate::chart::ChartSpec;
use crate::data::model::Dataset;
use crate::report::{Charts, Report};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Rows rendered by the data-table page; the full table is served by the
/// export endpoints.
pub const TABLE_PREVIEW_ROWS: usize = 500;

const STYLE: &str = r#"
    :root { --green: #2E8B57; --light: #90EE90; --gold: #DAA520; --bg: #f4f7f4; }
    * { box-sizing: border-box; }
    body { font-family: "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; background: var(--bg); color: #1d2b1f; }
    header { background: var(--green); color: white; padding: 1rem 2rem; display: flex; gap: 2rem; align-items: center; }
    header a { color: white; text-decoration: none; font-weight: 600; }
    main { max-width: 1300px; margin: 0 auto; padding: 2rem; }
    .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
    .card { background: white; border-radius: 12px; padding: 1rem 1.25rem; box-shadow: 0 2px 6px rgba(0,0,0,0.08); border-left: 5px solid var(--green); }
    .card .value { font-size: 1.8rem; font-weight: 700; }
    .card .label { color: #5b6b5e; font-size: 0.9rem; }
    .chart { background: white; border-radius: 12px; padding: 1rem; margin-bottom: 1.5rem; box-shadow: 0 2px 6px rgba(0,0,0,0.08); }
    .missing { color: #8a6d1f; font-style: italic; }
    table { border-collapse: collapse; width: 100%; background: white; font-size: 0.9rem; }
    th { background: var(--green); color: white; position: sticky; top: 0; }
    th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid #e3e9e3; text-align: left; }
    .scroll { max-height: 600px; overflow: auto; margin-bottom: 2rem; }
    .error { background: #fff3f0; border: 1px solid #f1b5a8; border-radius: 12px; padding: 1.5rem; }
"#;

/// Escape text for HTML element content and attribute values.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make JSON safe to embed inside a `<script>` element.
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn layout(title: &str, body: &str, with_plotly: bool) -> String {
    let script = if with_plotly {
        format!(r#"<script src="{PLOTLY_CDN}"></script>"#)
    } else {
        String::new()
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} · Iguana Population Dashboard</title>
{script}
<style>{STYLE}</style>
</head>
<body>
<header>
<strong>Iguana Population Dashboard</strong>
<a href="/dashboard">Dashboard</a>
<a href="/charts">Charts</a>
<a href="/data-table">Data table</a>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = html_escape(title),
    )
}

pub fn landing() -> String {
    let body = r#"<h1>Iguana population monitoring</h1>
<p>Composition by age class and sex, body-weight distribution and daily
capture counts, computed from the monitoring spreadsheet on every request.</p>
<div class="cards">
<a class="card" href="/dashboard"><div class="value">KPIs</div><div class="label">Headline figures and all charts</div></a>
<a class="card" href="/charts"><div class="value">Charts</div><div class="label">The five population charts</div></a>
<a class="card" href="/data-table"><div class="value">Data</div><div class="label">Raw records and distributions</div></a>
</div>
<p>JSON: <a href="/api/kpis">/api/kpis</a> · <a href="/api/charts">/api/charts</a> ·
<a href="/api/records">/api/records</a> · CSV: <a href="/api/records.csv">/api/records.csv</a></p>"#;
    layout("Home", body, false)
}

fn card(value: &str, label: &str) -> String {
    format!(
        r#"<div class="card"><div class="value">{}</div><div class="label">{}</div></div>"#,
        html_escape(value),
        html_escape(label)
    )
}

fn weight(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |w| format!("{w:.2} kg"))
}

fn kpi_cards(kpis: &KpiSummary) -> String {
    [
        card(&kpis.total_individuals.to_string(), "Individuals"),
        card(
            &kpis.adults.to_string(),
            &format!("Adults ({:.1}%)", kpis.adults_pct),
        ),
        card(
            &kpis.subadults.to_string(),
            &format!("Subadults ({:.1}%)", kpis.subadults_pct),
        ),
        card(
            &kpis.juveniles.to_string(),
            &format!("Juveniles ({:.1}%)", kpis.juveniles_pct),
        ),
        card(
            &kpis.males.to_string(),
            &format!("Males ({:.1}%)", kpis.males_pct),
        ),
        card(
            &kpis.females.to_string(),
            &format!("Females ({:.1}%)", kpis.females_pct),
        ),
        card(&format!("{:.2}", kpis.male_female_ratio), "Male : female ratio"),
        card(&weight(kpis.weight_mean), "Mean weight"),
        card(&weight(kpis.weight_median), "Median weight"),
    ]
    .concat()
}

fn chart_blocks(charts: &Charts) -> String {
    let mut html = String::new();
    let mut scripts = String::new();
    for (name, chart) in charts.iter() {
        match chart.and_then(|c| render_json(name, c)) {
            Some(json) => {
                html.push_str(&format!(r#"<div class="chart" id="chart-{name}"></div>"#));
                scripts.push_str(&format!(
                    "{{ const fig = {json}; Plotly.newPlot('chart-{name}', fig.data, fig.layout, {{responsive: true}}); }}\n",
                    json = script_json(&json),
                ));
            }
            None => html.push_str(&format!(
                r#"<div class="chart missing">The {} chart is unavailable for this dataset.</div>"#,
                name.replace('_', " ")
            )),
        }
    }
    format!("{html}\n<script>\n{scripts}</script>")
}

fn render_json(name: &str, chart: &ChartSpec) -> Option<String> {
    match chart.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("{name} chart could not be serialised: {e}");
            None
        }
    }
}

pub fn dashboard(report: &Report) -> String {
    let body = format!(
        "<h1>Dashboard</h1>\n<div class=\"cards\">{}</div>\n{}",
        kpi_cards(&report.kpis),
        chart_blocks(&report.charts)
    );
    layout("Dashboard", &body, true)
}

pub fn charts(charts: &Charts) -> String {
    let body = format!("<h1>Charts</h1>\n{}", chart_blocks(charts));
    layout("Charts", &body, true)
}

fn distribution_table(heading: &str, stat: Option<&SummaryStat>) -> String {
    let Some(stat) = stat else {
        return format!(
            "<h2>{}</h2><p class=\"missing\">No data.</p>",
            html_escape(heading)
        );
    };
    let rows: String = stat
        .entries
        .iter()
        .map(|e| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}</td></tr>",
                html_escape(&e.label),
                e.count,
                e.percentage
            )
        })
        .collect();
    format!(
        "<h2>{}</h2>\n<table><thead><tr><th>Category</th><th>Count</th><th>Percentage (%)</th></tr></thead>\
         <tbody>{rows}</tbody></table>",
        html_escape(heading)
    )
}

pub fn data_table(
    dataset: &Dataset,
    ages: Option<&SummaryStat>,
    sexes: Option<&SexDistribution>,
) -> String {
    let header: String = dataset
        .column_names
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let rows: String = dataset
        .rows
        .iter()
        .take(TABLE_PREVIEW_ROWS)
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<td>{}</td>", html_escape(&cell.to_string())))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    let shown = dataset.len().min(TABLE_PREVIEW_ROWS);

    let body = format!(
        "<h1>Data table</h1>\n\
         <p>Showing {shown} of {total} records. Full export: \
         <a href=\"/api/records.csv\">CSV</a> · <a href=\"/api/records\">JSON</a></p>\n\
         <div class=\"scroll\"><table><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table></div>\n\
         {ages}\n{sexes}",
        total = dataset.len(),
        ages = distribution_table("By age class", ages),
        sexes = distribution_table("By sex", sexes.map(|s| &s.summary)),
    );
    layout("Data table", &body, false)
}

/// Shown with status 503 when the data file cannot be turned into a
/// dataset.
pub fn unavailable(reason: &str) -> String {
    let body = format!(
        "<div class=\"error\"><h1>Data unavailable</h1>\
         <p>The monitoring data could not be loaded.</p><pre>{}</pre></div>",
        html_escape(reason)
    );
    layout("Data unavailable", &body, false)
}

pub fn not_found(path: &str) -> String {
    let body = format!(
        "<h1>Not found</h1><p>No page at <code>{}</code>.</p><p><a href=\"/\">Home</a></p>",
        html_escape(path)
    );
    layout("Not found", &body, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBuilder;
    use crate::data::model::Record;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b>"Macho" & 'Hembra'</b>"#),
            "&lt;b&gt;&quot;Macho&quot; &amp; &#39;Hembra&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn embedded_json_cannot_close_the_script() {
        assert_eq!(script_json(r#"{"t":"</script>"}"#), r#"{"t":"<\/script>"}"#);
    }

    #[test]
    fn dashboard_renders_cards_and_every_chart() {
        let ds = Dataset::from_records(vec![
            Record::new("Adulto", "Macho", 2.0),
            Record::new("Juvenil", "Hembra", 0.5),
        ]);
        let report = Report::from_dataset(&ds, &ChartBuilder::default());
        let html = dashboard(&report);
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("chart-composition"));
        // No capture dates: the temporal chart still renders its note.
        assert!(html.contains("chart-daily_captures"));
        assert!(!html.contains("unavailable"));
        assert!(html.contains("Individuals"));
    }

    #[test]
    fn failed_charts_become_placeholders() {
        let html = charts(&Charts::default());
        assert!(html.contains("The weight histogram chart is unavailable"));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[test]
    fn data_table_escapes_cells() {
        let ds = Dataset::from_records(vec![Record::new("<Adulto>", "Macho", 1.0)]);
        let html = data_table(&ds, None, None);
        assert!(html.contains("&lt;Adulto&gt;"));
        assert!(html.contains("Showing 1 of 1 records"));
    }
}
