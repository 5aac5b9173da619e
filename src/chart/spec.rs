//! Declarative chart description, serialised in the shape Plotly.js takes
//! for `Plotly.newPlot(div, spec.data, spec.layout)`.
//!
//! Only the attributes the dashboard uses are modelled. `None` fields and
//! empty lists are left out of the JSON so Plotly applies its defaults.

use serde::Serialize;
use serde_json::Value;

use crate::color::Color;

/// A complete figure: traces plus layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Traces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie(Pie),
    Table(Table),
    Bar(Bar),
    Histogram(Histogram),
    Box(BoxPlot),
    Scatter(Scatter),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pie {
    pub values: Vec<usize>,
    pub labels: Vec<String>,
    pub hole: f64,
    pub marker: Marker,
    pub textinfo: String,
    pub textposition: String,
    pub hoverinfo: String,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub header: TableSection,
    pub cells: TableSection,
    pub domain: Domain,
}

/// Header or body of a table trace. Header `values` holds one entry per
/// column; cell `values` holds one array per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSection {
    pub values: Vec<Value>,
    pub fill: Fill,
    pub font: Font,
    pub align: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub x: Vec<String>,
    pub y: Vec<usize>,
    pub marker: Marker,
    pub text: Vec<String>,
    pub textposition: String,
    pub hoverinfo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub x: Vec<f64>,
    pub nbinsx: u32,
    pub marker: Marker,
    pub opacity: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub y: Vec<f64>,
    pub name: String,
    pub marker: Marker,
    /// Draw the mean as a dashed line inside the box.
    pub boxmean: bool,
    pub showlegend: bool,
    pub legendgroup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Vec<String>,
    pub y: Vec<usize>,
    pub mode: String,
    pub name: String,
    pub line: Line,
    pub marker: Marker,
    pub hovertemplate: String,
}

// ---------------------------------------------------------------------------
// Trace attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    One(Color),
    Each(Vec<Color>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<MarkerColor>,
    /// Pie slice colours.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl Marker {
    pub fn color(color: Color) -> Self {
        Marker {
            color: Some(MarkerColor::One(color)),
            ..Default::default()
        }
    }

    pub fn each(colors: Vec<Color>) -> Self {
        Marker {
            color: Some(MarkerColor::Each(colors)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    pub x: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Font {
    pub fn size(size: u32) -> Self {
        Font {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = Some("bold".into());
        self
    }

    pub fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boxmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// Horizontal position, 0.5 centres the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
}

impl Title {
    /// Bold heading with a second line of context.
    pub fn with_subtitle(heading: &str, subtitle: &str, size: u32) -> Self {
        Title {
            text: format!("{heading}<br>{subtitle}"),
            font: Some(Font::size(size).bold()),
            x: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangemode: Option<String>,
}

impl Axis {
    pub fn titled(text: &str) -> Self {
        Axis {
            title: Some(AxisTitle { text: text.into() }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

/// Layout shape; only vertical reference lines are produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: String,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub xref: String,
    pub yref: String,
    pub line: Line,
}

impl Shape {
    /// Full-height vertical line at data coordinate `x`.
    pub fn vline(x: f64, line: Line) -> Self {
        Shape {
            shape_type: "line".into(),
            x0: x,
            x1: x,
            y0: 0.0,
            y1: 1.0,
            xref: "x".into(),
            yref: "paper".into(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}
