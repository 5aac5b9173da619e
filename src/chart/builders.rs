use serde_json::{json, Value};

use super::spec::*;
use crate::aggregate::cross::WeightGroup;
use crate::aggregate::sex::SexDistribution;
use crate::aggregate::temporal::DailyCaptureSeries;
use crate::aggregate::weight::WeightStats;
use crate::aggregate::SummaryStat;
use crate::color::Palette;
use crate::data::model::Sex;

/// Histogram bin count for the weight distribution.
pub const WEIGHT_BINS: u32 = 30;
/// Fraction of the composition donut left empty in the middle.
pub const DONUT_HOLE: f64 = 0.4;

const GRID_COLOR: &str = "lightgray";

/// Turns aggregator output into [`ChartSpec`]s.
///
/// Every method is a pure function of its arguments and the palette the
/// builder was created with.
#[derive(Debug, Clone, Default)]
pub struct ChartBuilder {
    palette: Palette,
}

impl ChartBuilder {
    pub fn new(palette: Palette) -> Self {
        ChartBuilder { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Donut of the age classes with a count/percentage table beside it.
    pub fn composition(&self, stat: &SummaryStat) -> ChartSpec {
        let labels = stat.labels();
        let counts = stat.counts();
        let header_color = self.palette.primary().to_hex();

        let donut = Pie {
            values: counts.clone(),
            labels: labels.clone(),
            hole: DONUT_HOLE,
            marker: Marker {
                colors: Some(self.palette.take(labels.len())),
                ..Default::default()
            },
            textinfo: "label+percent".into(),
            textposition: "outside".into(),
            hoverinfo: "label+value+percent".into(),
            domain: Domain { x: [0.0, 0.48] },
        };

        let table = Table {
            header: TableSection {
                values: vec![json!("Category"), json!("Count"), json!("Percentage (%)")],
                fill: Fill {
                    color: header_color,
                },
                font: Font::size(12).colored("white"),
                align: "center".into(),
            },
            cells: TableSection {
                values: vec![
                    json!(labels),
                    json!(counts),
                    Value::from(
                        stat.percentages()
                            .iter()
                            .map(|p| format!("{p:.1}%"))
                            .collect::<Vec<_>>(),
                    ),
                ],
                fill: Fill {
                    color: "white".into(),
                },
                font: Font::size(11).colored("black"),
                align: "center".into(),
            },
            domain: Domain { x: [0.52, 1.0] },
        };

        let subtitle = match stat.entries.first() {
            Some(top) => format!("{} is the largest class ({:.1}%)", top.label, top.percentage),
            None => "No individuals".to_string(),
        };

        ChartSpec {
            data: vec![Trace::Pie(donut), Trace::Table(table)],
            layout: Layout {
                title: Title {
                    x: Some(0.5),
                    ..Title::with_subtitle("COMPOSITION BY AGE", &subtitle, 16)
                },
                height: 500,
                showlegend: Some(true),
                annotations: vec![Annotation {
                    text: format!("TOTAL<br>{}<br>INDIVIDUALS", stat.total),
                    x: 0.12,
                    y: 0.5,
                    showarrow: false,
                    font: Some(Font {
                        style: Some("italic".into()),
                        ..Font::size(16).bold()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            },
        }
    }

    /// One bar per sex, labelled with count and share.
    pub fn sex_distribution(&self, dist: &SexDistribution) -> ChartSpec {
        let entries = &dist.summary.entries;
        let colors = entries
            .iter()
            .map(|e| self.palette.sex_color(&Sex::from_label(&e.label)))
            .collect();

        let bar = Bar {
            x: dist.summary.labels(),
            y: dist.summary.counts(),
            marker: Marker::each(colors),
            text: entries
                .iter()
                .map(|e| format!("{} ({:.1}%)", e.count, e.percentage))
                .collect(),
            textposition: "auto".into(),
            hoverinfo: "x+y".into(),
        };

        let subtitle = if dist.females == 0 {
            format!("{} males, no females", dist.males)
        } else {
            format!("Male:female ratio {:.2}", dist.male_female_ratio)
        };

        ChartSpec {
            data: vec![Trace::Bar(bar)],
            layout: Layout {
                title: Title::with_subtitle("DISTRIBUTION BY SEX", &subtitle, 16),
                height: 400,
                xaxis: Some(Axis::titled("Sex")),
                yaxis: Some(Axis::titled("Number of individuals")),
                showlegend: Some(false),
                ..Default::default()
            },
        }
    }

    /// Weight histogram with dashed mean and median reference lines.
    pub fn weight_histogram(&self, weights: &[f64], stats: &WeightStats) -> ChartSpec {
        let histogram = Histogram {
            x: weights.to_vec(),
            nbinsx: WEIGHT_BINS,
            marker: Marker::color(self.palette.primary()),
            opacity: 0.7,
            name: "Weight distribution".into(),
        };

        let reference = |x: f64, color: &str, label: String| {
            let shape = Shape::vline(
                x,
                Line {
                    color: Some(color.into()),
                    width: Some(2.0),
                    dash: Some("dash".into()),
                },
            );
            let note = Annotation {
                text: label,
                x,
                y: 1.0,
                xref: Some("x".into()),
                yref: Some("paper".into()),
                xanchor: Some("left".into()),
                showarrow: false,
                font: Some(Font::size(12).colored(color)),
            };
            (shape, note)
        };
        let (mean_line, mean_note) =
            reference(stats.mean, "red", format!("Mean: {:.2} kg", stats.mean));
        let (median_line, median_note) =
            reference(stats.median, "blue", format!("Median: {:.2} kg", stats.median));

        ChartSpec {
            data: vec![Trace::Histogram(histogram)],
            layout: Layout {
                title: Title::with_subtitle(
                    "WEIGHT DISTRIBUTION",
                    &format!("Range {:.2} - {:.2} kg", stats.min, stats.max),
                    16,
                ),
                height: 400,
                xaxis: Some(Axis::titled("Weight (kg)")),
                yaxis: Some(Axis::titled("Frequency")),
                bargap: Some(0.1),
                shapes: vec![mean_line, median_line],
                annotations: vec![mean_note, median_note],
                ..Default::default()
            },
        }
    }

    /// One box per sex × age-class group; a single legend entry per sex.
    pub fn weight_boxplot(&self, groups: &[WeightGroup]) -> ChartSpec {
        let mut legend_shown: Vec<&str> = Vec::new();
        let data = groups
            .iter()
            .map(|group| {
                let first_of_sex = !legend_shown.contains(&group.sex.as_str());
                if first_of_sex {
                    legend_shown.push(&group.sex);
                }
                Trace::Box(BoxPlot {
                    y: group.weights.clone(),
                    name: group.label.clone(),
                    marker: Marker::color(self.palette.sex_color(&Sex::from_label(&group.sex))),
                    boxmean: true,
                    showlegend: first_of_sex,
                    legendgroup: group.sex.clone(),
                })
            })
            .collect();

        ChartSpec {
            data,
            layout: Layout {
                title: Title::with_subtitle("WEIGHT BY AGE AND SEX", "Sexual dimorphism", 16),
                height: 500,
                xaxis: Some(Axis::titled("Category")),
                yaxis: Some(Axis::titled("Weight (kg)")),
                boxmode: Some("group".into()),
                ..Default::default()
            },
        }
    }

    /// Daily capture counts as a line with markers on a category axis.
    ///
    /// An empty series yields a figure without traces carrying a
    /// "no valid capture dates" note.
    pub fn daily_captures(&self, series: &DailyCaptureSeries) -> ChartSpec {
        let grid_axis = |title: &str| Axis {
            showgrid: Some(true),
            gridcolor: Some(GRID_COLOR.into()),
            ..Axis::titled(title)
        };

        let mut layout = Layout {
            title: Title {
                text: "Daily capture trend".into(),
                font: Some(Font {
                    family: Some("Arial".into()),
                    ..Font::size(18)
                }),
                x: Some(0.5),
            },
            height: 500,
            xaxis: Some(Axis {
                tickformat: Some("%d/%m/%Y".into()),
                tickangle: Some(45),
                axis_type: Some("category".into()),
                ..grid_axis("Capture date")
            }),
            yaxis: Some(Axis {
                rangemode: Some("tozero".into()),
                ..grid_axis("Number of captures")
            }),
            showlegend: Some(false),
            hovermode: Some("x unified".into()),
            margin: Some(Margin {
                l: 60,
                r: 30,
                t: 80,
                b: 100,
            }),
            plot_bgcolor: Some("white".into()),
            ..Default::default()
        };

        if series.is_empty() {
            layout.annotations.push(Annotation {
                text: "No valid capture dates".into(),
                x: 0.5,
                y: 0.5,
                xref: Some("paper".into()),
                yref: Some("paper".into()),
                showarrow: false,
                font: Some(Font::size(16)),
                ..Default::default()
            });
            return ChartSpec {
                data: Vec::new(),
                layout,
            };
        }

        let primary = self.palette.primary();
        let scatter = Scatter {
            x: series
                .points
                .iter()
                .map(|p| p.date.format("%Y-%m-%d").to_string())
                .collect(),
            y: series.points.iter().map(|p| p.count).collect(),
            mode: "lines+markers".into(),
            name: "Captures".into(),
            line: Line {
                color: Some(primary.to_hex()),
                width: Some(3.0),
                dash: None,
            },
            marker: Marker {
                size: Some(8.0),
                ..Marker::color(primary.lighten(0.2))
            },
            hovertemplate: "<b>Date:</b> %{x}<br><b>Captures:</b> %{y}<br><extra></extra>".into(),
        };

        ChartSpec {
            data: vec![Trace::Scatter(scatter)],
            layout,
        }
    }
}
