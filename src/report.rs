use serde::Serialize;

use crate::aggregate::composition::age_composition;
use crate::aggregate::cross::weight_by_age_and_sex;
use crate::aggregate::kpi::KpiSummary;
use crate::aggregate::sex::sex_distribution;
use crate::aggregate::temporal::daily_captures;
use crate::aggregate::weight::weight_stats;
use crate::chart::{ChartBuilder, ChartSpec};
use crate::config::DashboardConfig;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Per-request pipeline: load → aggregate → build charts
// ---------------------------------------------------------------------------

/// Load the configured data file. An empty dataset counts as "no data".
pub fn load_dataset(config: &DashboardConfig) -> Result<Dataset> {
    let dataset = load_file(&config.data_path)?;
    if dataset.is_empty() {
        return Err(DataError::Empty("dataset"));
    }
    Ok(dataset)
}

/// The five dashboard charts. A chart whose aggregation failed is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Charts {
    pub composition: Option<ChartSpec>,
    pub sex: Option<ChartSpec>,
    pub weight_histogram: Option<ChartSpec>,
    pub weight_boxplot: Option<ChartSpec>,
    pub daily_captures: Option<ChartSpec>,
}

impl Charts {
    /// Build every chart independently; one failure never affects the
    /// others.
    pub fn build(dataset: &Dataset, builder: &ChartBuilder) -> Self {
        Charts {
            composition: degrade("composition", || {
                Ok(builder.composition(&age_composition(dataset)?))
            }),
            sex: degrade("sex distribution", || {
                Ok(builder.sex_distribution(&sex_distribution(dataset)?))
            }),
            weight_histogram: degrade("weight histogram", || {
                let weights: Vec<f64> =
                    dataset.records.iter().filter_map(|r| r.weight_kg).collect();
                let stats =
                    weight_stats(&dataset.records).ok_or(DataError::Empty("weights"))?;
                Ok(builder.weight_histogram(&weights, &stats))
            }),
            weight_boxplot: degrade("weight box-plot", || {
                let groups = weight_by_age_and_sex(dataset);
                if groups.is_empty() {
                    return Err(DataError::Empty("weight groups"));
                }
                Ok(builder.weight_boxplot(&groups))
            }),
            daily_captures: degrade("daily captures", || {
                Ok(builder.daily_captures(&daily_captures(dataset)?))
            }),
        }
    }

    /// `(name, chart)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&ChartSpec>)> {
        [
            ("composition", self.composition.as_ref()),
            ("sex", self.sex.as_ref()),
            ("weight_histogram", self.weight_histogram.as_ref()),
            ("weight_boxplot", self.weight_boxplot.as_ref()),
            ("daily_captures", self.daily_captures.as_ref()),
        ]
        .into_iter()
    }

    pub fn rendered(&self) -> usize {
        self.iter().filter(|(_, c)| c.is_some()).count()
    }
}

fn degrade<F>(chart: &str, build: F) -> Option<ChartSpec>
where
    F: FnOnce() -> Result<ChartSpec>,
{
    match build() {
        Ok(spec) => Some(spec),
        Err(e) => {
            log::warn!("{chart} chart omitted: {e}");
            None
        }
    }
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kpis: KpiSummary,
    pub charts: Charts,
}

impl Report {
    /// Run the full pipeline. Load errors abort; chart errors degrade.
    pub fn build(config: &DashboardConfig) -> Result<Self> {
        let dataset = load_dataset(config)?;
        Ok(Self::from_dataset(&dataset, &ChartBuilder::new(config.palette.clone())))
    }

    pub fn from_dataset(dataset: &Dataset, builder: &ChartBuilder) -> Self {
        let report = Report {
            kpis: KpiSummary::compute(dataset),
            charts: Charts::build(dataset, builder),
        };
        log::info!(
            "report built: {} individuals, {}/5 charts",
            report.kpis.total_individuals,
            report.charts.rendered()
        );
        report
    }
}
