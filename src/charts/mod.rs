//! Declarative chart descriptions.
//!
//! Everything in here is a pure function of its inputs: series go in, a
//! serialisable [`ChartDescription`] comes out, and `ui::plot` turns that
//! into egui widgets. Missing points are `None` (JSON `null`) and must be
//! drawn as gaps.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod factory;
pub mod kpi;
pub mod multi_axis;
pub mod saved;

pub use factory::{build, build_with_bins, composition, forecast_chart, histogram, Slice};
pub use kpi::{kpi, Kpi};
pub use multi_axis::{build_multi_axis, build_overlay, AxisSeries};

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;
pub const DEFAULT_HEIGHT: f32 = 350.0;

// ---------------------------------------------------------------------------
// Chart type tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartType {
    Area,
    Line,
    Bar,
    HorizontalBar,
    Donut,
    Histogram,
}

impl ChartType {
    pub const ALL: [ChartType; 6] = [
        ChartType::Area,
        ChartType::Line,
        ChartType::Bar,
        ChartType::HorizontalBar,
        ChartType::Donut,
        ChartType::Histogram,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ChartType::Area => "area",
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::HorizontalBar => "hbar",
            ChartType::Donut => "donut",
            ChartType::Histogram => "histogram",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Line,
    Area,
    Bar,
    HorizontalBar,
    Donut,
    Histogram,
    /// Filled band between `y_lower` and `y`.
    Band,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    #[serde(default)]
    pub x: Vec<f64>,
    /// `None` marks "no data at this x".
    #[serde(default)]
    pub y: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_lower: Option<Vec<f64>>,
    /// Slice labels (donut only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Per-slice colours (donut only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
    #[serde(default)]
    pub axis: YAxis,
    #[serde(default)]
    pub dashed: bool,
}

impl Trace {
    pub fn new(name: impl Into<String>, kind: TraceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            x: Vec::new(),
            y: Vec::new(),
            y_lower: None,
            labels: Vec::new(),
            color: None,
            palette: Vec::new(),
            axis: YAxis::Primary,
            dashed: false,
        }
    }

    pub fn with_points(mut self, x: Vec<f64>, y: Vec<Option<f64>>) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_color(mut self, color: Option<&str>) -> Self {
        self.color = color.map(str::to_string);
        self
    }

    /// Defined `[x, y]` pairs, skipping gaps.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x
            .iter()
            .zip(&self.y)
            .filter_map(|(&x, y)| y.map(|y| [x, y]))
            .collect()
    }

    /// Runs of consecutive defined points. A gap ends a run, so a line is
    /// never drawn across a missing year.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (&x, y) in self.x.iter().zip(&self.y) {
            match y {
                Some(y) => current.push([x, *y]),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub x_title: String,
    pub y_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2_range: Option<[f64; 2]>,
    pub height: f32,
    /// Inner radius of a donut as a fraction of the outer one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_width: Option<f64>,
    /// Dashed vertical rule, e.g. where a forecast starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_marker: Option<f64>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            x_title: "Year".to_string(),
            y_title: String::new(),
            y2_title: None,
            y2_range: None,
            height: DEFAULT_HEIGHT,
            hole: None,
            bar_width: None,
            vertical_marker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub title: String,
    #[serde(default)]
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub layout: Layout,
    /// Nothing to plot; the renderer shows a placeholder instead.
    #[serde(default)]
    pub no_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl ChartDescription {
    pub fn no_data(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            title: format!("{title}: No Data Available"),
            traces: Vec::new(),
            layout: Layout::default(),
            no_data: true,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn has_secondary_axis(&self) -> bool {
        self.traces.iter().any(|t| t.axis == YAxis::Secondary)
    }
}
