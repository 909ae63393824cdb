#![forbid(unsafe_code)]

//! Typed, declarative chart configuration.
//!
//! A [`ChartSpec`] is derived purely from panel data and filters and is
//! rebuilt on every re-initialization, so it carries no callbacks and no
//! hidden state. It serialises to the rendering library's configuration
//! shape (`{ type, data: { labels, datasets }, options }`).
//!
//! Things the library expresses as callbacks (tooltip text, tick
//! formatting) are carried as precomputed text under `chartgate*` keys; the
//! browser binding turns those into callbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;

/// Chart kinds understood by the rendering library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
    Pie,
    Radar,
    Scatter,
}

impl ChartKind {
    /// Kinds whose datasets carry explicit `(x, y)` points instead of one
    /// value per label.
    #[must_use]
    pub const fn is_point_based(self) -> bool {
        matches!(self, Self::Scatter)
    }

    /// Kinds without cartesian axes.
    #[must_use]
    pub const fn is_radial(self) -> bool {
        matches!(self, Self::Doughnut | Self::Pie | Self::Radar)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Doughnut => "doughnut",
            Self::Pie => "pie",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
        }
    }
}

/// An explicit data point for point-based charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Dataset values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValues {
    Values(Vec<f64>),
    Points(Vec<Point>),
}

impl DataValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Values(v) => v.len(),
            Self::Points(p) => p.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn first_non_finite(&self) -> Option<usize> {
        match self {
            Self::Values(v) => v.iter().position(|x| !x.is_finite()),
            Self::Points(p) => p.iter().position(|pt| !pt.x.is_finite() || !pt.y.is_finite()),
        }
    }
}

/// One colour for the whole dataset, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    PerPoint(Vec<String>),
}

impl From<&str> for Colors {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for Colors {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for Colors {
    fn from(value: Vec<String>) -> Self {
        Self::PerPoint(value)
    }
}

/// One series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: DataValues,
    /// Per-dataset kind override for mixed charts.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Colors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Colors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(rename = "yAxisID", skip_serializing_if = "Option::is_none")]
    pub y_axis_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Dataset {
    /// A dataset with one value per label.
    #[must_use]
    pub fn values(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self::with_data(label, DataValues::Values(data))
    }

    /// A dataset of explicit points.
    #[must_use]
    pub fn points(label: impl Into<String>, data: Vec<Point>) -> Self {
        Self::with_data(label, DataValues::Points(data))
    }

    fn with_data(label: impl Into<String>, data: DataValues) -> Self {
        Self {
            label: label.into(),
            data,
            kind: None,
            background_color: None,
            border_color: None,
            border_width: None,
            border_dash: None,
            point_radius: None,
            point_hover_radius: None,
            tension: None,
            fill: None,
            y_axis_id: None,
            order: None,
        }
    }

    #[must_use]
    pub fn background(mut self, colors: impl Into<Colors>) -> Self {
        self.background_color = Some(colors.into());
        self
    }

    #[must_use]
    pub fn border(mut self, colors: impl Into<Colors>) -> Self {
        self.border_color = Some(colors.into());
        self
    }

    #[must_use]
    pub fn border_width(mut self, width: f64) -> Self {
        self.border_width = Some(width);
        self
    }

    /// Dashed stroke, `[dash, gap]` in pixels.
    #[must_use]
    pub fn dashed(mut self, pattern: Vec<f64>) -> Self {
        self.border_dash = Some(pattern);
        self
    }

    #[must_use]
    pub fn point_radius(mut self, radius: f64) -> Self {
        self.point_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn point_hover_radius(mut self, radius: f64) -> Self {
        self.point_hover_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn tension(mut self, tension: f64) -> Self {
        self.tension = Some(tension);
        self
    }

    #[must_use]
    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = Some(fill);
        self
    }

    #[must_use]
    pub fn axis(mut self, axis_id: impl Into<String>) -> Self {
        self.y_axis_id = Some(axis_id.into());
        self
    }

    #[must_use]
    pub fn as_kind(mut self, kind: ChartKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

/// Side an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ticks_limit: Option<u32>,
    /// Appended to every tick label by the browser binding.
    #[serde(rename = "chartgateSuffix", skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl TickSpec {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_on_chart_area: Option<bool>,
}

impl GridSpec {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// One axis, keyed by id in [`ChartOptions::scales`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSpec {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<AxisPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<ScaleTitle>,
    #[serde(skip_serializing_if = "TickSpec::is_default")]
    pub ticks: TickSpec,
    #[serde(skip_serializing_if = "GridSpec::is_default")]
    pub grid: GridSpec,
}

impl ScaleSpec {
    #[must_use]
    pub fn linear() -> Self {
        Self {
            scale_type: Some("linear".into()),
            display: Some(true),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn position(mut self, position: AxisPosition) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(ScaleTitle {
            display: true,
            text: text.into(),
        });
        self
    }

    #[must_use]
    pub fn stacked(mut self) -> Self {
        self.stacked = Some(true);
        self
    }

    #[must_use]
    pub fn begin_at_zero(mut self) -> Self {
        self.begin_at_zero = Some(true);
        self
    }

    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn tick_color(mut self, color: impl Into<String>) -> Self {
        self.ticks.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn max_ticks(mut self, limit: u32) -> Self {
        self.ticks.max_ticks_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn tick_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.ticks.suffix = Some(suffix.into());
        self
    }

    #[must_use]
    pub fn grid_color(mut self, color: impl Into<String>) -> Self {
        self.grid.color = Some(color.into());
        self
    }

    /// Draw grid lines only for the primary axis.
    #[must_use]
    pub fn secondary(mut self) -> Self {
        self.grid.draw_on_chart_area = Some(false);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSpec {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<LegendPosition>,
    pub labels: LegendLabels,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            display: true,
            position: None,
            labels: LegendLabels { color: None },
        }
    }
}

/// Precomputed tooltip text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipText {
    /// Prepended to the hovered label in the tooltip title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    /// Replaces the title for a data index.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,
    /// Appended to the value, per dataset index.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_suffixes: Vec<String>,
    /// Extra body lines, per data index.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_lines: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<String>,
}

impl TooltipText {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// Tooltip styling plus declarative text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
    #[serde(rename = "chartgate", skip_serializing_if = "TooltipText::is_default")]
    pub text: TooltipText,
}

impl TooltipSpec {
    #[must_use]
    pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.text.title_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn titles(mut self, titles: Vec<String>) -> Self {
        self.text.titles = titles;
        self
    }

    #[must_use]
    pub fn value_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.text.value_suffixes = suffixes;
        self
    }

    #[must_use]
    pub fn extra_lines(mut self, lines: Vec<Vec<String>>) -> Self {
        self.text.extra_lines = lines;
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: Vec<String>) -> Self {
        self.text.footer = footer;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: LegendSpec,
    pub tooltip: TooltipSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub mode: String,
    pub intersect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circumference: Option<f64>,
    pub plugins: Plugins,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub scales: BTreeMap<String, ScaleSpec>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            maintain_aspect_ratio: false,
            index_axis: None,
            interaction: None,
            cutout: None,
            rotation: None,
            circumference: None,
            plugins: Plugins::default(),
            scales: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Complete declarative description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartSpec {
    #[must_use]
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            data: ChartData::default(),
            options: ChartOptions::default(),
        }
    }

    #[must_use]
    pub fn line() -> Self {
        Self::new(ChartKind::Line)
    }

    #[must_use]
    pub fn bar() -> Self {
        Self::new(ChartKind::Bar)
    }

    #[must_use]
    pub fn doughnut() -> Self {
        Self::new(ChartKind::Doughnut)
    }

    #[must_use]
    pub fn scatter() -> Self {
        Self::new(ChartKind::Scatter)
    }

    #[must_use]
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.data.datasets.push(dataset);
        self
    }

    #[must_use]
    pub fn scale(mut self, axis_id: impl Into<String>, scale: ScaleSpec) -> Self {
        self.options.scales.insert(axis_id.into(), scale);
        self
    }

    /// Bars grow along the x axis.
    #[must_use]
    pub fn horizontal(mut self) -> Self {
        self.options.index_axis = Some("y".into());
        self
    }

    /// Hovering anywhere in a column shows every dataset at that index.
    #[must_use]
    pub fn index_interaction(mut self) -> Self {
        self.options.interaction = Some(Interaction {
            mode: "index".into(),
            intersect: false,
        });
        self
    }

    #[must_use]
    pub fn legend_position(mut self, position: LegendPosition) -> Self {
        self.options.plugins.legend.position = Some(position);
        self
    }

    #[must_use]
    pub fn legend_color(mut self, color: impl Into<String>) -> Self {
        self.options.plugins.legend.labels.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn hide_legend(mut self) -> Self {
        self.options.plugins.legend.display = false;
        self
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: TooltipSpec) -> Self {
        self.options.plugins.tooltip = tooltip;
        self
    }

    #[must_use]
    pub fn cutout(mut self, cutout: impl Into<String>) -> Self {
        self.options.cutout = Some(cutout.into());
        self
    }

    /// Half-doughnut gauge layout.
    #[must_use]
    pub fn gauge(mut self) -> Self {
        self.options.rotation = Some(-90.0);
        self.options.circumference = Some(180.0);
        self.options.cutout = Some("75%".into());
        self
    }

    /// Check the spec before handing it to the library.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.data.datasets.is_empty() {
            return Err(SpecError::NoDatasets);
        }
        let expected_labels = self.data.labels.len();
        for ds in &self.data.datasets {
            let point_based = ds.kind.unwrap_or(self.kind).is_point_based();
            match (&ds.data, point_based) {
                (DataValues::Values(values), false) => {
                    if values.len() != expected_labels {
                        return Err(SpecError::LengthMismatch {
                            dataset: ds.label.clone(),
                            expected: expected_labels,
                            actual: values.len(),
                        });
                    }
                }
                (DataValues::Points(_), true) => {}
                _ => {
                    return Err(SpecError::DataShape {
                        dataset: ds.label.clone(),
                    });
                }
            }
            if let Some(index) = ds.data.first_non_finite() {
                return Err(SpecError::NonFiniteValue {
                    dataset: ds.label.clone(),
                    index,
                });
            }
            for colors in [&ds.background_color, &ds.border_color].into_iter().flatten() {
                if let Colors::PerPoint(list) = colors
                    && list.len() != ds.data.len()
                {
                    return Err(SpecError::ColorCountMismatch {
                        dataset: ds.label.clone(),
                        expected: ds.data.len(),
                        actual: list.len(),
                    });
                }
            }
            if let Some(axis) = &ds.y_axis_id
                && !self.options.scales.contains_key(axis)
            {
                return Err(SpecError::UnknownAxis {
                    dataset: ds.label.clone(),
                    axis: axis.clone(),
                });
            }
        }
        Ok(())
    }

    /// Configuration object as JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Deterministic text rendition for fallback views.
    #[must_use]
    pub fn text_summary(&self) -> Vec<String> {
        self.data
            .datasets
            .iter()
            .map(|ds| {
                let entries: Vec<String> = match &ds.data {
                    DataValues::Values(values) => values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| match self.data.labels.get(i) {
                            Some(label) => format!("{label} {}", format_value(*v)),
                            None => format_value(*v),
                        })
                        .collect(),
                    DataValues::Points(points) => points
                        .iter()
                        .map(|p| format!("({}, {})", format_value(p.x), format_value(p.y)))
                        .collect(),
                };
                format!("{}: {}", ds.label, entries.join(", "))
            })
            .collect()
    }
}

/// Integers without a fraction, everything else to two decimals.
#[must_use]
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn two_axis_line() -> ChartSpec {
        ChartSpec::line()
            .labels(["Jan", "Fev", "Mar"])
            .dataset(Dataset::values("Municípios", vec![600.0, 630.0, 670.0]).axis("y"))
            .dataset(Dataset::values("População (M)", vec![45.0, 48.0, 51.0]).axis("y1"))
            .scale("y", ScaleSpec::linear().position(AxisPosition::Left))
            .scale("y1", ScaleSpec::linear().position(AxisPosition::Right).secondary())
    }

    #[test]
    fn valid_spec_passes() {
        assert_eq!(two_axis_line().validate(), Ok(()));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let spec = ChartSpec::bar()
            .labels(["a", "b"])
            .dataset(Dataset::values("x", vec![1.0]));
        assert_eq!(
            spec.validate(),
            Err(SpecError::LengthMismatch {
                dataset: "x".into(),
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn empty_spec_is_rejected() {
        assert_eq!(ChartSpec::bar().validate(), Err(SpecError::NoDatasets));
    }

    #[test]
    fn per_point_colours_must_match() {
        let spec = ChartSpec::doughnut()
            .labels(["a", "b"])
            .dataset(
                Dataset::values("x", vec![1.0, 2.0]).background(vec!["#fff".to_string()]),
            );
        assert!(matches!(
            spec.validate(),
            Err(SpecError::ColorCountMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn unknown_axis_is_rejected() {
        let spec = ChartSpec::line()
            .labels(["a"])
            .dataset(Dataset::values("x", vec![1.0]).axis("y9"));
        assert!(matches!(spec.validate(), Err(SpecError::UnknownAxis { .. })));
    }

    #[test]
    fn nan_is_rejected() {
        let spec = ChartSpec::line()
            .labels(["a", "b"])
            .dataset(Dataset::values("x", vec![1.0, f64::NAN]));
        assert_eq!(
            spec.validate(),
            Err(SpecError::NonFiniteValue {
                dataset: "x".into(),
                index: 1
            })
        );
    }

    #[test]
    fn scatter_requires_points() {
        let spec = ChartSpec::scatter().dataset(Dataset::values("x", vec![]));
        assert!(matches!(spec.validate(), Err(SpecError::DataShape { .. })));

        let ok = ChartSpec::scatter().dataset(Dataset::points("x", vec![Point { x: 1.0, y: 2.0 }]));
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn serialises_to_library_shape() {
        let json = two_axis_line().to_json();
        assert_eq!(json["type"], json!("line"));
        assert_eq!(json["data"]["labels"], json!(["Jan", "Fev", "Mar"]));
        assert_eq!(json["data"]["datasets"][1]["yAxisID"], json!("y1"));
        assert_eq!(json["options"]["maintainAspectRatio"], json!(false));
        assert_eq!(json["options"]["scales"]["y1"]["grid"]["drawOnChartArea"], json!(false));
        assert_eq!(json["options"]["scales"]["y"]["position"], json!("left"));
        assert!(json["options"]["scales"]["y"].get("ticks").is_none());
    }

    #[test]
    fn tooltip_text_lives_under_chartgate_key() {
        let spec = two_axis_line().tooltip(TooltipSpec::default().title_prefix("📅 "));
        let json = spec.to_json();
        assert_eq!(
            json["options"]["plugins"]["tooltip"]["chartgate"]["titlePrefix"],
            json!("📅 ")
        );
    }

    #[test]
    fn text_summary_pairs_labels_and_values() {
        let summary = two_axis_line().text_summary();
        assert_eq!(summary[0], "Municípios: Jan 600, Fev 630, Mar 670");
    }

    #[test]
    fn format_value_trims() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(3.5), "3.5");
        assert_eq!(format_value(99.256), "99.26");
    }
}
