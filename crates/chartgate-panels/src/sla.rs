#![forbid(unsafe_code)]

//! SLA tab: availability gauge, violation forecast, downtime causes and the
//! availability trend.
//!
//! The four charts refresh independently. Changing the violation list only
//! rebuilds `violationChart`; changing global availability rebuilds the gauge
//! and the trend, whose last point is the current global figure.

use chartgate_core::chart_spec::{ChartSpec, Dataset, LegendPosition, ScaleSpec, format_value};
use serde::{Deserialize, Serialize};

use crate::palette::{self, LevelColors};
use crate::panel::{ChartPanel, ChartSlot, PanelKind};
use crate::scenario::round_to;

pub const GAUGE_CANVAS: &str = "slaGauge";
pub const VIOLATION_CANVAS: &str = "violationChart";
pub const DOWNTIME_CANVAS: &str = "downtimeChart";
pub const TREND_CANVAS: &str = "trendChart";

const GAUGE_LABELS: [&str; 2] = ["Disponibilidade Global", "Gap para Target"];
const GAP: LevelColors = LevelColors {
    fill: "rgba(119, 124, 124, 0.25)",
    border: "rgba(119, 124, 124, 0.4)",
};
const HEALTHY: LevelColors = LevelColors {
    fill: "rgba(34, 197, 94, 0.85)",
    border: "rgba(34, 197, 94, 1)",
};
const DEGRADED: LevelColors = LevelColors {
    fill: "rgba(230, 129, 97, 0.8)",
    border: "rgba(230, 129, 97, 1)",
};
const BREACHED: LevelColors = LevelColors {
    fill: "rgba(255, 84, 89, 0.8)",
    border: "rgba(255, 84, 89, 1)",
};

/// Downtime cause colours, cycled by cause index.
const CAUSE_COLORS: [LevelColors; 4] = [
    LevelColors {
        fill: "rgba(255, 84, 89, 0.7)",
        border: "rgba(192, 21, 47, 1)",
    },
    LevelColors {
        fill: "rgba(230, 129, 97, 0.7)",
        border: "rgba(168, 75, 47, 1)",
    },
    LevelColors {
        fill: "rgba(50, 184, 198, 0.7)",
        border: "rgba(33, 128, 141, 1)",
    },
    LevelColors {
        fill: "rgba(34, 197, 94, 0.7)",
        border: "rgba(21, 128, 61, 1)",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAvailability {
    pub tier: String,
    pub availability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRisk {
    pub material: String,
    /// Current violation probability in percent.
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeCause {
    pub cause: String,
    pub hours: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaData {
    pub global_availability: f64,
    pub tiers: Vec<TierAvailability>,
    pub violations: Vec<ViolationRisk>,
    /// Forecast horizon labels for the violation chart.
    pub forecast_dates: Vec<String>,
    pub downtime_months: Vec<String>,
    pub downtime: Vec<DowntimeCause>,
    pub trend_months: Vec<String>,
    /// Past monthly availability; the chart appends `global_availability`.
    pub trend_history: Vec<f64>,
    pub target: f64,
    pub risk_threshold: f64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl SlaData {
    #[must_use]
    pub fn sample() -> Self {
        let tier = |tier: &str, availability| TierAvailability {
            tier: tier.into(),
            availability,
        };
        let violation = |material: &str, risk| ViolationRisk {
            material: material.into(),
            risk,
        };
        let cause = |cause: &str, hours: &[f64]| DowntimeCause {
            cause: cause.into(),
            hours: hours.to_vec(),
        };
        Self {
            global_availability: 99.2,
            tiers: vec![
                tier("Tier 1", 99.2),
                tier("Tier 2", 98.5),
                tier("Tier 3", 97.8),
            ],
            violations: vec![
                violation("Conectores RF - Tipo A", 62.0),
                violation("Kit Refrigeração", 48.0),
                violation("Cabos de Fibra", 28.0),
            ],
            forecast_dates: strings(&[
                "01/11", "06/11", "11/11", "16/11", "21/11", "26/11", "01/12", "06/12",
            ]),
            downtime_months: strings(&["Jun", "Jul", "Ago", "Set", "Out", "Nov"]),
            downtime: vec![
                cause("Stockout", &[2.0, 1.5, 3.0, 2.2, 1.8, 4.2]),
                cause("Lead Time", &[1.5, 2.0, 1.2, 2.8, 3.5, 6.1]),
                cause("Clima", &[0.5, 0.8, 2.1, 1.0, 0.3, 2.5]),
                cause("Manutenção", &[0.8, 0.5, 0.7, 0.6, 0.4, 0.5]),
            ],
            trend_months: strings(&[
                "Dez24", "Jan25", "Fev25", "Mar25", "Abr25", "Mai25", "Jun25", "Jul25", "Ago25",
                "Set25", "Out25", "Nov25",
            ]),
            trend_history: vec![
                98.8, 99.1, 99.0, 99.3, 99.2, 99.4, 99.1, 99.5, 99.3, 99.2, 99.1,
            ],
            target: 99.0,
            risk_threshold: 97.8,
        }
    }
}

/// Gauge colour for a global availability figure.
#[must_use]
pub fn availability_colors(availability: f64) -> LevelColors {
    if availability >= 99.0 {
        HEALTHY
    } else if availability >= 98.0 {
        DEGRADED
    } else {
        BREACHED
    }
}

/// Risk decaying linearly to 30% of its current value across the horizon.
#[must_use]
pub fn violation_trend(risk: f64, points: usize) -> Vec<f64> {
    let span = points.saturating_sub(1).max(1) as f64;
    (0..points)
        .map(|i| round_to(risk * (1.0 - (i as f64 / span) * 0.7), 1))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlaPanel;

impl SlaPanel {
    #[must_use]
    pub fn gauge_spec(global: f64, tiers: &[TierAvailability]) -> ChartSpec {
        let gap = round_to(100.0 - global, 2);
        let (fill, border) = palette::split(&[availability_colors(global), GAP]);
        let breakdown = tiers
            .iter()
            .map(|t| format!("{}: {:.1}%", t.tier, t.availability))
            .collect();
        ChartSpec::doughnut()
            .labels(GAUGE_LABELS)
            .dataset(
                Dataset::values("Disponibilidade", vec![global, gap])
                    .background(fill)
                    .border(border)
                    .border_width(2.5),
            )
            .cutout("70%")
            .legend_position(LegendPosition::Bottom)
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(
                palette::tooltip()
                    .value_suffixes(vec!["%".into()])
                    .extra_lines(vec![breakdown, Vec::new()]),
            )
    }

    #[must_use]
    pub fn violation_spec(dates: &[String], violations: &[ViolationRisk]) -> ChartSpec {
        let mut spec = ChartSpec::line().labels(dates.iter().cloned());
        for (i, v) in violations.iter().enumerate() {
            let (border, fill) = palette::SERIES[i % palette::SERIES.len()];
            spec = spec.dataset(
                Dataset::values(v.material.clone(), violation_trend(v.risk, dates.len()))
                    .border(border)
                    .background(fill)
                    .border_width(2.0)
                    .tension(0.4)
                    .fill(true)
                    .point_radius(4.0),
            );
        }
        spec.scale(
            "y",
            percent_axis()
                .range(0.0, 100.0)
                .title("Probabilidade de Violação (%)"),
        )
        .scale("x", soft_axis())
        .legend_color(palette::LEGEND_TEXT)
        .tooltip(palette::tooltip().value_suffixes(vec!["% risco".into(); violations.len()]))
    }

    #[must_use]
    pub fn downtime_spec(months: &[String], causes: &[DowntimeCause]) -> ChartSpec {
        let mut spec = ChartSpec::bar().labels(months.iter().cloned());
        for (i, c) in causes.iter().enumerate() {
            let colors = CAUSE_COLORS[i % CAUSE_COLORS.len()];
            spec = spec.dataset(
                Dataset::values(c.cause.clone(), c.hours.clone())
                    .background(colors.fill)
                    .border(colors.border)
                    .border_width(1.0),
            );
        }
        let footer = vec![format!(
            "Total no período: {} horas",
            format_value(round_to(causes.iter().flat_map(|c| &c.hours).sum(), 1))
        )];
        spec.scale("x", soft_axis().stacked())
            .scale("y", soft_axis().stacked().title("Horas de Downtime"))
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(
                palette::tooltip()
                    .value_suffixes(vec![" horas".into(); causes.len()])
                    .footer(footer),
            )
    }

    #[must_use]
    pub fn trend_spec(data: &SlaData) -> ChartSpec {
        let points = data.trend_months.len();
        let mut actual = data.trend_history.clone();
        actual.push(data.global_availability);
        ChartSpec::line()
            .labels(data.trend_months.iter().cloned())
            .dataset(
                Dataset::values("Disponibilidade Real", actual)
                    .border(palette::CYAN)
                    .background(palette::CYAN_FILL)
                    .border_width(2.5)
                    .tension(0.4)
                    .fill(true)
                    .point_radius(4.0),
            )
            .dataset(
                Dataset::values(
                    format!("Target ({}%)", format_value(data.target)),
                    vec![data.target; points],
                )
                .border(palette::SUCCESS)
                .dashed(vec![5.0, 5.0])
                .border_width(2.0)
                .fill(false)
                .point_radius(0.0),
            )
            .dataset(
                Dataset::values(
                    format!("Zona de Risco (<{}%)", format_value(data.risk_threshold)),
                    vec![data.risk_threshold; points],
                )
                .border(palette::DANGER)
                .dashed(vec![5.0, 5.0])
                .border_width(2.0)
                .fill(false)
                .point_radius(0.0),
            )
            .scale(
                "y",
                percent_axis()
                    .range(97.5, 100.0)
                    .title("Disponibilidade (%)"),
            )
            .scale("x", soft_axis())
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(palette::tooltip().value_suffixes(vec!["%".into(); 3]))
    }
}

fn soft_axis() -> ScaleSpec {
    ScaleSpec::default()
        .tick_color(palette::AXIS_TEXT)
        .grid_color(palette::GRID_SOFT)
}

fn percent_axis() -> ScaleSpec {
    soft_axis().tick_suffix("%")
}

impl ChartPanel for SlaPanel {
    type Data = SlaData;

    fn kind(&self) -> PanelKind {
        PanelKind::Sla
    }

    fn title(&self) -> &'static str {
        "SLA e disponibilidade"
    }

    fn chart_specs(&self, data: &SlaData) -> Vec<ChartSlot> {
        vec![
            ChartSlot::new(
                GAUGE_CANVAS,
                Self::gauge_spec(data.global_availability, &data.tiers),
            ),
            ChartSlot::new(
                VIOLATION_CANVAS,
                Self::violation_spec(&data.forecast_dates, &data.violations),
            ),
            ChartSlot::new(
                DOWNTIME_CANVAS,
                Self::downtime_spec(&data.downtime_months, &data.downtime),
            ),
            ChartSlot::new(TREND_CANVAS, Self::trend_spec(data)),
        ]
    }

    fn sample_data(&self) -> SlaData {
        SlaData::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_core::chart_spec::{Colors, DataValues};
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_specs_validate() {
        for slot in SlaPanel.chart_specs(&SlaData::sample()) {
            assert_eq!(slot.spec.validate(), Ok(()), "{}", slot.canvas_id);
        }
    }

    #[test]
    fn gauge_colour_tracks_availability() {
        assert_eq!(availability_colors(99.2), HEALTHY);
        assert_eq!(availability_colors(98.0), DEGRADED);
        assert_eq!(availability_colors(97.9), BREACHED);

        let spec = SlaPanel::gauge_spec(98.4, &[]);
        assert_eq!(
            spec.data.datasets[0].background_color,
            Some(Colors::PerPoint(vec![
                DEGRADED.fill.to_string(),
                GAP.fill.to_string()
            ]))
        );
        assert_eq!(spec.data.datasets[0].data, DataValues::Values(vec![98.4, 1.6]));
    }

    #[test]
    fn violation_trend_is_deterministic() {
        assert_eq!(
            violation_trend(62.0, 8),
            vec![62.0, 55.8, 49.6, 43.4, 37.2, 31.0, 24.8, 18.6]
        );
        assert_eq!(violation_trend(62.0, 8), violation_trend(62.0, 8));
        assert_eq!(violation_trend(10.0, 1), vec![10.0]);
        assert!(violation_trend(10.0, 0).is_empty());
    }

    #[test]
    fn trend_ends_at_global_availability() {
        let mut data = SlaData::sample();
        data.global_availability = 98.1;
        let spec = SlaPanel::trend_spec(&data);
        let DataValues::Values(actual) = &spec.data.datasets[0].data else {
            panic!("values expected");
        };
        assert_eq!(actual.len(), 12);
        assert_eq!(actual.last(), Some(&98.1));
        assert_eq!(spec.data.datasets[1].label, "Target (99%)");
        assert_eq!(spec.data.datasets[2].label, "Zona de Risco (<97.8%)");
    }

    #[test]
    fn downtime_is_stacked_with_total_footer() {
        let data = SlaData::sample();
        let spec = SlaPanel::downtime_spec(&data.downtime_months, &data.downtime);
        assert_eq!(spec.options.scales["y"].stacked, Some(true));
        assert_eq!(spec.options.scales["x"].stacked, Some(true));
        assert_eq!(
            spec.options.plugins.tooltip.text.footer,
            vec!["Total no período: 42.5 horas".to_string()]
        );
    }

    #[test]
    fn violation_change_leaves_other_charts_alone() {
        let before = SlaPanel.chart_specs(&SlaData::sample());
        let mut data = SlaData::sample();
        data.violations[0].risk = 70.0;
        let after = SlaPanel.chart_specs(&data);
        let changed: Vec<&str> = before
            .iter()
            .zip(&after)
            .filter(|(a, b)| a.spec != b.spec)
            .map(|(a, _)| a.canvas_id.as_str())
            .collect();
        assert_eq!(changed, vec![VIOLATION_CANVAS]);
    }
}
