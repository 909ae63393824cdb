#![forbid(unsafe_code)]

//! Demand projections per planning scenario.

use chartgate_core::chart_spec::{AxisPosition, ChartKind, ChartSpec, Dataset};
use serde::{Deserialize, Serialize};

use crate::palette;
use crate::panel::{ChartPanel, ChartSlot, PanelKind};
use crate::scenario::Scenario;

pub const PROJECTIONS_CANVAS: &str = "projectionsChart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub period: String,
    pub volume: f64,
    pub coverage: f64,
    pub uplift: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionsData {
    #[serde(default)]
    pub scenario: Scenario,
    pub base: Vec<ProjectionPoint>,
    pub adverse: Vec<ProjectionPoint>,
    pub optimistic: Vec<ProjectionPoint>,
}

impl ProjectionsData {
    #[must_use]
    pub fn sample() -> Self {
        let row = |period: &str, volume, coverage, uplift: &str| ProjectionPoint {
            period: period.into(),
            volume,
            coverage,
            uplift: uplift.into(),
        };
        Self {
            scenario: Scenario::Base,
            base: vec![
                row("30 dias", 900.0, 918.0, "+5%"),
                row("60 dias", 1150.0, 980.0, "+7%"),
                row("90 dias", 1380.0, 1030.0, "+9%"),
            ],
            adverse: vec![
                row("30 dias", 750.0, 900.0, "+3%"),
                row("60 dias", 900.0, 950.0, "+5%"),
                row("90 dias", 1020.0, 980.0, "+6%"),
            ],
            optimistic: vec![
                row("30 dias", 1100.0, 925.0, "+7%"),
                row("60 dias", 1300.0, 990.0, "+10%"),
                row("90 dias", 1600.0, 1050.0, "+14%"),
            ],
        }
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    /// Rows of the active scenario.
    #[must_use]
    pub fn active(&self) -> &[ProjectionPoint] {
        match self.scenario {
            Scenario::Base => &self.base,
            Scenario::Adverse => &self.adverse,
            Scenario::Optimistic => &self.optimistic,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionsPanel;

impl ProjectionsPanel {
    /// Volume bars with the coverage line on a secondary axis.
    #[must_use]
    pub fn projections_spec(scenario: Scenario, rows: &[ProjectionPoint]) -> ChartSpec {
        let uplift = rows
            .iter()
            .map(|r| vec![format!("Crescimento: {}", r.uplift)])
            .collect();
        ChartSpec::bar()
            .labels(rows.iter().map(|r| r.period.clone()))
            .dataset(
                Dataset::values(
                    format!("Volume projetado ({scenario})"),
                    rows.iter().map(|r| r.volume).collect(),
                )
                .background(palette::TEAL_BAR)
                .border(palette::TEAL)
                .border_width(1.0)
                .axis("y")
                .order(2),
            )
            .dataset(
                Dataset::values("Cobertura", rows.iter().map(|r| r.coverage).collect())
                    .as_kind(ChartKind::Line)
                    .border(palette::ORANGE)
                    .background(palette::ORANGE_FILL)
                    .border_width(2.0)
                    .tension(0.3)
                    .point_radius(4.0)
                    .fill(false)
                    .axis("y1")
                    .order(1),
            )
            .scale("x", palette::category_axis())
            .scale(
                "y",
                palette::axis()
                    .position(AxisPosition::Left)
                    .begin_at_zero()
                    .title("Volume"),
            )
            .scale(
                "y1",
                palette::axis()
                    .position(AxisPosition::Right)
                    .title("Cobertura")
                    .secondary(),
            )
            .index_interaction()
            .legend_color(palette::TEXT_MUTED)
            .tooltip(palette::tooltip().extra_lines(uplift))
    }
}

impl ChartPanel for ProjectionsPanel {
    type Data = ProjectionsData;

    fn kind(&self) -> PanelKind {
        PanelKind::Projections
    }

    fn title(&self) -> &'static str {
        "Projeções de demanda"
    }

    fn chart_specs(&self, data: &ProjectionsData) -> Vec<ChartSlot> {
        vec![ChartSlot::new(
            PROJECTIONS_CANVAS,
            Self::projections_spec(data.scenario, data.active()),
        )]
    }

    fn sample_data(&self) -> ProjectionsData {
        ProjectionsData::sample()
    }
}
