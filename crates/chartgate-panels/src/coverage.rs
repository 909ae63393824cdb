#![forbid(unsafe_code)]

//! 5G coverage tab: rollout trend plus regional demand.

use chartgate_core::chart_spec::{AxisPosition, ChartSpec, Dataset};
use serde::{Deserialize, Serialize};

use crate::palette::{self, LevelColors};
use crate::panel::{ChartPanel, ChartSlot, PanelKind};
use crate::scenario::Scenario;

pub const COVERAGE_CANVAS: &str = "coverageChart";
pub const REGIONAL_CANVAS: &str = "regionalDemandChart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    High,
    #[serde(rename = "med", alias = "medium")]
    Medium,
    Low,
}

impl DemandLevel {
    #[must_use]
    pub const fn colors(self) -> LevelColors {
        match self {
            Self::High => palette::HIGH,
            Self::Medium => palette::MEDIUM,
            Self::Low => palette::LOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDemand {
    pub region: String,
    pub level: DemandLevel,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageData {
    #[serde(default)]
    pub scenario: Scenario,
    pub months: Vec<String>,
    pub municipalities: Vec<f64>,
    pub population_millions: Vec<f64>,
    pub investment_millions: Vec<f64>,
    pub regions: Vec<RegionDemand>,
}

impl CoverageData {
    #[must_use]
    pub fn sample() -> Self {
        let months = [
            "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
        ];
        let region = |region: &str, level, value| RegionDemand {
            region: region.into(),
            level,
            value,
        };
        Self {
            scenario: Scenario::Base,
            months: months.iter().map(|m| (*m).to_string()).collect(),
            municipalities: vec![
                600.0, 630.0, 670.0, 700.0, 740.0, 760.0, 790.0, 810.0, 830.0, 870.0, 880.0, 900.0,
            ],
            population_millions: vec![
                45.0, 48.0, 51.0, 53.0, 55.0, 56.0, 57.0, 59.0, 60.0, 63.0, 65.0, 67.0,
            ],
            investment_millions: vec![
                110.0, 105.0, 140.0, 135.0, 130.0, 150.0, 160.0, 165.0, 170.0, 182.0, 181.0, 187.0,
            ],
            regions: vec![
                region("Sudeste", DemandLevel::High, 9.0),
                region("Nordeste", DemandLevel::Medium, 5.0),
                region("Norte", DemandLevel::Low, 2.0),
                region("Sul", DemandLevel::Medium, 6.0),
                region("Centro-Oeste", DemandLevel::High, 8.0),
            ],
        }
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoveragePanel;

impl CoveragePanel {
    /// Three series on three axes, scaled by the active scenario.
    #[must_use]
    pub fn coverage_spec(data: &CoverageData) -> ChartSpec {
        let scaled = |values: &[f64]| -> Vec<f64> {
            values.iter().map(|v| data.scenario.scale(*v)).collect()
        };
        let titles = data
            .months
            .iter()
            .map(|m| format!("📅 {m} - Análise de Cobertura 5G"))
            .collect();

        ChartSpec::line()
            .labels(data.months.iter().cloned())
            .dataset(
                Dataset::values("Municípios cobertos", scaled(&data.municipalities))
                    .border(palette::TEAL)
                    .background(palette::TEAL_FILL)
                    .border_width(3.0)
                    .tension(0.35)
                    .point_radius(4.0)
                    .fill(true)
                    .axis("y"),
            )
            .dataset(
                Dataset::values("População coberta (M)", scaled(&data.population_millions))
                    .border(palette::GREEN)
                    .background(palette::GREEN_FILL)
                    .border_width(2.0)
                    .tension(0.35)
                    .point_radius(4.0)
                    .axis("y1"),
            )
            .dataset(
                Dataset::values("Investimento (milhões R$)", scaled(&data.investment_millions))
                    .border(palette::ORANGE)
                    .background(palette::ORANGE_FILL)
                    .border_width(2.0)
                    .tension(0.35)
                    .point_radius(4.0)
                    .fill(false)
                    .axis("y2"),
            )
            .scale("x", palette::category_axis())
            .scale(
                "y",
                palette::axis()
                    .position(AxisPosition::Left)
                    .title("Municípios"),
            )
            .scale(
                "y1",
                palette::axis()
                    .position(AxisPosition::Right)
                    .title("População (M)")
                    .secondary(),
            )
            .scale(
                "y2",
                palette::axis()
                    .position(AxisPosition::Right)
                    .title("Investimento (R$)")
                    .secondary(),
            )
            .index_interaction()
            .legend_color(palette::TEXT_MUTED)
            .tooltip(palette::tooltip().titles(titles))
    }

    /// Demand index per region, coloured by demand level.
    #[must_use]
    pub fn regional_spec(regions: &[RegionDemand]) -> ChartSpec {
        let levels: Vec<LevelColors> = regions.iter().map(|r| r.level.colors()).collect();
        let (fill, border) = palette::split(&levels);
        ChartSpec::bar()
            .labels(regions.iter().map(|r| r.region.clone()))
            .dataset(
                Dataset::values("Índice de demanda", regions.iter().map(|r| r.value).collect())
                    .background(fill)
                    .border(border)
                    .border_width(1.0),
            )
            .scale("x", palette::category_axis())
            .scale("y", palette::axis().begin_at_zero().max_ticks(6))
            .hide_legend()
            .tooltip(palette::tooltip())
    }
}

impl ChartPanel for CoveragePanel {
    type Data = CoverageData;

    fn kind(&self) -> PanelKind {
        PanelKind::Coverage
    }

    fn title(&self) -> &'static str {
        "Cobertura 5G"
    }

    fn chart_specs(&self, data: &CoverageData) -> Vec<ChartSlot> {
        vec![
            ChartSlot::new(COVERAGE_CANVAS, Self::coverage_spec(data)),
            ChartSlot::new(REGIONAL_CANVAS, Self::regional_spec(&data.regions)),
        ]
    }

    fn sample_data(&self) -> CoverageData {
        CoverageData::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_core::chart_spec::{Colors, DataValues};
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_specs_validate() {
        for slot in CoveragePanel.chart_specs(&CoverageData::sample()) {
            assert_eq!(slot.spec.validate(), Ok(()), "{}", slot.canvas_id);
        }
    }

    #[test]
    fn scenario_scales_every_series() {
        let data = CoverageData::sample().with_scenario(Scenario::Optimistic);
        let spec = CoveragePanel::coverage_spec(&data);
        assert_eq!(
            spec.data.datasets[0].data,
            DataValues::Values(
                data.municipalities
                    .iter()
                    .map(|v| Scenario::Optimistic.scale(*v))
                    .collect()
            )
        );
        assert_eq!(spec.data.datasets[2].y_axis_id.as_deref(), Some("y2"));
    }

    #[test]
    fn scenario_leaves_regional_chart_alone() {
        let base = CoveragePanel.chart_specs(&CoverageData::sample());
        let adverse =
            CoveragePanel.chart_specs(&CoverageData::sample().with_scenario(Scenario::Adverse));
        assert_ne!(base[0], adverse[0]);
        assert_eq!(base[1], adverse[1]);
    }

    #[test]
    fn regions_are_coloured_by_level() {
        let spec = CoveragePanel::regional_spec(&CoverageData::sample().regions);
        let Some(Colors::PerPoint(border)) = &spec.data.datasets[0].border_color else {
            panic!("per-point border colours expected");
        };
        assert_eq!(border[0], palette::HIGH.border);
        assert_eq!(border[1], palette::MEDIUM.border);
        assert_eq!(border[2], palette::LOW.border);
    }

    #[test]
    fn demand_level_accepts_short_and_long_names() {
        let short: Result<DemandLevel, _> = serde_json::from_str("\"med\"");
        let long: Result<DemandLevel, _> = serde_json::from_str("\"medium\"");
        assert_eq!(short.ok(), Some(DemandLevel::Medium));
        assert_eq!(long.ok(), Some(DemandLevel::Medium));
    }
}
