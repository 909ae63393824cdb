#![forbid(unsafe_code)]

use chartgate_core::chart_spec::{ChartKind, ChartSpec, Dataset};
use serde::{Deserialize, Serialize};

use crate::palette;
use crate::panel::{ChartPanel, ChartSlot, PanelKind};

pub const SUPPLY_CHAIN_CANVAS: &str = "supplyChainChart";

/// Monthly supply chain margin against its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainData {
    pub months: Vec<String>,
    pub margin_percent: Vec<f64>,
    pub target_percent: f64,
}

impl SupplyChainData {
    #[must_use]
    pub fn sample() -> Self {
        Self {
            months: ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun"]
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            margin_percent: vec![22.0, 23.0, 24.0, 24.5, 24.3, 24.5],
            target_percent: 22.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SupplyChainPanel;

impl SupplyChainPanel {
    #[must_use]
    pub fn margin_spec(data: &SupplyChainData) -> ChartSpec {
        ChartSpec::bar()
            .labels(data.months.iter().cloned())
            .dataset(
                Dataset::values("Margem (%)", data.margin_percent.clone())
                    .background(palette::TEAL_BAR)
                    .border(palette::TEAL)
                    .border_width(1.0)
                    .order(2),
            )
            .dataset(
                Dataset::values("Meta", vec![data.target_percent; data.months.len()])
                    .as_kind(ChartKind::Line)
                    .border(palette::ORANGE)
                    .border_width(2.0)
                    .dashed(vec![5.0, 5.0])
                    .point_radius(0.0)
                    .fill(false)
                    .order(1),
            )
            .scale("x", palette::category_axis())
            .scale("y", palette::axis().begin_at_zero().tick_suffix("%"))
            .legend_color(palette::TEXT_MUTED)
            .tooltip(palette::tooltip().value_suffixes(vec!["%".into(), "%".into()]))
    }
}

impl ChartPanel for SupplyChainPanel {
    type Data = SupplyChainData;

    fn kind(&self) -> PanelKind {
        PanelKind::SupplyChain
    }

    fn title(&self) -> &'static str {
        "Cadeia de suprimentos"
    }

    fn chart_specs(&self, data: &SupplyChainData) -> Vec<ChartSlot> {
        vec![ChartSlot::new(SUPPLY_CHAIN_CANVAS, Self::margin_spec(data))]
    }

    fn sample_data(&self) -> SupplyChainData {
        SupplyChainData::sample()
    }
}
