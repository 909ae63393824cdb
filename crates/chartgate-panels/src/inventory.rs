#![forbid(unsafe_code)]

//! Stock level tab.

use chartgate_core::chart_spec::{ChartSpec, Dataset, LegendPosition, format_value};
use serde::{Deserialize, Serialize};

use crate::palette::{self, LevelColors};
use crate::panel::{ChartPanel, ChartSlot, PanelKind};

pub const STOCK_CANVAS: &str = "stockLevelChart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Ok,
}

impl StockStatus {
    #[must_use]
    pub const fn colors(self) -> LevelColors {
        match self {
            Self::Critical => palette::CRITICAL,
            Self::Warning => palette::HIGH,
            Self::Ok => palette::LOW,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Crítico",
            Self::Warning => "Atenção",
            Self::Ok => "Adequado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub item: String,
    pub current: f64,
    pub ideal: f64,
    pub percentage: f64,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryData {
    pub items: Vec<StockItem>,
}

impl InventoryData {
    #[must_use]
    pub fn sample() -> Self {
        let item = |name: &str, current, ideal, percentage, status| StockItem {
            item: name.into(),
            current,
            ideal,
            percentage,
            status,
        };
        Self {
            items: vec![
                item("RF Kits", 450.0, 1000.0, 45.0, StockStatus::Critical),
                item("Fibra Óptica", 3.2, 10.0, 32.0, StockStatus::Critical),
                item("PSUs", 780.0, 1000.0, 78.0, StockStatus::Ok),
                item("Conectores", 780.0, 1000.0, 78.0, StockStatus::Ok),
                item("Switches", 820.0, 1000.0, 82.0, StockStatus::Ok),
                item("Antenas", 580.0, 1000.0, 58.0, StockStatus::Warning),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryPanel;

impl InventoryPanel {
    #[must_use]
    pub fn stock_spec(items: &[StockItem]) -> ChartSpec {
        let levels: Vec<LevelColors> = items.iter().map(|i| i.status.colors()).collect();
        let (fill, border) = palette::split(&levels);
        let details = items
            .iter()
            .map(|i| {
                vec![
                    format!(
                        "Atual: {} / Ideal: {}",
                        format_value(i.current),
                        format_value(i.ideal)
                    ),
                    format!("Status: {}", i.status.label()),
                ]
            })
            .collect();

        ChartSpec::doughnut()
            .labels(items.iter().map(|i| i.item.clone()))
            .dataset(
                Dataset::values("Nível de estoque (%)", items.iter().map(|i| i.percentage).collect())
                    .background(fill)
                    .border(border)
                    .border_width(2.0),
            )
            .cutout("60%")
            .legend_position(LegendPosition::Right)
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(
                palette::tooltip()
                    .value_suffixes(vec!["%".into()])
                    .extra_lines(details),
            )
    }
}

impl ChartPanel for InventoryPanel {
    type Data = InventoryData;

    fn kind(&self) -> PanelKind {
        PanelKind::Inventory
    }

    fn title(&self) -> &'static str {
        "Estoque crítico"
    }

    fn chart_specs(&self, data: &InventoryData) -> Vec<ChartSlot> {
        vec![ChartSlot::new(STOCK_CANVAS, Self::stock_spec(&data.items))]
    }

    fn sample_data(&self) -> InventoryData {
        InventoryData::sample()
    }
}
