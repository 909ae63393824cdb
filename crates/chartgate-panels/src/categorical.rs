#![forbid(unsafe_code)]

//! Categorical feature analysis: importance ranking and encoding scatter for
//! the active category type.

use chartgate_core::chart_spec::{ChartSpec, Dataset, Point, format_value};
use serde::{Deserialize, Serialize};

use crate::palette::{self, LevelColors};
use crate::panel::{ChartPanel, ChartSlot, PanelKind};
use crate::scenario::round_to;

pub const IMPORTANCE_CANVAS: &str = "importanceChart";
pub const ENCODING_CANVAS: &str = "encodingChart";

const MAX_LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    #[default]
    Families,
    Sites,
    Suppliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    pub name: String,
    /// Target encoding in `0..=1`.
    pub encoding: f64,
    /// Feature importance in `0..=1`.
    pub importance: f64,
    /// Share of total demand in percent.
    pub demand_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalData {
    #[serde(default)]
    pub active: CategoryType,
    pub families: Vec<CategoryEntry>,
    pub sites: Vec<CategoryEntry>,
    pub suppliers: Vec<CategoryEntry>,
}

impl CategoricalData {
    #[must_use]
    pub fn sample() -> Self {
        let entry = |name: &str, encoding, importance, demand_share| CategoryEntry {
            name: name.into(),
            encoding,
            importance,
            demand_share,
        };
        Self {
            active: CategoryType::Families,
            families: vec![
                entry("EPI", 0.85, 0.35, 28.5),
                entry("FERRO_E_AÇO", 0.72, 0.28, 22.3),
                entry("MATERIAL_ELETRICO", 0.68, 0.22, 18.7),
                entry("MATERIAL_CIVIL", 0.45, 0.10, 15.2),
                entry("FERRAMENTAS_E_EQUIPAMENTOS", 0.32, 0.05, 15.3),
            ],
            sites: vec![
                entry("Salvador Centro", 0.78, 0.32, 18.5),
                entry("Salvador Norte", 0.65, 0.25, 15.2),
                entry("Recife Norte", 0.58, 0.20, 12.8),
                entry("Belo Horizonte Oeste", 0.42, 0.15, 10.5),
                entry("São Paulo Sul", 0.38, 0.08, 8.2),
            ],
            suppliers: vec![
                entry("L.M.C LEMOS MATERIAIS PARA CONSTRUCAO", 0.82, 0.30, 20.5),
                entry("HIPERFERRO", 0.70, 0.25, 18.2),
                entry("BELGO CERCAS", 0.65, 0.20, 15.8),
                entry("BRASPRESS", 0.55, 0.15, 12.5),
                entry(
                    "FERIMPORT COMERCIO REPRESENTACAO E IMPORTACAO LTDA",
                    0.48,
                    0.10,
                    10.2,
                ),
            ],
        }
    }

    #[must_use]
    pub fn with_active(mut self, active: CategoryType) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[CategoryEntry] {
        match self.active {
            CategoryType::Families => &self.families,
            CategoryType::Sites => &self.sites,
            CategoryType::Suppliers => &self.suppliers,
        }
    }
}

/// Bar colour for an importance score.
#[must_use]
pub fn importance_colors(importance: f64) -> LevelColors {
    if importance > 0.25 {
        palette::IMPORTANT
    } else if importance > 0.15 {
        palette::NOTABLE
    } else {
        palette::MINOR
    }
}

/// Truncate long names for axis labels, counting characters.
#[must_use]
pub fn short_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_CHARS {
        let head: String = name.chars().take(MAX_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalPanel;

impl CategoricalPanel {
    /// Horizontal bars, most important first.
    #[must_use]
    pub fn importance_spec(entries: &[CategoryEntry]) -> ChartSpec {
        let mut ranked: Vec<&CategoryEntry> = entries.iter().collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        let levels: Vec<LevelColors> = ranked
            .iter()
            .map(|e| importance_colors(e.importance))
            .collect();
        let (fill, border) = palette::split(&levels);
        ChartSpec::bar()
            .horizontal()
            .labels(ranked.iter().map(|e| short_label(&e.name)))
            .dataset(
                Dataset::values(
                    "Importância (%)",
                    ranked
                        .iter()
                        .map(|e| round_to(e.importance * 100.0, 1))
                        .collect(),
                )
                .background(fill)
                .border(border)
                .border_width(1.0),
            )
            .scale(
                "x",
                palette::axis().begin_at_zero().tick_suffix("%"),
            )
            .scale("y", palette::category_axis())
            .hide_legend()
            .tooltip(
                palette::tooltip()
                    .titles(ranked.iter().map(|e| e.name.clone()).collect())
                    .value_suffixes(vec!["%".into()]),
            )
    }

    /// Encoding against demand share, one point per category.
    #[must_use]
    pub fn encoding_spec(entries: &[CategoryEntry]) -> ChartSpec {
        let points = entries
            .iter()
            .map(|e| Point {
                x: round_to(e.encoding * 100.0, 1),
                y: e.demand_share,
            })
            .collect();
        let details = entries
            .iter()
            .map(|e| {
                vec![
                    format!("Encoding: {}%", format_value(round_to(e.encoding * 100.0, 1))),
                    format!("Demanda: {}%", format_value(e.demand_share)),
                    format!(
                        "Importância: {}%",
                        format_value(round_to(e.importance * 100.0, 1))
                    ),
                ]
            })
            .collect();
        ChartSpec::scatter()
            .dataset(
                Dataset::points("Encoding vs. Demand Share", points)
                    .background(palette::IMPORTANT.fill)
                    .border(palette::IMPORTANT.border)
                    .point_radius(8.0)
                    .point_hover_radius(10.0),
            )
            .scale(
                "x",
                palette::axis().title("Valor de Encoding (%)"),
            )
            .scale(
                "y",
                palette::axis().title("Participação na Demanda (%)"),
            )
            .hide_legend()
            .tooltip(
                palette::tooltip()
                    .titles(entries.iter().map(|e| e.name.clone()).collect())
                    .extra_lines(details),
            )
    }
}

impl ChartPanel for CategoricalPanel {
    type Data = CategoricalData;

    fn kind(&self) -> PanelKind {
        PanelKind::Categorical
    }

    fn title(&self) -> &'static str {
        "Análise categórica"
    }

    /// No slots at all when the active category type has no entries.
    fn chart_specs(&self, data: &CategoricalData) -> Vec<ChartSlot> {
        let entries = data.entries();
        if entries.is_empty() {
            return Vec::new();
        }
        vec![
            ChartSlot::new(IMPORTANCE_CANVAS, Self::importance_spec(entries)),
            ChartSlot::new(ENCODING_CANVAS, Self::encoding_spec(entries)),
        ]
    }

    fn sample_data(&self) -> CategoricalData {
        CategoricalData::sample()
    }
}
