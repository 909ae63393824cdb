#![forbid(unsafe_code)]

//! Lead-time tab: family risk, safety stock and five supplier charts.
//!
//! Two charts are driven by the family table alone (`familyRiskHeatmap`,
//! `safetyStockComparison`). The other five follow the filtered, sorted
//! supplier list, so changing a filter rebuilds those five and leaves the
//! family charts running. A filter that matches no supplier drops the five
//! supplier canvases entirely.

use std::cmp::Ordering;

use chartgate_core::chart_spec::{
    AxisPosition, ChartKind, ChartSpec, Dataset, Point, ScaleSpec, format_value,
};
use serde::{Deserialize, Serialize};

use crate::palette::{self, LevelColors};
use crate::panel::{ChartPanel, ChartSlot, PanelKind};
use crate::scenario::round_to;

pub const FAMILY_RISK_CANVAS: &str = "familyRiskHeatmap";
pub const SAFETY_STOCK_CANVAS: &str = "safetyStockComparison";
pub const PERFORMANCE_CANVAS: &str = "supplierPerformanceMatrix";
pub const DISTRIBUTION_CANVAS: &str = "leadTimeDistributionByFamily";
pub const TREND_CANVAS: &str = "trendAnalysis";
pub const VARIANCE_CANVAS: &str = "varianceChart";
pub const RELIABILITY_CANVAS: &str = "reliabilityChart";

/// Canvases that follow the supplier list.
pub const SUPPLIER_CANVASES: [&str; 5] = [
    PERFORMANCE_CANVAS,
    DISTRIBUTION_CANVAS,
    TREND_CANVAS,
    VARIANCE_CANVAS,
    RELIABILITY_CANVAS,
];

/// Suppliers drawn in the trend chart.
const TREND_SUPPLIERS: usize = 5;
/// Floor of a projected monthly lead time, in days.
const MIN_LEAD_TIME: f64 = 5.0;
/// Current safety stock is estimated at this share of the recommendation.
const CURRENT_STOCK_SHARE: f64 = 0.7;

const RISK_HIGH: LevelColors = LevelColors {
    fill: "rgba(255, 84, 89, 0.7)",
    border: "rgba(192, 21, 47, 1)",
};
const RISK_MEDIUM: LevelColors = LevelColors {
    fill: "rgba(230, 129, 97, 0.7)",
    border: "rgba(168, 75, 47, 1)",
};
const RISK_LOW: LevelColors = LevelColors {
    fill: "rgba(34, 197, 94, 0.7)",
    border: "rgba(21, 128, 61, 1)",
};
const AVERAGE: LevelColors = LevelColors {
    fill: "rgba(50, 184, 198, 0.6)",
    border: "rgba(33, 128, 141, 1)",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    #[must_use]
    pub const fn colors(self) -> LevelColors {
        match self {
            Self::High => RISK_HIGH,
            Self::Medium => RISK_MEDIUM,
            Self::Low => RISK_LOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyRisk {
    pub family: String,
    /// Stockout risk score in `0..=1`.
    pub risk_score: f64,
    pub stockout_risk: RiskLevel,
    /// Recommended safety stock in days.
    pub safety_stock_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierLeadTime {
    pub supplier_id: String,
    pub name: String,
    pub avg_lead_time_days: f64,
    /// Expected change in lead time over the trend window, in days.
    pub trend_days: f64,
    /// Delivery reliability in `0..=1`.
    pub reliability: f64,
    /// Lead-time variance in percent.
    pub variance: f64,
    pub primary_family: String,
}

impl SupplierLeadTime {
    #[must_use]
    pub fn risk(&self) -> RiskLevel {
        if self.variance > 30.0 || self.reliability < 0.6 {
            RiskLevel::High
        } else if self.variance > 20.0 || self.reliability < 0.7 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    LeadTime,
    Reliability,
    Variance,
    Name,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierFilter {
    pub supplier_id: Option<String>,
    pub family: Option<String>,
    pub risk: Option<RiskLevel>,
    pub sort_by: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadTimeData {
    pub families: Vec<FamilyRisk>,
    pub suppliers: Vec<SupplierLeadTime>,
    pub trend_months: Vec<String>,
    #[serde(default)]
    pub filter: SupplierFilter,
}

impl LeadTimeData {
    #[must_use]
    pub fn sample() -> Self {
        let family = |family: &str, risk_score, stockout_risk, safety_stock_days| FamilyRisk {
            family: family.into(),
            risk_score,
            stockout_risk,
            safety_stock_days,
        };
        let supplier = |id: &str, name: &str, lead, trend, reliability, variance, fam: &str| {
            SupplierLeadTime {
                supplier_id: id.into(),
                name: name.into(),
                avg_lead_time_days: lead,
                trend_days: trend,
                reliability,
                variance,
                primary_family: fam.into(),
            }
        };
        Self {
            families: vec![
                family("EPI", 0.70, RiskLevel::High, 25.0),
                family("FERRAMENTAS_E_EQUIPAMENTOS", 0.30, RiskLevel::Low, 19.0),
                family("FERRO_E_AÇO", 0.77, RiskLevel::High, 26.0),
                family("MATERIAL_CIVIL", 0.43, RiskLevel::Medium, 21.0),
                family("MATERIAL_ELETRICO", 0.73, RiskLevel::High, 25.0),
            ],
            suppliers: vec![
                supplier("1", "L.M.C LEMOS MATERIAIS PARA CONSTRUCAO", 12.0, 1.0, 0.88, 8.0, "MATERIAL_CIVIL"),
                supplier("2", "HIPERFERRO", 16.0, 2.0, 0.82, 12.0, "FERRO_E_AÇO"),
                supplier("3", "BELGO CERCAS", 14.0, 0.0, 0.85, 9.0, "FERRO_E_AÇO"),
                supplier("4", "BRASPRESS", 18.0, -3.0, 0.62, 35.0, "FERRAMENTAS_E_EQUIPAMENTOS"),
                supplier("5", "M M MATERIAL DE CONSTRUCAO", 13.0, 0.0, 0.79, 15.0, "MATERIAL_CIVIL"),
                supplier("6", "FERIMPORT COMERCIO REPRESENTACAO E IMPORTACAO LTDA", 15.0, 1.0, 0.75, 22.0, "MATERIAL_ELETRICO"),
                supplier("7", "RENNER HERRMANN SA", 14.0, 0.0, 0.80, 10.0, "MATERIAL_CIVIL"),
                supplier("8", "TIBIDAR MARCENARIA E CONSTRUCAO", 16.0, -1.0, 0.72, 18.0, "MATERIAL_CIVIL"),
                supplier("9", "NOVA COMERCIO DE MATERIAIS ELETRICOS LTDA", 13.0, 1.0, 0.83, 11.0, "MATERIAL_ELETRICO"),
                supplier("10", "NORDESTE EPI", 17.0, -2.0, 0.68, 28.0, "EPI"),
            ],
            trend_months: ["Mai", "Jun", "Jul", "Ago", "Set", "Out"]
                .into_iter()
                .map(String::from)
                .collect(),
            filter: SupplierFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: SupplierFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Suppliers passing the filter, in the selected order.
    #[must_use]
    pub fn visible_suppliers(&self) -> Vec<&SupplierLeadTime> {
        let f = &self.filter;
        let mut visible: Vec<&SupplierLeadTime> = self
            .suppliers
            .iter()
            .filter(|s| f.supplier_id.as_ref().is_none_or(|id| *id == s.supplier_id))
            .filter(|s| f.family.as_ref().is_none_or(|fam| *fam == s.primary_family))
            .filter(|s| f.risk.is_none_or(|risk| risk == s.risk()))
            .collect();
        visible.sort_by(|a, b| compare(f.sort_by, a, b));
        visible
    }
}

fn compare(key: SortKey, a: &SupplierLeadTime, b: &SupplierLeadTime) -> Ordering {
    match key {
        SortKey::LeadTime => a.avg_lead_time_days.total_cmp(&b.avg_lead_time_days),
        SortKey::Reliability => b.reliability.total_cmp(&a.reliability),
        SortKey::Variance => b.variance.total_cmp(&a.variance),
        SortKey::Name => a.name.cmp(&b.name),
    }
}

/// Variance bar colour. Thresholds are tighter than the supplier risk level.
#[must_use]
pub fn variance_colors(variance: f64) -> LevelColors {
    if variance > 20.0 {
        RISK_HIGH
    } else if variance > 12.0 {
        RISK_MEDIUM
    } else {
        RISK_LOW
    }
}

/// Monthly lead time drifting linearly by `trend_days` across the window.
#[must_use]
pub fn lead_time_trend(supplier: &SupplierLeadTime, months: usize) -> Vec<f64> {
    let span = months.max(1) as f64;
    (0..months)
        .map(|i| {
            let value = supplier.avg_lead_time_days + supplier.trend_days * (i as f64 / span);
            round_to(value.max(MIN_LEAD_TIME), 1)
        })
        .collect()
}

/// `(family, min, mean, max)` of average lead times, families in first-seen order.
#[must_use]
pub fn family_lead_times(suppliers: &[&SupplierLeadTime]) -> Vec<(String, f64, f64, f64)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for s in suppliers {
        match groups.iter_mut().find(|(f, _)| *f == s.primary_family) {
            Some((_, values)) => values.push(s.avg_lead_time_days),
            None => groups.push((s.primary_family.clone(), vec![s.avg_lead_time_days])),
        }
    }
    groups
        .into_iter()
        .map(|(family, values)| {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (family, min, round_to(mean, 1), max)
        })
        .collect()
}

fn soft_axis() -> ScaleSpec {
    ScaleSpec::default()
        .tick_color(palette::AXIS_TEXT)
        .grid_color(palette::GRID_SOFT)
}

fn days_axis() -> ScaleSpec {
    soft_axis().begin_at_zero().title("Lead Time (dias)")
}

fn trend_color(index: usize, alpha: Option<f64>) -> String {
    let hue = index * 60;
    match alpha {
        Some(a) => format!("hsla({hue}, 70%, 50%, {a})"),
        None => format!("hsl({hue}, 70%, 50%)"),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeadTimePanel;

impl LeadTimePanel {
    /// Risk score bars per family with recommended safety stock on `y1`.
    #[must_use]
    pub fn family_risk_spec(families: &[FamilyRisk]) -> ChartSpec {
        let levels: Vec<LevelColors> = families.iter().map(|f| f.stockout_risk.colors()).collect();
        let (fill, border) = palette::split(&levels);
        ChartSpec::bar()
            .labels(families.iter().map(|f| f.family.clone()))
            .dataset(
                Dataset::values(
                    "Pontuação de Risco",
                    families.iter().map(|f| round_to(f.risk_score * 100.0, 1)).collect(),
                )
                .background(fill)
                .border(border)
                .border_width(2.0)
                .axis("y"),
            )
            .dataset(
                Dataset::values(
                    "Estoque de Segurança (Dias)",
                    families.iter().map(|f| f.safety_stock_days).collect(),
                )
                .as_kind(ChartKind::Line)
                .border(palette::CYAN)
                .background(palette::CYAN_FILL)
                .axis("y1"),
            )
            .scale(
                "y",
                soft_axis()
                    .range(0.0, 100.0)
                    .begin_at_zero()
                    .title("Pontuação de Risco (%)"),
            )
            .scale(
                "y1",
                ScaleSpec::linear()
                    .position(AxisPosition::Right)
                    .tick_color(palette::AXIS_TEXT)
                    .title("Estoque de Segurança (dias)")
                    .secondary(),
            )
            .scale("x", soft_axis())
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(palette::tooltip().value_suffixes(vec!["%".into(), " dias".into()]))
    }

    #[must_use]
    pub fn safety_stock_spec(families: &[FamilyRisk]) -> ChartSpec {
        ChartSpec::bar()
            .labels(families.iter().map(|f| f.family.clone()))
            .dataset(
                Dataset::values(
                    "Estoque de Segurança Atual (Est.)",
                    families
                        .iter()
                        .map(|f| round_to(f.safety_stock_days * CURRENT_STOCK_SHARE, 1))
                        .collect(),
                )
                .background(RISK_MEDIUM.fill)
                .border(RISK_MEDIUM.border)
                .border_width(2.0),
            )
            .dataset(
                Dataset::values(
                    "Estoque de Segurança Recomendado",
                    families.iter().map(|f| f.safety_stock_days).collect(),
                )
                .background(RISK_LOW.fill)
                .border(RISK_LOW.border)
                .border_width(2.0),
            )
            .scale("y", soft_axis().begin_at_zero().title("Estoque de Segurança (dias)"))
            .scale("x", soft_axis())
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(palette::tooltip().value_suffixes(vec![" dias".into(); 2]))
    }

    /// Reliability against lead time, coloured by supplier risk.
    #[must_use]
    pub fn performance_spec(suppliers: &[&SupplierLeadTime]) -> ChartSpec {
        let points = suppliers
            .iter()
            .map(|s| Point {
                x: round_to(s.reliability * 100.0, 1),
                y: s.avg_lead_time_days,
            })
            .collect();
        let levels: Vec<LevelColors> = suppliers.iter().map(|s| s.risk().colors()).collect();
        let (fill, border) = palette::split(&levels);
        let details = suppliers
            .iter()
            .map(|s| {
                vec![
                    format!("Confiabilidade: {}%", format_value(round_to(s.reliability * 100.0, 1))),
                    format!("Lead Time: {} dias", format_value(s.avg_lead_time_days)),
                    format!("Variância: {}%", format_value(s.variance)),
                ]
            })
            .collect();
        ChartSpec::scatter()
            .dataset(
                Dataset::points("Fornecedores", points)
                    .background(fill)
                    .border(border)
                    .border_width(2.0)
                    .point_radius(8.0),
            )
            .scale("x", soft_axis().range(50.0, 100.0).title("Confiabilidade (%)"))
            .scale("y", days_axis())
            .hide_legend()
            .tooltip(
                palette::tooltip()
                    .titles(suppliers.iter().map(|s| s.name.clone()).collect())
                    .extra_lines(details),
            )
    }

    #[must_use]
    pub fn distribution_spec(suppliers: &[&SupplierLeadTime]) -> ChartSpec {
        let stats = family_lead_times(suppliers);
        let series = |label: &str, colors: LevelColors, pick: fn(&(String, f64, f64, f64)) -> f64| {
            Dataset::values(label, stats.iter().map(pick).collect())
                .background(colors.fill)
                .border(colors.border)
                .border_width(2.0)
        };
        ChartSpec::bar()
            .labels(stats.iter().map(|(family, ..)| family.clone()))
            .dataset(series("Mínimo", RISK_LOW, |s| s.1))
            .dataset(series("Média", AVERAGE, |s| s.2))
            .dataset(series("Máximo", RISK_MEDIUM, |s| s.3))
            .scale("y", days_axis())
            .scale("x", soft_axis())
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(palette::tooltip().value_suffixes(vec![" dias".into(); 3]))
    }

    #[must_use]
    pub fn trend_spec(months: &[String], suppliers: &[&SupplierLeadTime]) -> ChartSpec {
        let top = &suppliers[..suppliers.len().min(TREND_SUPPLIERS)];
        let mut spec = ChartSpec::line().labels(months.iter().cloned());
        for (i, s) in top.iter().enumerate() {
            spec = spec.dataset(
                Dataset::values(s.name.clone(), lead_time_trend(s, months.len()))
                    .border(trend_color(i, None))
                    .background(trend_color(i, Some(0.1)))
                    .border_width(2.0)
                    .tension(0.4)
                    .fill(false),
            );
        }
        spec.scale("y", days_axis())
            .scale("x", soft_axis())
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(palette::tooltip().value_suffixes(vec![" dias".into(); top.len()]))
    }

    #[must_use]
    pub fn variance_spec(suppliers: &[&SupplierLeadTime]) -> ChartSpec {
        let levels: Vec<LevelColors> = suppliers.iter().map(|s| variance_colors(s.variance)).collect();
        let (fill, border) = palette::split(&levels);
        ChartSpec::bar()
            .labels(suppliers.iter().map(|s| s.name.clone()))
            .dataset(
                Dataset::values("Variância (%)", suppliers.iter().map(|s| s.variance).collect())
                    .background(fill)
                    .border(border)
                    .border_width(2.0),
            )
            .scale("y", soft_axis().range(0.0, 40.0).begin_at_zero().tick_suffix("%"))
            .scale("x", soft_axis())
            .hide_legend()
            .tooltip(palette::tooltip().value_suffixes(vec!["%".into()]))
    }

    #[must_use]
    pub fn reliability_spec(suppliers: &[&SupplierLeadTime]) -> ChartSpec {
        let points = suppliers
            .iter()
            .map(|s| Point {
                x: s.avg_lead_time_days,
                y: round_to(s.reliability * 100.0, 1),
            })
            .collect();
        ChartSpec::scatter()
            .dataset(
                Dataset::points("Confiabilidade vs Lead Time", points)
                    .background(AVERAGE.fill)
                    .border(palette::CYAN)
                    .border_width(2.0)
                    .point_radius(6.0),
            )
            .scale("x", soft_axis().title("Lead Time (dias)"))
            .scale("y", soft_axis().range(50.0, 100.0).title("Confiabilidade (%)"))
            .legend_color(palette::LEGEND_TEXT)
            .tooltip(palette::tooltip().titles(suppliers.iter().map(|s| s.name.clone()).collect()))
    }
}

impl ChartPanel for LeadTimePanel {
    type Data = LeadTimeData;

    fn kind(&self) -> PanelKind {
        PanelKind::LeadTime
    }

    fn title(&self) -> &'static str {
        "Lead time de fornecedores"
    }

    fn chart_specs(&self, data: &LeadTimeData) -> Vec<ChartSlot> {
        let mut slots = vec![
            ChartSlot::new(FAMILY_RISK_CANVAS, Self::family_risk_spec(&data.families)),
            ChartSlot::new(SAFETY_STOCK_CANVAS, Self::safety_stock_spec(&data.families)),
        ];
        let suppliers = data.visible_suppliers();
        if suppliers.is_empty() {
            return slots;
        }
        slots.extend([
            ChartSlot::new(PERFORMANCE_CANVAS, Self::performance_spec(&suppliers)),
            ChartSlot::new(DISTRIBUTION_CANVAS, Self::distribution_spec(&suppliers)),
            ChartSlot::new(TREND_CANVAS, Self::trend_spec(&data.trend_months, &suppliers)),
            ChartSlot::new(VARIANCE_CANVAS, Self::variance_spec(&suppliers)),
            ChartSlot::new(RELIABILITY_CANVAS, Self::reliability_spec(&suppliers)),
        ]);
        slots
    }

    fn sample_data(&self) -> LeadTimeData {
        LeadTimeData::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_core::chart_spec::DataValues;
    use pretty_assertions::assert_eq;

    fn canvases(slots: &[ChartSlot]) -> Vec<&str> {
        slots.iter().map(|s| s.canvas_id.as_str()).collect()
    }

    fn changed<'a>(before: &'a [ChartSlot], after: &[ChartSlot]) -> Vec<&'a str> {
        before
            .iter()
            .zip(after)
            .filter(|(a, b)| a.spec != b.spec)
            .map(|(a, _)| a.canvas_id.as_str())
            .collect()
    }

    #[test]
    fn sample_has_seven_valid_charts() {
        let slots = LeadTimePanel.chart_specs(&LeadTimeData::sample());
        assert_eq!(slots.len(), 7);
        for slot in &slots {
            assert_eq!(slot.spec.validate(), Ok(()), "{}", slot.canvas_id);
        }
    }

    #[test]
    fn supplier_risk_levels() {
        let data = LeadTimeData::sample();
        let risk = |id: &str| {
            data.suppliers
                .iter()
                .find(|s| s.supplier_id == id)
                .map(SupplierLeadTime::risk)
        };
        assert_eq!(risk("4"), Some(RiskLevel::High));
        assert_eq!(risk("6"), Some(RiskLevel::Medium));
        assert_eq!(risk("10"), Some(RiskLevel::Medium));
        assert_eq!(risk("1"), Some(RiskLevel::Low));
    }

    #[test]
    fn filter_and_sort() {
        let data = LeadTimeData::sample().with_filter(SupplierFilter {
            family: Some("MATERIAL_CIVIL".into()),
            sort_by: SortKey::Variance,
            ..SupplierFilter::default()
        });
        let ids: Vec<&str> = data
            .visible_suppliers()
            .iter()
            .map(|s| s.supplier_id.as_str())
            .collect();
        assert_eq!(ids, vec!["8", "5", "7", "1"]);

        let sample = LeadTimeData::sample();
        let default_order: Vec<&str> = sample
            .visible_suppliers()
            .iter()
            .take(3)
            .map(|s| s.supplier_id.as_str())
            .collect();
        assert_eq!(default_order, vec!["1", "5", "9"]);
    }

    #[test]
    fn trend_is_deterministic_and_floored() {
        let data = LeadTimeData::sample();
        assert_eq!(
            lead_time_trend(&data.suppliers[3], 6),
            vec![18.0, 17.5, 17.0, 16.5, 16.0, 15.5]
        );
        let mut slow = data.suppliers[0].clone();
        slow.avg_lead_time_days = 5.5;
        slow.trend_days = -6.0;
        assert_eq!(lead_time_trend(&slow, 3), vec![5.5, 5.0, 5.0]);
    }

    #[test]
    fn trend_draws_at_most_five_suppliers() {
        let data = LeadTimeData::sample();
        let suppliers = data.visible_suppliers();
        let spec = LeadTimePanel::trend_spec(&data.trend_months, &suppliers);
        assert_eq!(spec.data.datasets.len(), 5);
        assert_eq!(spec.data.datasets[0].label, "L.M.C LEMOS MATERIAIS PARA CONSTRUCAO");
    }

    #[test]
    fn distribution_groups_by_family() {
        let data = LeadTimeData::sample().with_filter(SupplierFilter {
            sort_by: SortKey::Name,
            ..SupplierFilter::default()
        });
        let stats = family_lead_times(&data.visible_suppliers());
        let civil = stats.iter().find(|(f, ..)| f == "MATERIAL_CIVIL");
        assert_eq!(civil, Some(&("MATERIAL_CIVIL".to_string(), 12.0, 13.8, 16.0)));
        assert_eq!(stats.len(), 5);
    }

    #[test]
    fn safety_stock_estimates_current_level() {
        let spec = LeadTimePanel::safety_stock_spec(&LeadTimeData::sample().families);
        assert_eq!(
            spec.data.datasets[0].data,
            DataValues::Values(vec![17.5, 13.3, 18.2, 14.7, 17.5])
        );
    }

    #[test]
    fn filter_change_leaves_family_charts_alone() {
        let before = LeadTimePanel.chart_specs(&LeadTimeData::sample());
        let data = LeadTimeData::sample().with_filter(SupplierFilter {
            risk: Some(RiskLevel::Low),
            ..SupplierFilter::default()
        });
        let after = LeadTimePanel.chart_specs(&data);
        assert_eq!(changed(&before, &after), SUPPLIER_CANVASES.to_vec());
    }

    #[test]
    fn family_change_leaves_supplier_charts_alone() {
        let before = LeadTimePanel.chart_specs(&LeadTimeData::sample());
        let mut data = LeadTimeData::sample();
        data.families[0].safety_stock_days = 30.0;
        let after = LeadTimePanel.chart_specs(&data);
        assert_eq!(
            changed(&before, &after),
            vec![FAMILY_RISK_CANVAS, SAFETY_STOCK_CANVAS]
        );
    }

    #[test]
    fn empty_filter_keeps_only_family_charts() {
        let data = LeadTimeData::sample().with_filter(SupplierFilter {
            supplier_id: Some("missing".into()),
            ..SupplierFilter::default()
        });
        assert_eq!(
            canvases(&LeadTimePanel.chart_specs(&data)),
            vec![FAMILY_RISK_CANVAS, SAFETY_STOCK_CANVAS]
        );
    }

    #[test]
    fn filter_json_uses_defaults() {
        let json = serde_json::json!({
            "families": [],
            "suppliers": [],
            "trendMonths": [],
            "filter": { "risk": "high" }
        });
        let data: LeadTimeData = serde_json::from_value(json).unwrap();
        assert_eq!(data.filter.risk, Some(RiskLevel::High));
        assert_eq!(data.filter.sort_by, SortKey::LeadTime);
    }
}
