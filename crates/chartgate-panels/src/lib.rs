#![forbid(unsafe_code)]

//! Dashboard panels built on `chartgate-core`.
//!
//! A panel is a pure mapping from typed data to named chart slots
//! ([`ChartPanel`]). A [`PanelOrchestrator`] owns one lifecycle controller
//! per slot and re-initializes only the slots whose chart actually changed.
//! [`PanelSet`] mounts panels by kind name from JSON for the browser host.
//!
//! Panels and their canvases:
//!
//! | Panel | Canvases |
//! |-------|----------|
//! | [`coverage::CoveragePanel`] | `coverageChart`, `regionalDemandChart` |
//! | [`inventory::InventoryPanel`] | `stockLevelChart` |
//! | [`projections::ProjectionsPanel`] | `projectionsChart` |
//! | [`supply_chain::SupplyChainPanel`] | `supplyChainChart` |
//! | [`sla::SlaPanel`] | `slaGauge`, `violationChart`, `downtimeChart`, `trendChart` |
//! | [`categorical::CategoricalPanel`] | `importanceChart`, `encodingChart` |
//! | [`lead_time::LeadTimePanel`] | `familyRiskHeatmap`, `safetyStockComparison`, `supplierPerformanceMatrix`, `leadTimeDistributionByFamily`, `trendAnalysis`, `varianceChart`, `reliabilityChart` |

pub mod categorical;
pub mod coverage;
pub mod error;
pub mod inventory;
pub mod lead_time;
pub mod palette;
pub mod panel;
pub mod panel_set;
pub mod projections;
pub mod scenario;
pub mod sla;
pub mod supply_chain;

pub use error::PanelError;
pub use panel::{
    ChartPanel, ChartSlot, LOADING_MESSAGE, PanelKind, PanelOrchestrator, PanelView, SlotView,
    UNAVAILABLE_MESSAGE, UpdateSummary,
};
pub use panel_set::PanelSet;
pub use scenario::Scenario;
