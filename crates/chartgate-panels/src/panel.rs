#![forbid(unsafe_code)]

//! Panel trait and the orchestrator that owns one controller per chart slot.

use core::fmt;
use core::str::FromStr;

use chartgate_core::chart_spec::ChartSpec;
use chartgate_core::controller::{ControllerState, LifecycleController};
use chartgate_core::page::Page;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PanelError;

/// Placeholder text shown while the rendering library is loading.
pub const LOADING_MESSAGE: &str = "Carregando visualização...";

/// Placeholder text shown when the rendering library never became available.
pub const UNAVAILABLE_MESSAGE: &str =
    "Visualização indisponível: a biblioteca de gráficos não foi carregada.";

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    Coverage,
    Inventory,
    Projections,
    SupplyChain,
    Sla,
    Categorical,
    LeadTime,
}

impl PanelKind {
    pub const ALL: [Self; 7] = [
        Self::Coverage,
        Self::Inventory,
        Self::Projections,
        Self::SupplyChain,
        Self::Sla,
        Self::Categorical,
        Self::LeadTime,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coverage => "coverage",
            Self::Inventory => "inventory",
            Self::Projections => "projections",
            Self::SupplyChain => "supply-chain",
            Self::Sla => "sla",
            Self::Categorical => "categorical",
            Self::LeadTime => "lead-time",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PanelError::UnknownPanel(s.to_string()))
    }
}

/// One named canvas and the chart it should show.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlot {
    pub canvas_id: String,
    pub spec: ChartSpec,
}

impl ChartSlot {
    #[must_use]
    pub fn new(canvas_id: impl Into<String>, spec: ChartSpec) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            spec,
        }
    }
}

/// A dashboard tab: typed data in, chart slots out.
///
/// `chart_specs` must be pure. The orchestrator compares its output between
/// updates to decide which canvases to rebuild.
pub trait ChartPanel {
    type Data: DeserializeOwned;

    fn kind(&self) -> PanelKind;

    fn title(&self) -> &'static str;

    fn chart_specs(&self, data: &Self::Data) -> Vec<ChartSlot>;

    /// Data the dashboard ships with.
    fn sample_data(&self) -> Self::Data;
}

/// What the host renders for one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SlotView {
    Loading {
        canvas_id: String,
        message: &'static str,
    },
    Unavailable {
        canvas_id: String,
        message: &'static str,
        summary: Vec<String>,
    },
    Canvas {
        canvas_id: String,
    },
}

impl SlotView {
    #[must_use]
    pub fn canvas_id(&self) -> &str {
        match self {
            Self::Loading { canvas_id, .. }
            | Self::Unavailable { canvas_id, .. }
            | Self::Canvas { canvas_id } => canvas_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub kind: PanelKind,
    pub title: &'static str,
    pub slots: Vec<SlotView>,
}

/// Canvas ids touched by one [`PanelOrchestrator::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub reinitialized: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl UpdateSummary {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.reinitialized.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

struct MountedSlot {
    canvas_id: String,
    spec: ChartSpec,
    controller: LifecycleController,
}

/// Owns the controllers of one mounted panel.
///
/// Dropping the orchestrator unmounts every slot.
pub struct PanelOrchestrator<P: ChartPanel> {
    page: Page,
    panel: P,
    slots: Vec<MountedSlot>,
}

impl<P: ChartPanel> fmt::Debug for PanelOrchestrator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelOrchestrator")
            .field("kind", &self.panel.kind())
            .field("slots", &self.canvas_ids())
            .finish()
    }
}

impl<P: ChartPanel> PanelOrchestrator<P> {
    /// Create and start one controller per slot.
    #[must_use]
    pub fn mount(page: &Page, panel: P, data: &P::Data) -> Self {
        let mut orchestrator = Self {
            page: page.clone(),
            panel,
            slots: Vec::new(),
        };
        for slot in orchestrator.panel.chart_specs(data) {
            orchestrator.slots.push(orchestrator.start_slot(slot));
        }
        info!(
            panel = %orchestrator.panel.kind(),
            slots = orchestrator.slots.len(),
            "panel mounted"
        );
        orchestrator
    }

    fn start_slot(&self, slot: ChartSlot) -> MountedSlot {
        let controller = self.page.controller(slot.canvas_id.clone(), slot.spec.clone());
        controller.start();
        MountedSlot {
            canvas_id: slot.canvas_id,
            spec: slot.spec,
            controller,
        }
    }

    /// Apply new panel data, rebuilding only the canvases whose chart changed.
    pub fn update(&mut self, data: &P::Data) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        let mut previous = std::mem::take(&mut self.slots);

        for slot in self.panel.chart_specs(data) {
            match previous.iter().position(|s| s.canvas_id == slot.canvas_id) {
                Some(index) => {
                    let mut mounted = previous.remove(index);
                    if mounted.spec == slot.spec {
                        summary.unchanged.push(slot.canvas_id);
                    } else {
                        mounted.controller.update(slot.spec.clone());
                        mounted.spec = slot.spec;
                        summary.reinitialized.push(slot.canvas_id);
                    }
                    self.slots.push(mounted);
                }
                None => {
                    summary.added.push(slot.canvas_id.clone());
                    self.slots.push(self.start_slot(slot));
                }
            }
        }

        for gone in previous {
            gone.controller.unmount();
            summary.removed.push(gone.canvas_id);
        }

        debug!(
            panel = %self.panel.kind(),
            reinitialized = ?summary.reinitialized,
            added = ?summary.added,
            removed = ?summary.removed,
            "panel updated"
        );
        summary
    }

    /// Unmount every slot. The orchestrator is empty afterwards.
    pub fn unmount(&mut self) {
        for slot in self.slots.drain(..) {
            slot.controller.unmount();
        }
        debug!(panel = %self.panel.kind(), "panel unmounted");
    }

    /// Re-arm slots parked while another controller held their canvas.
    pub fn retry(&self) {
        for slot in &self.slots {
            slot.controller.retry();
        }
    }

    /// Deterministic render model for the current readiness outcome.
    #[must_use]
    pub fn view(&self) -> PanelView {
        let readiness = self.page.readiness();
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                let canvas_id = slot.canvas_id.clone();
                match readiness {
                    Some(r) if r.available => SlotView::Canvas { canvas_id },
                    Some(_) => SlotView::Unavailable {
                        canvas_id,
                        message: UNAVAILABLE_MESSAGE,
                        summary: slot.spec.text_summary(),
                    },
                    None => SlotView::Loading {
                        canvas_id,
                        message: LOADING_MESSAGE,
                    },
                }
            })
            .collect();
        PanelView {
            kind: self.panel.kind(),
            title: self.panel.title(),
            slots,
        }
    }

    #[must_use]
    pub fn controller(&self, canvas_id: &str) -> Option<&LifecycleController> {
        self.slots
            .iter()
            .find(|s| s.canvas_id == canvas_id)
            .map(|s| &s.controller)
    }

    #[must_use]
    pub fn canvas_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.canvas_id.as_str()).collect()
    }

    /// True when every slot has a live chart.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slots
            .iter()
            .all(|s| s.controller.state() == ControllerState::Ready)
    }

    #[must_use]
    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: ChartPanel> Drop for PanelOrchestrator<P> {
    fn drop(&mut self) {
        if !self.slots.is_empty() {
            self.unmount();
        }
    }
}
