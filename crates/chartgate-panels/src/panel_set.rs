#![forbid(unsafe_code)]

//! Panels addressed by kind name, with JSON data.

use std::collections::BTreeMap;

use chartgate_core::page::Page;
use serde_json::Value;
use tracing::{debug, warn};

use crate::categorical::CategoricalPanel;
use crate::coverage::CoveragePanel;
use crate::error::PanelError;
use crate::inventory::InventoryPanel;
use crate::lead_time::LeadTimePanel;
use crate::panel::{ChartPanel, PanelKind, PanelOrchestrator, PanelView, UpdateSummary};
use crate::projections::ProjectionsPanel;
use crate::sla::SlaPanel;
use crate::supply_chain::SupplyChainPanel;

/// Object-safe view of a mounted [`PanelOrchestrator`].
trait MountedPanel {
    fn update_json(&mut self, data: Value) -> Result<UpdateSummary, PanelError>;
    fn view(&self) -> PanelView;
    fn retry(&self);
    fn unmount(&mut self);
}

impl<P: ChartPanel> MountedPanel for PanelOrchestrator<P> {
    fn update_json(&mut self, data: Value) -> Result<UpdateSummary, PanelError> {
        let data = parse::<P>(self.panel(), data)?;
        Ok(self.update(&data))
    }

    fn view(&self) -> PanelView {
        PanelOrchestrator::view(self)
    }

    fn retry(&self) {
        PanelOrchestrator::retry(self);
    }

    fn unmount(&mut self) {
        PanelOrchestrator::unmount(self);
    }
}

fn parse<P: ChartPanel>(panel: &P, data: Value) -> Result<P::Data, PanelError> {
    serde_json::from_value(data).map_err(|e| PanelError::InvalidData {
        panel: panel.kind().as_str(),
        reason: e.to_string(),
    })
}

fn mount_one<P: ChartPanel + 'static>(
    page: &Page,
    panel: P,
    data: Option<Value>,
) -> Result<Box<dyn MountedPanel>, PanelError> {
    let data = match data {
        Some(value) => parse(&panel, value)?,
        None => panel.sample_data(),
    };
    Ok(Box::new(PanelOrchestrator::mount(page, panel, &data)))
}

/// Every mounted panel on one page.
pub struct PanelSet {
    page: Page,
    panels: BTreeMap<PanelKind, Box<dyn MountedPanel>>,
}

impl std::fmt::Debug for PanelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelSet")
            .field("mounted", &self.mounted())
            .finish()
    }
}

impl PanelSet {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            panels: BTreeMap::new(),
        }
    }

    /// Mount `kind` with `data`, or with its sample data when `None`.
    ///
    /// A panel that is already mounted is unmounted first.
    pub fn mount(&mut self, kind: &str, data: Option<Value>) -> Result<PanelView, PanelError> {
        let kind: PanelKind = kind.parse()?;
        let mounted = match kind {
            PanelKind::Coverage => mount_one(&self.page, CoveragePanel, data),
            PanelKind::Inventory => mount_one(&self.page, InventoryPanel, data),
            PanelKind::Projections => mount_one(&self.page, ProjectionsPanel, data),
            PanelKind::SupplyChain => mount_one(&self.page, SupplyChainPanel, data),
            PanelKind::Sla => mount_one(&self.page, SlaPanel, data),
            PanelKind::Categorical => mount_one(&self.page, CategoricalPanel, data),
            PanelKind::LeadTime => mount_one(&self.page, LeadTimePanel, data),
        }?;
        if let Some(mut previous) = self.panels.remove(&kind) {
            debug!(panel = %kind, "remounting panel");
            previous.unmount();
        }
        let view = mounted.view();
        self.panels.insert(kind, mounted);
        Ok(view)
    }

    pub fn update(&mut self, kind: &str, data: Value) -> Result<UpdateSummary, PanelError> {
        let kind: PanelKind = kind.parse()?;
        let panel = self
            .panels
            .get_mut(&kind)
            .ok_or(PanelError::NotMounted(kind.as_str()))?;
        panel.update_json(data).inspect_err(|err| {
            warn!(panel = %kind, "{err}");
        })
    }

    pub fn unmount(&mut self, kind: &str) -> Result<(), PanelError> {
        let kind: PanelKind = kind.parse()?;
        let mut panel = self
            .panels
            .remove(&kind)
            .ok_or(PanelError::NotMounted(kind.as_str()))?;
        panel.unmount();
        Ok(())
    }

    pub fn unmount_all(&mut self) {
        for (_, mut panel) in std::mem::take(&mut self.panels) {
            panel.unmount();
        }
    }

    pub fn view(&self, kind: &str) -> Result<PanelView, PanelError> {
        let kind: PanelKind = kind.parse()?;
        self.panels
            .get(&kind)
            .map(|p| p.view())
            .ok_or(PanelError::NotMounted(kind.as_str()))
    }

    /// Views of every mounted panel, in kind order.
    #[must_use]
    pub fn views(&self) -> Vec<PanelView> {
        self.panels.values().map(|p| p.view()).collect()
    }

    /// Re-arm every parked slot, e.g. when the tab regains focus.
    pub fn retry_all(&self) {
        for panel in self.panels.values() {
            panel.retry();
        }
    }

    #[must_use]
    pub fn mounted(&self) -> Vec<PanelKind> {
        self.panels.keys().copied().collect()
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }
}
