//! Deterministic placeholders while the rendering library is pending or gone.
//!
//! | gate | slot view |
//! |------|-----------|
//! | pending | `Loading` with the loading message |
//! | timed out | `Unavailable` with the chart's text summary |
//! | ready | `Canvas` |

use core::time::Duration;

use chartgate_core::config::{DashboardConfig, GateConfig};
use chartgate_core::testing::TestHarness;
use chartgate_panels::coverage::{COVERAGE_CANVAS, CoverageData, CoveragePanel};
use chartgate_panels::inventory::{InventoryData, InventoryPanel};
use chartgate_panels::{
    ChartPanel, LOADING_MESSAGE, PanelOrchestrator, PanelSet, SlotView, UNAVAILABLE_MESSAGE,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn short_gate() -> TestHarness {
    TestHarness::with_config(
        DashboardConfig::default().with_gate(GateConfig::default().with_max_poll_attempts(5)),
    )
}

#[test]
fn pending_gate_shows_loading_everywhere() {
    let h = TestHarness::new();
    let orch = PanelOrchestrator::mount(&h.page, CoveragePanel, &CoverageData::sample());
    h.ev.advance(Duration::from_millis(300));

    let view = orch.view();
    assert_eq!(view.title, "Cobertura 5G");
    for slot in &view.slots {
        assert_eq!(
            slot,
            &SlotView::Loading {
                canvas_id: slot.canvas_id().to_string(),
                message: LOADING_MESSAGE,
            }
        );
    }
}

#[test]
fn timeout_shows_text_fallback() {
    let h = short_gate();
    let data = InventoryData::sample();
    let orch = PanelOrchestrator::mount(&h.page, InventoryPanel, &data);
    h.ev.advance(h.page.config().gate.hard_cap());

    let expected_summary = InventoryPanel.chart_specs(&data)[0].spec.text_summary();
    let view = orch.view();
    assert_eq!(
        view.slots,
        vec![SlotView::Unavailable {
            canvas_id: "stockLevelChart".into(),
            message: UNAVAILABLE_MESSAGE,
            summary: expected_summary.clone(),
        }]
    );
    assert_eq!(
        expected_summary,
        vec![
            "Nível de estoque (%): RF Kits 45, Fibra Óptica 32, PSUs 78, Conectores 78, Switches 82, Antenas 58"
                .to_string()
        ]
    );
    assert_eq!(view, orch.view(), "view is a pure function of state");
    assert!(orch.controller("stockLevelChart").is_some_and(|c| c.library_unavailable()));
    assert_eq!(h.library.constructed_count(), 0);
}

#[test]
fn ready_gate_shows_canvases_before_they_mount() {
    let h = TestHarness::new();
    let orch = PanelOrchestrator::mount(&h.page, CoveragePanel, &CoverageData::sample());
    h.load_library();

    // the host must render canvases for the controllers to find them
    assert!(
        orch.view()
            .slots
            .iter()
            .all(|s| matches!(s, SlotView::Canvas { .. }))
    );
    assert!(!orch.is_ready());

    h.dom.insert_canvas(COVERAGE_CANVAS);
    h.dom.insert_canvas("regionalDemandChart");
    h.ev.run_animation_frame();
    assert!(orch.is_ready());
}

#[test]
fn panel_set_view_serialises_for_the_host() {
    let h = short_gate();
    let mut set = PanelSet::new(h.page.clone());
    set.mount("supply-chain", None).expect("supply chain mounts");
    set.mount("categorical", None).expect("categorical mounts");
    h.ev.advance(h.page.config().gate.hard_cap());

    let views = serde_json::to_value(set.views()).unwrap_or_default();
    assert_eq!(views[0]["kind"], json!("supply-chain"));
    assert_eq!(views[0]["slots"][0]["state"], json!("unavailable"));
    assert_eq!(views[0]["slots"][0]["canvasId"], json!("supplyChainChart"));
    assert_eq!(
        views[0]["slots"][0]["summary"][0],
        json!("Margem (%): Jan 22, Fev 23, Mar 24, Abr 24.5, Mai 24.3, Jun 24.5")
    );
    assert_eq!(views[1]["kind"], json!("categorical"));
    assert_eq!(views[1]["slots"].as_array().map(Vec::len), Some(2));
}

#[test]
fn page_unmount_keeps_placeholders_loading() {
    let h = TestHarness::new();
    let orch = PanelOrchestrator::mount(&h.page, CoveragePanel, &CoverageData::sample());
    h.page.unmount();
    h.ev.advance(Duration::from_secs(30));

    assert!(
        orch.view()
            .slots
            .iter()
            .all(|s| matches!(s, SlotView::Loading { .. }))
    );
    assert_eq!(h.library.constructed_count(), 0);
}
