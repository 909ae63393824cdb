//! Panels rebuild only the canvases whose data slice changed.
//!
//! Verifies:
//! 1. A scenario switch on the coverage tab rebuilds `coverageChart` and
//!    keeps the `regionalDemandChart` handle.
//! 2. A new violation figure rebuilds only `violationChart`.
//! 3. Emptying the active category removes both categorical canvases.
//! 4. Unmounting one panel never releases another panel's canvases.
//! 5. A supplier filter on the lead-time tab rebuilds its five supplier
//!    canvases and keeps both family canvases; a family figure does the
//!    opposite; a filter matching nobody removes the supplier canvases.

use chartgate_core::chart_spec::DataValues;
use chartgate_core::{ControllerState, HandleId};
use chartgate_core::testing::TestHarness;
use chartgate_panels::categorical::{
    CategoricalData, CategoricalPanel, CategoryType, ENCODING_CANVAS, IMPORTANCE_CANVAS,
};
use chartgate_panels::coverage::{COVERAGE_CANVAS, CoverageData, CoveragePanel, REGIONAL_CANVAS};
use chartgate_panels::lead_time::{
    FAMILY_RISK_CANVAS, LeadTimeData, LeadTimePanel, RiskLevel, SAFETY_STOCK_CANVAS,
    SUPPLIER_CANVASES, SupplierFilter,
};
use chartgate_panels::sla::{self, SlaData, SlaPanel, VIOLATION_CANVAS};
use chartgate_panels::{ChartPanel, PanelOrchestrator, Scenario};
use pretty_assertions::assert_eq;

fn mounted<P: ChartPanel>(h: &TestHarness, panel: P, data: &P::Data) -> PanelOrchestrator<P> {
    for slot in panel.chart_specs(data) {
        h.dom.insert_canvas(&slot.canvas_id);
    }
    let orch = PanelOrchestrator::mount(&h.page, panel, data);
    h.ev.drain_microtasks();
    assert!(orch.is_ready(), "{orch:?} not ready");
    orch
}

fn handle(orch: &PanelOrchestrator<impl ChartPanel>, canvas_id: &str) -> Option<HandleId> {
    orch.controller(canvas_id).and_then(|c| c.handle_id())
}

#[test]
fn scenario_switch_rebuilds_only_the_trend() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, CoveragePanel, &CoverageData::sample());
    let coverage_before = handle(&orch, COVERAGE_CANVAS);
    let regional_before = handle(&orch, REGIONAL_CANVAS);

    let summary = orch.update(&CoverageData::sample().with_scenario(Scenario::Adverse));
    assert_eq!(summary.reinitialized, vec![COVERAGE_CANVAS.to_string()]);
    assert_eq!(summary.unchanged, vec![REGIONAL_CANVAS.to_string()]);

    h.ev.run_animation_frame();
    assert!(orch.is_ready());
    assert_ne!(handle(&orch, COVERAGE_CANVAS), coverage_before);
    assert_eq!(handle(&orch, REGIONAL_CANVAS), regional_before);
    assert_eq!(h.library.live_count(), 2);
}

#[test]
fn violation_update_touches_one_of_four() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, SlaPanel, &SlaData::sample());
    let constructed = h.library.constructed_count();

    let mut data = SlaData::sample();
    data.violations[1].risk = 55.0;
    let summary = orch.update(&data);
    assert_eq!(summary.reinitialized, vec![VIOLATION_CANVAS.to_string()]);
    assert_eq!(summary.unchanged.len(), 3);

    h.ev.run_animation_frame();
    assert_eq!(h.library.constructed_count(), constructed + 1);
    assert_eq!(h.library.live_count(), 4);
}

#[test]
fn several_updates_before_a_frame_build_once() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, SlaPanel, &SlaData::sample());
    let constructed = h.library.constructed_count();

    for global in [98.9, 98.4, 97.1] {
        let mut data = SlaData::sample();
        data.global_availability = global;
        orch.update(&data);
    }
    assert_eq!(
        orch.controller(sla::GAUGE_CANVAS).map(|c| c.state()),
        Some(ControllerState::Reinitializing)
    );
    h.ev.run_animation_frame();

    // gauge and trend both depend on the global figure
    assert_eq!(h.library.constructed_count(), constructed + 2);
    let gauge = orch
        .controller(sla::GAUGE_CANVAS)
        .map(|c| c.spec())
        .expect("gauge mounted");
    assert_eq!(
        gauge.data.datasets[0].data,
        DataValues::Values(vec![97.1, 2.9])
    );
}

#[test]
fn empty_category_unmounts_both_canvases() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, CategoricalPanel, &CategoricalData::sample());
    assert_eq!(orch.canvas_ids(), vec![IMPORTANCE_CANVAS, ENCODING_CANVAS]);

    let mut data = CategoricalData::sample().with_active(CategoryType::Suppliers);
    data.suppliers.clear();
    let summary = orch.update(&data);

    assert_eq!(
        summary.removed,
        vec![IMPORTANCE_CANVAS.to_string(), ENCODING_CANVAS.to_string()]
    );
    assert!(orch.canvas_ids().is_empty());
    assert!(h.page.registry().is_empty());
    assert_eq!(h.library.live_count(), 0);

    let summary = orch.update(&CategoricalData::sample().with_active(CategoryType::Sites));
    assert_eq!(summary.added.len(), 2);
    h.ev.drain_microtasks();
    assert!(orch.is_ready());
}

#[test]
fn panels_keep_to_their_own_canvases() {
    let h = TestHarness::loaded();
    let mut coverage = mounted(&h, CoveragePanel, &CoverageData::sample());
    let sla = mounted(&h, SlaPanel, &SlaData::sample());
    assert_eq!(h.library.live_count(), 6);

    coverage.unmount();
    assert_eq!(h.library.live_count(), 4);
    assert_eq!(h.page.registry().live_count(COVERAGE_CANVAS), 0);
    assert!(sla.is_ready());
    for id in sla.canvas_ids() {
        assert_eq!(h.page.registry().live_count(id), 1, "{id}");
    }
}

fn ids(canvases: &[&str]) -> Vec<String> {
    canvases.iter().map(|id| (*id).to_string()).collect()
}

#[test]
fn supplier_filter_rebuilds_only_supplier_canvases() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, LeadTimePanel, &LeadTimeData::sample());
    assert_eq!(h.library.live_count(), 7);
    let family_before = handle(&orch, FAMILY_RISK_CANVAS);
    let stock_before = handle(&orch, SAFETY_STOCK_CANVAS);
    let trend_before = handle(&orch, SUPPLIER_CANVASES[2]);

    let data = LeadTimeData::sample().with_filter(SupplierFilter {
        risk: Some(RiskLevel::Medium),
        ..SupplierFilter::default()
    });
    let summary = orch.update(&data);
    assert_eq!(summary.reinitialized, ids(&SUPPLIER_CANVASES));
    assert_eq!(summary.unchanged, ids(&[FAMILY_RISK_CANVAS, SAFETY_STOCK_CANVAS]));

    h.ev.run_animation_frame();
    assert!(orch.is_ready());
    assert_eq!(handle(&orch, FAMILY_RISK_CANVAS), family_before);
    assert_eq!(handle(&orch, SAFETY_STOCK_CANVAS), stock_before);
    assert_ne!(handle(&orch, SUPPLIER_CANVASES[2]), trend_before);
    assert_eq!(h.library.live_count(), 7);
    for id in orch.canvas_ids() {
        assert_eq!(h.page.registry().live_count(id), 1, "{id}");
    }
}

#[test]
fn family_figure_rebuilds_only_family_canvases() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, LeadTimePanel, &LeadTimeData::sample());
    let constructed = h.library.constructed_count();

    let mut data = LeadTimeData::sample();
    data.families[2].risk_score = 0.91;
    let summary = orch.update(&data);
    assert_eq!(summary.reinitialized, ids(&[FAMILY_RISK_CANVAS]));
    assert_eq!(summary.unchanged.len(), 6);

    h.ev.run_animation_frame();
    assert_eq!(h.library.constructed_count(), constructed + 1);
    assert_eq!(h.library.live_count(), 7);
}

#[test]
fn filter_matching_nobody_removes_supplier_canvases() {
    let h = TestHarness::loaded();
    let mut orch = mounted(&h, LeadTimePanel, &LeadTimeData::sample());

    let data = LeadTimeData::sample().with_filter(SupplierFilter {
        family: Some("EPI".into()),
        risk: Some(RiskLevel::Low),
        ..SupplierFilter::default()
    });
    let summary = orch.update(&data);
    assert_eq!(summary.removed, ids(&SUPPLIER_CANVASES));
    assert_eq!(orch.canvas_ids(), vec![FAMILY_RISK_CANVAS, SAFETY_STOCK_CANVAS]);
    assert_eq!(h.library.live_count(), 2);

    let summary = orch.update(&LeadTimeData::sample());
    assert_eq!(summary.added, ids(&SUPPLIER_CANVASES));
    h.ev.drain_microtasks();
    assert!(orch.is_ready());
    assert_eq!(h.library.live_count(), 7);
}
