//! End-to-end timeline of one coverage chart.
//!
//! | t (ms) | event | expectation |
//! |--------|-------|-------------|
//! | 0 | page + panel mount, library absent | `WaitingForLibrary` |
//! | 50 | script `onload` | `WaitingForDom`, canvas not there yet |
//! | 60 | canvas mounts, next frame | `Ready`, one registry entry |
//! | 200 | scenario filter changes | `Ready→Reinitializing→Initializing→Ready`, new handle |
//! | 300 | panel unmounts | registry entry for `coverageChart` removed |
//! | 310 | panel remounts | fresh `Idle→…→Ready`, nothing left of the old handle |

use chartgate_core::ControllerState::*;
use chartgate_core::chart_spec::{ChartSpec, Dataset};
use chartgate_core::registry::RegistryOp;
use chartgate_core::readiness::ReadinessSource;
use chartgate_core::testing::TestHarness;
use pretty_assertions::assert_eq;

const CANVAS: &str = "coverageChart";

fn coverage(scale: f64) -> ChartSpec {
    ChartSpec::line()
        .labels(["Jan", "Fev", "Mar", "Abr"])
        .dataset(Dataset::values(
            "Municípios",
            [600.0, 630.0, 670.0, 710.0].iter().map(|v| v * scale).collect(),
        ))
}

#[test]
fn coverage_chart_timeline() {
    let h = TestHarness::new();

    // t=0
    let ctl = h.page.controller(CANVAS, coverage(1.0));
    ctl.start();
    h.ev.drain_microtasks();
    assert_eq!(ctl.state(), WaitingForLibrary);

    // t=50
    h.at_ms(50);
    h.load_library();
    assert_eq!(
        h.page.readiness().map(|r| (r.available, r.source)),
        Some((true, ReadinessSource::Callback))
    );
    assert!(h.page.defaults_applied());
    assert_eq!(ctl.state(), WaitingForDom);
    h.at_ms(55);
    h.ev.run_animation_frame();
    assert_eq!(ctl.state(), WaitingForDom);

    // t=60
    h.at_ms(60);
    h.dom.insert_canvas(CANVAS);
    h.ev.run_animation_frame();
    h.at_ms(61);
    assert_eq!(ctl.state(), Ready);
    assert_eq!(h.page.registry().live_count(CANVAS), 1);
    let first_handle = ctl.handle_id();
    assert!(first_handle.is_some());

    // t=200
    h.at_ms(200);
    ctl.update(coverage(1.15));
    assert_eq!(ctl.state(), Reinitializing);
    h.ev.run_animation_frame();
    assert_eq!(ctl.state(), Ready);
    assert_eq!(h.page.registry().live_count(CANVAS), 1);
    assert_ne!(ctl.handle_id(), first_handle);
    assert_eq!(h.library.live_count(), 1);
    let tail: Vec<_> = ctl.history().into_iter().rev().take(4).collect();
    assert_eq!(tail, vec![Ready, Initializing, Reinitializing, Ready]);

    // t=300
    h.at_ms(300);
    ctl.unmount();
    h.dom.remove_canvas(CANVAS);
    assert_eq!(ctl.state(), Destroyed);
    assert_eq!(h.page.registry().live_count(CANVAS), 0);
    assert_eq!(h.library.live_count(), 0);
    let second_handle = ctl.handle_id();
    assert_eq!(second_handle, None);
    drop(ctl);

    // t=310
    h.at_ms(310);
    let new_node = h.dom.insert_canvas(CANVAS);
    let remounted = h.page.controller(CANVAS, coverage(1.15));
    remounted.start();
    h.ev.drain_microtasks();
    assert_eq!(
        remounted.history(),
        vec![Idle, WaitingForLibrary, WaitingForDom, Initializing, Ready]
    );
    assert_eq!(h.page.registry().live_count(CANVAS), 1);
    let handle = remounted.handle_id().expect("ready");
    assert_eq!(h.page.registry().get_by_node(new_node), Some(handle));
    assert_eq!(h.library.live_count(), 1);
    assert_eq!(h.library.defaults_applied(), 1);
}

#[test]
fn every_set_follows_a_destroy_of_the_same_id() {
    let h = TestHarness::loaded();
    h.dom.insert_canvas(CANVAS);
    let ctl = h.page.controller(CANVAS, coverage(1.0));
    ctl.start();
    h.ev.drain_microtasks();
    for step in 1..5 {
        ctl.update(coverage(1.0 + f64::from(step) / 10.0));
        h.ev.run_animation_frame();
    }
    ctl.unmount();

    let ops = h.page.registry().ops().to_vec();
    let sets = ops
        .iter()
        .filter(|op| matches!(op, RegistryOp::Set { .. }))
        .count();
    assert_eq!(sets, 5);
    for (i, op) in ops.iter().enumerate() {
        if let RegistryOp::Set { canvas_id, .. } = op {
            assert!(i > 0, "set without a preceding destroy");
            assert!(matches!(
                &ops[i - 1],
                RegistryOp::Destroy { canvas_id: prev, .. } if prev == canvas_id
            ));
        }
    }
    assert!(matches!(ops.last(), Some(RegistryOp::Destroy { released: 1, .. })));
}

#[test]
fn page_unmount_releases_leftovers_and_stops_polling() {
    let h = TestHarness::new();
    h.dom.insert_canvas(CANVAS);
    let ctl = h.page.controller(CANVAS, coverage(1.0));
    ctl.start();
    h.at_ms(120);
    h.load_library();
    assert_eq!(ctl.state(), Ready);

    h.page.unmount();
    assert!(h.page.registry().is_empty());
    assert_eq!(h.library.live_count(), 0);
    assert!(h.ev.is_idle());

    drop(ctl);
    assert_eq!(h.library.live_count(), 0);
}

#[test]
fn page_unmount_before_readiness_silences_panels() {
    let h = TestHarness::new();
    let ctl = h.page.controller(CANVAS, coverage(1.0));
    ctl.start();
    h.at_ms(30);
    h.page.unmount();

    h.library.set_loaded(true);
    h.page.script_loaded();
    h.at_ms(20_000);
    h.ev.run_frames(10);
    assert_eq!(ctl.state(), WaitingForLibrary);
    assert!(!ctl.library_unavailable());
    assert_eq!(h.library.constructed_count(), 0);
}
