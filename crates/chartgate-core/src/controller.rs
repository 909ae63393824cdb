#![forbid(unsafe_code)]

//! Per-canvas lifecycle state machine.
//!
//! ```text
//! Idle ─start─▶ WaitingForLibrary ─ready─▶ WaitingForDom ─canvas─▶ Initializing ─▶ Ready
//!                                              ▲    │ (guard busy / failure)        │ update
//!                                              └────┘◀── canvas gone ── Reinitializing ◀┘
//!                      any state ─unmount─▶ Destroyed
//! ```
//!
//! # Invariants
//!
//! 1. A handle is only constructed while the controller holds the canvas
//!    id's guard flag, and only after a registry destroy for that id.
//! 2. `Initializing` never persists: it ends in `Ready` or, on failure, in
//!    `WaitingForDom` with the guard released.
//! 3. After `Destroyed` no scheduled callback touches the registry or the
//!    document; pending frames are cancelled and stale ones are ignored.
//! 4. DOM lookups are bounded by `dom_retry_frames` per attempt.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, warn};

use crate::chart_spec::ChartSpec;
use crate::error::LifecycleError;
use crate::event_loop::FrameId;
use crate::guard::{ControllerId, GuardToken};
use crate::host::{CanvasNode, HandleId, NodeKey};
use crate::page::{Page, PageContext};
use crate::readiness::{LibraryReadiness, Unsubscribe};

/// Lifecycle states of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerState {
    Idle,
    WaitingForLibrary,
    WaitingForDom,
    Initializing,
    Ready,
    Reinitializing,
    Destroyed,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameTask {
    DomRetry,
    Rebuild,
}

struct PendingFrame {
    ticket: u64,
    frame: FrameId,
    task: FrameTask,
}

struct Inner {
    id: ControllerId,
    canvas_id: String,
    page: Rc<PageContext>,
    dom_retry_frames: u32,
    state: ControllerState,
    spec: ChartSpec,
    subscription: Option<Unsubscribe>,
    guard: Option<GuardToken>,
    pending: Option<PendingFrame>,
    next_ticket: u64,
    frames_left: u32,
    handle: Option<(HandleId, NodeKey)>,
    history: Vec<ControllerState>,
    last_error: Option<LifecycleError>,
    library_unavailable: bool,
}

impl Inner {
    fn transition(&mut self, to: ControllerState) {
        debug!(
            canvas_id = %self.canvas_id,
            controller = self.id,
            from = %self.state,
            to = %to,
            "controller transition"
        );
        self.state = to;
        self.history.push(to);
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.page.event_loop.cancel_animation_frame(pending.frame);
        }
    }
}

type Shared = Rc<RefCell<Inner>>;

/// Drives one canvas through its lifecycle.
///
/// Dropping the controller unmounts it.
pub struct LifecycleController {
    inner: Shared,
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LifecycleController")
            .field("id", &inner.id)
            .field("canvas_id", &inner.canvas_id)
            .field("state", &inner.state)
            .field("handle", &inner.handle)
            .finish()
    }
}

impl LifecycleController {
    #[must_use]
    pub fn new(page: &Page, canvas_id: impl Into<String>, spec: ChartSpec) -> Self {
        let ctx = page.context().clone();
        let id = ctx.alloc_controller_id();
        let dom_retry_frames = ctx.config.controller.dom_retry_frames;
        Self {
            inner: Rc::new(RefCell::new(Inner {
                id,
                canvas_id: canvas_id.into(),
                page: ctx,
                dom_retry_frames,
                state: ControllerState::Idle,
                spec,
                subscription: None,
                guard: None,
                pending: None,
                next_ticket: 0,
                frames_left: 0,
                handle: None,
                history: vec![ControllerState::Idle],
                last_error: None,
                library_unavailable: false,
            })),
        }
    }

    /// `Idle → WaitingForLibrary`, subscribing to the readiness gate.
    pub fn start(&self) {
        let gate = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != ControllerState::Idle {
                debug!(canvas_id = %inner.canvas_id, state = %inner.state, "start ignored");
                return;
            }
            inner.transition(ControllerState::WaitingForLibrary);
            inner.page.gate.clone()
        };
        let weak = Rc::downgrade(&self.inner);
        let subscription = gate.subscribe(move |readiness| {
            if let Some(inner) = weak.upgrade() {
                on_readiness(&inner, readiness);
            }
        });
        self.inner.borrow_mut().subscription = Some(subscription);
    }

    /// Replace the chart spec.
    ///
    /// A `Ready` chart is torn down now and rebuilt on the next animation
    /// frame; updates before that frame coalesce. A parked controller tries
    /// again immediately. Otherwise the spec is stored for later.
    pub fn update(&self, spec: ChartSpec) {
        let state = {
            let mut inner = self.inner.borrow_mut();
            inner.spec = spec;
            inner.state
        };
        match state {
            ControllerState::Ready => begin_reinitialize(&self.inner),
            ControllerState::WaitingForDom if self.inner.borrow().pending.is_none() => {
                begin_dom_wait(&self.inner);
            }
            _ => {}
        }
    }

    /// Re-arm a controller parked in `WaitingForDom`, or rebuild a `Ready`
    /// chart whose canvas node was replaced or detached.
    pub fn retry(&self) {
        let state = self.inner.borrow().state;
        match state {
            ControllerState::WaitingForDom if self.inner.borrow().pending.is_none() => {
                begin_dom_wait(&self.inner);
            }
            ControllerState::Ready if self.drawn_on_stale_node() => {
                debug!(canvas_id = %self.inner.borrow().canvas_id, "canvas node replaced; rebuilding");
                begin_reinitialize(&self.inner);
            }
            _ => {
                let inner = self.inner.borrow();
                debug!(canvas_id = %inner.canvas_id, state = %inner.state, "retry ignored");
            }
        }
    }

    fn drawn_on_stale_node(&self) -> bool {
        let (dom, canvas_id, drawn_on) = {
            let inner = self.inner.borrow();
            let Some((_, key)) = inner.handle else {
                return false;
            };
            (inner.page.dom.clone(), inner.canvas_id.clone(), key)
        };
        match dom.find_canvas(&canvas_id) {
            Some(node) => node.node_key() != drawn_on || !node.is_connected(),
            None => true,
        }
    }

    /// Move to `Destroyed` from any state. Idempotent.
    ///
    /// Releases the registry slot unless another controller owns the id.
    pub fn unmount(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == ControllerState::Destroyed {
            return;
        }
        inner.cancel_pending();
        inner.subscription = None;

        let page = inner.page.clone();
        let token = match inner.guard.take() {
            Some(token) => Some(token),
            None => page.guards.try_acquire(&inner.canvas_id, inner.id),
        };
        if token.is_some() {
            page.registry.borrow_mut().destroy(&inner.canvas_id);
        } else {
            debug!(
                canvas_id = %inner.canvas_id,
                holder = ?page.guards.holder(&inner.canvas_id),
                "slot owned elsewhere; leaving registry untouched"
            );
        }
        drop(token);
        inner.handle = None;
        inner.transition(ControllerState::Destroyed);
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.inner.borrow().state
    }

    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.inner.borrow().id
    }

    #[must_use]
    pub fn canvas_id(&self) -> String {
        self.inner.borrow().canvas_id.clone()
    }

    #[must_use]
    pub fn spec(&self) -> ChartSpec {
        self.inner.borrow().spec.clone()
    }

    /// Id of the live handle while `Ready`.
    #[must_use]
    pub fn handle_id(&self) -> Option<HandleId> {
        self.inner.borrow().handle.map(|(id, _)| id)
    }

    /// Every state entered so far, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> Vec<ControllerState> {
        self.inner.borrow().history.clone()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<LifecycleError> {
        self.inner.borrow().last_error.clone()
    }

    /// True once the readiness gate reported terminal unavailability.
    #[must_use]
    pub fn library_unavailable(&self) -> bool {
        self.inner.borrow().library_unavailable
    }

    #[must_use]
    pub fn holds_guard(&self) -> bool {
        self.inner.borrow().guard.is_some()
    }

    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn on_readiness(this: &Shared, readiness: LibraryReadiness) {
    {
        let mut inner = this.borrow_mut();
        inner.subscription = None;
        if inner.state != ControllerState::WaitingForLibrary {
            return;
        }
        if !readiness.available {
            let attempts = inner.page.config.gate.max_poll_attempts;
            let err = LifecycleError::LibraryUnavailable { attempts };
            warn!(canvas_id = %inner.canvas_id, "{err}");
            inner.library_unavailable = true;
            inner.last_error = Some(err);
            return;
        }
        inner.transition(ControllerState::WaitingForDom);
    }
    begin_dom_wait(this);
}

fn begin_dom_wait(this: &Shared) {
    {
        let mut inner = this.borrow_mut();
        inner.frames_left = inner.dom_retry_frames;
    }
    attempt_dom(this);
}

fn attempt_dom(this: &Shared) {
    let (dom, canvas_id) = {
        let inner = this.borrow();
        (inner.page.dom.clone(), inner.canvas_id.clone())
    };
    match dom.find_canvas(&canvas_id) {
        Some(node) => try_initialize(this, node),
        None => schedule_dom_retry(this),
    }
}

fn schedule_dom_retry(this: &Shared) {
    let mut inner = this.borrow_mut();
    if inner.frames_left == 0 {
        let err = LifecycleError::DomNotReady {
            canvas_id: inner.canvas_id.clone(),
            frames: inner.dom_retry_frames,
        };
        warn!(canvas_id = %inner.canvas_id, "{err}");
        inner.last_error = Some(err);
        return;
    }
    inner.frames_left -= 1;
    schedule_frame(this, &mut inner, FrameTask::DomRetry);
}

fn schedule_frame(this: &Shared, inner: &mut Inner, task: FrameTask) {
    inner.cancel_pending();
    inner.next_ticket += 1;
    let ticket = inner.next_ticket;
    let weak: Weak<RefCell<Inner>> = Rc::downgrade(this);
    let frame = inner.page.event_loop.request_animation_frame(move || {
        if let Some(inner) = weak.upgrade() {
            on_frame(&inner, ticket);
        }
    });
    inner.pending = Some(PendingFrame {
        ticket,
        frame,
        task,
    });
}

fn on_frame(this: &Shared, ticket: u64) {
    let task = {
        let mut inner = this.borrow_mut();
        match &inner.pending {
            Some(pending) if pending.ticket == ticket => {}
            _ => return,
        }
        let Some(pending) = inner.pending.take() else {
            return;
        };
        let expected = match pending.task {
            FrameTask::DomRetry => ControllerState::WaitingForDom,
            FrameTask::Rebuild => ControllerState::Reinitializing,
        };
        if inner.state != expected {
            return;
        }
        pending.task
    };
    match task {
        FrameTask::DomRetry => attempt_dom(this),
        FrameTask::Rebuild => rebuild(this),
    }
}

fn begin_reinitialize(this: &Shared) {
    let mut inner = this.borrow_mut();
    inner.transition(ControllerState::Reinitializing);
    let page = inner.page.clone();
    page.registry.borrow_mut().destroy(&inner.canvas_id);
    inner.handle = None;
    schedule_frame(this, &mut inner, FrameTask::Rebuild);
}

fn rebuild(this: &Shared) {
    let (dom, canvas_id) = {
        let inner = this.borrow();
        (inner.page.dom.clone(), inner.canvas_id.clone())
    };
    match dom.find_canvas(&canvas_id) {
        Some(node) => try_initialize(this, node),
        None => {
            {
                let mut inner = this.borrow_mut();
                inner.guard = None;
                inner.transition(ControllerState::WaitingForDom);
            }
            begin_dom_wait(this);
        }
    }
}

fn try_initialize(this: &Shared, node: Rc<dyn CanvasNode>) {
    let (page, canvas_id, spec) = {
        let mut inner = this.borrow_mut();
        if inner.guard.is_none() {
            match inner.page.guards.try_acquire(&inner.canvas_id, inner.id) {
                Some(token) => inner.guard = Some(token),
                None => {
                    debug!(
                        canvas_id = %inner.canvas_id,
                        controller = inner.id,
                        "initialization already in flight elsewhere; parking"
                    );
                    return;
                }
            }
        }
        inner.transition(ControllerState::Initializing);
        (inner.page.clone(), inner.canvas_id.clone(), inner.spec.clone())
    };

    let key = node.node_key();
    let result = construct(&page, &canvas_id, node, &spec);

    let mut inner = this.borrow_mut();
    match result {
        Ok(handle) => {
            inner.handle = Some((handle, key));
            inner.transition(ControllerState::Ready);
        }
        Err(err) => {
            warn!(canvas_id = %canvas_id, "{err}");
            inner.guard = None;
            inner.last_error = Some(err);
            inner.transition(ControllerState::WaitingForDom);
        }
    }
}

/// Destroy, validate, construct, record. Holds the guard throughout.
fn construct(
    page: &PageContext,
    canvas_id: &str,
    node: Rc<dyn CanvasNode>,
    spec: &ChartSpec,
) -> Result<HandleId, LifecycleError> {
    page.registry.borrow_mut().destroy(canvas_id);
    let failure = |reason: String| LifecycleError::ConstructionFailure {
        canvas_id: canvas_id.to_string(),
        reason,
    };
    spec.validate().map_err(|e| failure(e.to_string()))?;
    let handle = page
        .library
        .construct(node.as_ref(), spec)
        .map_err(|e| failure(e.to_string()))?;
    let id = handle.id();
    page.registry.borrow_mut().set(node, handle);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_spec::Dataset;
    use crate::config::{ControllerConfig, DashboardConfig, GateConfig};
    use crate::testing::TestHarness;
    use core::time::Duration;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;
    use ControllerState::*;

    fn spec(values: &[f64]) -> ChartSpec {
        let labels: Vec<String> = (0..values.len()).map(|i| format!("p{i}")).collect();
        ChartSpec::line()
            .labels(labels)
            .dataset(Dataset::values("v", values.to_vec()))
    }

    #[test]
    fn ready_path_records_one_entry() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0, 2.0]));
        ctl.start();
        h.ev.drain_microtasks();

        assert_eq!(ctl.state(), Ready);
        assert_eq!(ctl.history(), vec![Idle, WaitingForLibrary, WaitingForDom, Initializing, Ready]);
        assert_eq!(h.page.registry().live_count("c"), 1);
        assert!(ctl.holds_guard());
    }

    #[test]
    fn waits_for_canvas_across_frames() {
        let h = TestHarness::loaded();
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();
        assert_eq!(ctl.state(), WaitingForDom);
        assert!(ctl.has_pending_frame());

        h.ev.run_animation_frame();
        h.dom.insert_canvas("c");
        h.ev.run_animation_frame();
        assert_eq!(ctl.state(), Ready);
    }

    #[test]
    #[traced_test]
    fn gives_up_after_bounded_frames() {
        let h = TestHarness::with_config(
            DashboardConfig::default().with_controller(ControllerConfig::default().with_dom_retry_frames(3)),
        );
        h.library.set_loaded(true);
        let ctl = h.page.controller("hidden", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();

        assert_eq!(h.ev.run_frames(100), 3);
        assert_eq!(ctl.state(), WaitingForDom);
        assert!(!ctl.has_pending_frame());
        assert_eq!(
            ctl.last_error(),
            Some(LifecycleError::DomNotReady {
                canvas_id: "hidden".into(),
                frames: 3
            })
        );
        assert!(logs_contain("not found after 3 frames"));

        h.dom.insert_canvas("hidden");
        ctl.retry();
        assert_eq!(ctl.state(), Ready);
    }

    #[test]
    #[traced_test]
    fn construction_failure_parks_and_releases_guard() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        h.library.fail_next_construct("bad dataset shape");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();

        assert_eq!(ctl.state(), WaitingForDom);
        assert!(!ctl.holds_guard());
        assert!(!h.page.guards().is_held("c"));
        assert!(h.page.registry().is_empty());
        assert!(matches!(
            ctl.last_error(),
            Some(LifecycleError::ConstructionFailure { .. })
        ));
        assert!(logs_contain("bad dataset shape"));

        ctl.retry();
        assert_eq!(ctl.state(), Ready);
    }

    #[test]
    fn invalid_spec_is_a_construction_failure() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let bad = ChartSpec::bar()
            .labels(["a", "b"])
            .dataset(Dataset::values("v", vec![1.0]));
        let ctl = h.page.controller("c", bad);
        ctl.start();
        h.ev.drain_microtasks();

        assert_eq!(ctl.state(), WaitingForDom);
        assert_eq!(h.library.constructed_count(), 0);

        ctl.update(spec(&[1.0]));
        assert_eq!(ctl.state(), Ready);
    }

    #[test]
    fn updates_coalesce_into_one_rebuild() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();
        let first = ctl.handle_id();

        ctl.update(spec(&[2.0]));
        assert_eq!(ctl.state(), Reinitializing);
        assert_eq!(h.page.registry().live_count("c"), 0);
        ctl.update(spec(&[3.0]));
        ctl.update(spec(&[4.0]));
        h.ev.run_animation_frame();

        assert_eq!(ctl.state(), Ready);
        assert_ne!(ctl.handle_id(), first);
        assert_eq!(h.library.constructed_count(), 2);
        assert_eq!(h.library.last_spec(), Some(spec(&[4.0])));
    }

    #[test]
    fn canvas_gone_during_rebuild_waits_for_dom() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();

        ctl.update(spec(&[2.0]));
        h.dom.remove_canvas("c");
        h.ev.run_animation_frame();
        assert_eq!(ctl.state(), WaitingForDom);
        assert!(!ctl.holds_guard());

        h.dom.insert_canvas("c");
        h.ev.run_animation_frame();
        assert_eq!(ctl.state(), Ready);
    }

    #[test]
    fn retry_rebuilds_on_replaced_canvas() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();
        let first = ctl.handle_id();

        let fresh = h.dom.insert_canvas("c");
        assert_eq!(h.page.registry().get("c"), None);
        ctl.retry();
        assert_eq!(ctl.state(), Reinitializing);
        assert_eq!(h.library.live_count(), 0, "stale chart released");
        h.ev.run_animation_frame();

        assert_eq!(ctl.state(), Ready);
        assert_ne!(ctl.handle_id(), first);
        assert_eq!(h.page.registry().get_by_node(fresh), ctl.handle_id());
        assert_eq!(h.page.registry().live_count("c"), 1);
    }

    #[test]
    fn retry_on_current_canvas_is_a_noop() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();

        ctl.retry();
        assert_eq!(ctl.state(), Ready);
        assert_eq!(h.ev.pending_frames(), 0);
        assert_eq!(h.library.constructed_count(), 1);
    }

    #[test]
    fn second_controller_for_same_id_aborts() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let a = h.page.controller("c", spec(&[1.0]));
        let b = h.page.controller("c", spec(&[2.0]));
        a.start();
        b.start();
        h.ev.drain_microtasks();

        assert_eq!(a.state(), Ready);
        assert_eq!(b.state(), WaitingForDom);
        assert!(!b.history().contains(&Initializing));
        assert_eq!(h.page.registry().live_count("c"), 1);

        b.unmount();
        assert_eq!(h.page.registry().live_count("c"), 1, "loser leaves the slot alone");
        drop(a);
        assert!(h.page.registry().is_empty());
    }

    #[test]
    fn unmount_cancels_pending_rebuild() {
        let h = TestHarness::loaded();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.drain_microtasks();
        ctl.update(spec(&[2.0]));

        ctl.unmount();
        ctl.unmount();
        assert_eq!(h.ev.pending_frames(), 0);
        h.ev.run_frames(5);
        assert_eq!(ctl.state(), Destroyed);
        assert_eq!(h.library.constructed_count(), 1);
        assert!(!h.page.guards().is_held("c"));
    }

    #[test]
    fn unmount_before_readiness_never_constructs() {
        let h = TestHarness::new();
        h.dom.insert_canvas("c");
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        ctl.unmount();

        h.library.set_loaded(true);
        h.ev.advance(Duration::from_millis(500));
        h.ev.run_frames(5);
        assert_eq!(h.library.constructed_count(), 0);
        assert_eq!(ctl.history(), vec![Idle, WaitingForLibrary, Destroyed]);
    }

    #[test]
    fn unavailable_library_flags_controller() {
        let h = TestHarness::with_config(
            DashboardConfig::default().with_gate(GateConfig::default().with_max_poll_attempts(2)),
        );
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.start();
        h.ev.advance(Duration::from_millis(200));

        assert_eq!(ctl.state(), WaitingForLibrary);
        assert!(ctl.library_unavailable());
        assert_eq!(
            ctl.last_error(),
            Some(LifecycleError::LibraryUnavailable { attempts: 2 })
        );
    }

    #[test]
    fn update_before_ready_only_stores_spec() {
        let h = TestHarness::new();
        let ctl = h.page.controller("c", spec(&[1.0]));
        ctl.update(spec(&[9.0]));
        assert_eq!(ctl.state(), Idle);
        assert_eq!(ctl.spec(), spec(&[9.0]));
    }
}
