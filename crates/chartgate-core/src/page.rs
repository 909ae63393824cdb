#![forbid(unsafe_code)]

//! One page lifetime: the shared pieces every controller on the page uses.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::chart_spec::ChartSpec;
use crate::config::DashboardConfig;
use crate::controller::LifecycleController;
use crate::event_loop::EventLoop;
use crate::guard::{ControllerId, GuardFlags};
use crate::host::{CanvasLocator, ChartLibrary};
use crate::readiness::{LibraryReadiness, PollState, ReadinessGate, Unsubscribe};
use crate::registry::CanvasRegistry;

pub(crate) struct PageContext {
    pub(crate) config: DashboardConfig,
    pub(crate) event_loop: EventLoop,
    pub(crate) gate: ReadinessGate,
    pub(crate) registry: RefCell<CanvasRegistry>,
    pub(crate) guards: GuardFlags,
    pub(crate) library: Rc<dyn ChartLibrary>,
    pub(crate) dom: Rc<dyn CanvasLocator>,
    next_controller: Cell<ControllerId>,
    defaults_applied: Cell<bool>,
    defaults_subscription: RefCell<Option<Unsubscribe>>,
}

impl PageContext {
    pub(crate) fn alloc_controller_id(&self) -> ControllerId {
        let id = self.next_controller.get() + 1;
        self.next_controller.set(id);
        id
    }
}

/// Cheaply clonable handle to one mounted page.
#[derive(Clone)]
pub struct Page {
    ctx: Rc<PageContext>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("gate", &self.ctx.gate.state())
            .field("registry", &self.ctx.registry.borrow().len())
            .finish()
    }
}

impl Page {
    /// Mount a page and start waiting for the rendering library.
    ///
    /// The page registers the first gate subscriber, so library defaults are
    /// applied before any panel is told the library is ready.
    #[must_use]
    pub fn mount(
        config: DashboardConfig,
        event_loop: EventLoop,
        library: Rc<dyn ChartLibrary>,
        dom: Rc<dyn CanvasLocator>,
    ) -> Self {
        let gate = ReadinessGate::new(config.gate.clone(), event_loop.clone(), library.clone());
        let ctx = Rc::new(PageContext {
            config,
            event_loop,
            gate,
            registry: RefCell::new(CanvasRegistry::new()),
            guards: GuardFlags::new(),
            library,
            dom,
            next_controller: Cell::new(0),
            defaults_applied: Cell::new(false),
            defaults_subscription: RefCell::new(None),
        });

        let weak: Weak<PageContext> = Rc::downgrade(&ctx);
        let subscription = ctx.gate.subscribe(move |readiness| {
            if let Some(ctx) = weak.upgrade() {
                apply_defaults(&ctx, readiness);
            }
        });
        *ctx.defaults_subscription.borrow_mut() = Some(subscription);
        debug!(hard_cap = ?ctx.config.gate.hard_cap(), "page mounted");
        Self { ctx }
    }

    /// A controller for `canvas_id`, not yet started.
    #[must_use]
    pub fn controller(&self, canvas_id: impl Into<String>, spec: ChartSpec) -> LifecycleController {
        LifecycleController::new(self, canvas_id, spec)
    }

    /// Script `onload`.
    pub fn script_loaded(&self) {
        self.ctx.gate.notify_loaded();
    }

    /// Script `onerror`.
    pub fn script_failed(&self) {
        self.ctx.gate.notify_load_error();
    }

    /// Tear the page down: stop the poll and release leftover handles.
    pub fn unmount(&self) {
        self.ctx.gate.cancel();
        self.ctx.defaults_subscription.borrow_mut().take();
        let released = self.ctx.registry.borrow_mut().destroy_all();
        debug!(released, "page unmounted");
    }

    #[must_use]
    pub fn readiness(&self) -> Option<LibraryReadiness> {
        self.ctx.gate.outcome()
    }

    #[must_use]
    pub fn poll_state(&self) -> PollState {
        self.ctx.gate.state()
    }

    #[must_use]
    pub fn gate(&self) -> &ReadinessGate {
        &self.ctx.gate
    }

    #[must_use]
    pub fn event_loop(&self) -> &EventLoop {
        &self.ctx.event_loop
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.ctx.config
    }

    #[must_use]
    pub fn registry(&self) -> Ref<'_, CanvasRegistry> {
        self.ctx.registry.borrow()
    }

    #[must_use]
    pub fn guards(&self) -> &GuardFlags {
        &self.ctx.guards
    }

    #[must_use]
    pub fn defaults_applied(&self) -> bool {
        self.ctx.defaults_applied.get()
    }

    pub(crate) fn context(&self) -> &Rc<PageContext> {
        &self.ctx
    }
}

fn apply_defaults(ctx: &PageContext, readiness: LibraryReadiness) {
    ctx.defaults_subscription.borrow_mut().take();
    if !readiness.available || ctx.defaults_applied.get() {
        return;
    }
    match ctx.library.apply_defaults(&ctx.config.defaults) {
        Ok(()) => {
            ctx.defaults_applied.set(true);
            info!("chart defaults applied");
        }
        Err(err) => warn!(error = %err, "failed to apply chart defaults"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDom, FakeLibrary};
    use core::time::Duration;

    #[test]
    fn defaults_apply_once_after_readiness() {
        let library = FakeLibrary::new();
        let ev = EventLoop::new();
        let page = Page::mount(
            DashboardConfig::default(),
            ev.clone(),
            library.clone(),
            FakeDom::new(),
        );
        assert!(!page.defaults_applied());

        library.set_loaded(true);
        page.script_loaded();
        ev.drain_microtasks();
        page.script_loaded();
        ev.advance(Duration::from_secs(1));

        assert!(page.defaults_applied());
        assert_eq!(library.defaults_applied(), 1);
    }

    #[test]
    fn unmount_cancels_poll() {
        let ev = EventLoop::new();
        let page = Page::mount(
            DashboardConfig::default(),
            ev.clone(),
            FakeLibrary::new(),
            FakeDom::new(),
        );
        assert_eq!(ev.pending_timers(), 1);
        page.unmount();
        assert_eq!(page.poll_state(), PollState::Cancelled);
        assert!(ev.is_idle());
    }
}
