#![forbid(unsafe_code)]

//! In-memory rendering library and document for tests.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for integration tests and sibling crates.

use core::any::Any;
use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::chart_spec::ChartSpec;
use crate::config::{ChartDefaults, DashboardConfig};
use crate::error::LibraryError;
use crate::event_loop::EventLoop;
use crate::host::{CanvasLocator, CanvasNode, ChartHandle, ChartLibrary, HandleId, NodeKey};
use crate::page::Page;

/// Calls observed by [`FakeLibrary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryCall {
    ApplyDefaults,
    Construct {
        canvas_id: String,
        node: NodeKey,
        handle: HandleId,
    },
    Destroy {
        handle: HandleId,
    },
}

#[derive(Default)]
struct LibraryState {
    loaded: bool,
    next_handle: HandleId,
    live: BTreeMap<HandleId, String>,
    calls: Vec<LibraryCall>,
    fail_next_construct: Option<String>,
    fail_destroys: bool,
    defaults_applied: u32,
    last_spec: Option<ChartSpec>,
}

/// Rendering library double that tracks live instances.
#[derive(Default)]
pub struct FakeLibrary {
    state: Rc<RefCell<LibraryState>>,
}

impl FakeLibrary {
    /// A library whose global symbol is not present yet.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A library already present on the page.
    #[must_use]
    pub fn loaded() -> Rc<Self> {
        let library = Self::new();
        library.set_loaded(true);
        library
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.state.borrow_mut().loaded = loaded;
    }

    /// Make the next `construct` throw with `message`.
    pub fn fail_next_construct(&self, message: impl Into<String>) {
        self.state.borrow_mut().fail_next_construct = Some(message.into());
    }

    /// Make every handle `destroy` throw (the instance is still released).
    pub fn fail_destroys(&self, fail: bool) {
        self.state.borrow_mut().fail_destroys = fail;
    }

    /// Instances constructed and not yet destroyed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Live instances drawn on canvases with this id.
    #[must_use]
    pub fn live_for(&self, canvas_id: &str) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|id| id.as_str() == canvas_id)
            .count()
    }

    #[must_use]
    pub fn constructed_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, LibraryCall::Construct { .. }))
            .count()
    }

    #[must_use]
    pub fn defaults_applied(&self) -> u32 {
        self.state.borrow().defaults_applied
    }

    #[must_use]
    pub fn last_spec(&self) -> Option<ChartSpec> {
        self.state.borrow().last_spec.clone()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<LibraryCall> {
        self.state.borrow().calls.clone()
    }
}

impl ChartLibrary for FakeLibrary {
    fn is_available(&self) -> bool {
        self.state.borrow().loaded
    }

    fn apply_defaults(&self, _defaults: &ChartDefaults) -> Result<(), LibraryError> {
        let mut state = self.state.borrow_mut();
        if !state.loaded {
            return Err(LibraryError::NotLoaded);
        }
        state.defaults_applied += 1;
        state.calls.push(LibraryCall::ApplyDefaults);
        Ok(())
    }

    fn construct(
        &self,
        canvas: &dyn CanvasNode,
        spec: &ChartSpec,
    ) -> Result<Box<dyn ChartHandle>, LibraryError> {
        let mut state = self.state.borrow_mut();
        if !state.loaded {
            return Err(LibraryError::NotLoaded);
        }
        if !canvas.is_connected() {
            return Err(LibraryError::NoContext(canvas.canvas_id().to_string()));
        }
        if let Some(message) = state.fail_next_construct.take() {
            return Err(LibraryError::Construct(message));
        }
        state.next_handle += 1;
        let handle = state.next_handle;
        state.live.insert(handle, canvas.canvas_id().to_string());
        state.last_spec = Some(spec.clone());
        state.calls.push(LibraryCall::Construct {
            canvas_id: canvas.canvas_id().to_string(),
            node: canvas.node_key(),
            handle,
        });
        Ok(Box::new(FakeHandle {
            id: handle,
            library: self.state.clone(),
            destroyed: false,
        }))
    }
}

/// Instance handed out by [`FakeLibrary`].
pub struct FakeHandle {
    id: HandleId,
    library: Rc<RefCell<LibraryState>>,
    destroyed: bool,
}

impl ChartHandle for FakeHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn destroy(&mut self) -> Result<(), LibraryError> {
        if self.destroyed {
            return Err(LibraryError::AlreadyDestroyed);
        }
        self.destroyed = true;
        let mut state = self.library.borrow_mut();
        state.live.remove(&self.id);
        state.calls.push(LibraryCall::Destroy { handle: self.id });
        if state.fail_destroys {
            return Err(LibraryError::Destroy("canvas context lost".into()));
        }
        Ok(())
    }
}

/// A canvas in the [`FakeDom`].
#[derive(Debug)]
pub struct FakeCanvas {
    canvas_id: String,
    key: NodeKey,
    connected: Cell<bool>,
}

impl CanvasNode for FakeCanvas {
    fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    fn node_key(&self) -> NodeKey {
        self.key
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Document double. Replacing a canvas detaches the previous node.
#[derive(Default)]
pub struct FakeDom {
    canvases: RefCell<BTreeMap<String, Rc<FakeCanvas>>>,
    next_key: Cell<u64>,
    lookups: Cell<u64>,
}

impl FakeDom {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Mount a fresh canvas node under `canvas_id`.
    pub fn insert_canvas(&self, canvas_id: &str) -> NodeKey {
        let key = NodeKey(self.next_key.get() + 1);
        self.next_key.set(key.0);
        let node = Rc::new(FakeCanvas {
            canvas_id: canvas_id.to_string(),
            key,
            connected: Cell::new(true),
        });
        if let Some(old) = self.canvases.borrow_mut().insert(canvas_id.to_string(), node) {
            old.connected.set(false);
        }
        key
    }

    /// Unmount the canvas; the node stays alive but detached.
    pub fn remove_canvas(&self, canvas_id: &str) {
        if let Some(old) = self.canvases.borrow_mut().remove(canvas_id) {
            old.connected.set(false);
        }
    }

    #[must_use]
    pub fn node(&self, canvas_id: &str) -> Option<Rc<dyn CanvasNode>> {
        self.canvases
            .borrow()
            .get(canvas_id)
            .map(|n| n.clone() as Rc<dyn CanvasNode>)
    }

    /// `find_canvas` calls so far.
    #[must_use]
    pub fn lookups(&self) -> u64 {
        self.lookups.get()
    }
}

impl CanvasLocator for FakeDom {
    fn find_canvas(&self, canvas_id: &str) -> Option<Rc<dyn CanvasNode>> {
        self.lookups.set(self.lookups.get() + 1);
        self.node(canvas_id)
    }
}

/// A mounted page over fakes plus its event loop.
pub struct TestHarness {
    pub ev: EventLoop,
    pub library: Rc<FakeLibrary>,
    pub dom: Rc<FakeDom>,
    pub page: Page,
}

impl TestHarness {
    /// Default config; library not loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::default())
    }

    /// Default config; library present before the page mounts.
    #[must_use]
    pub fn loaded() -> Self {
        let library = FakeLibrary::loaded();
        Self::build(DashboardConfig::default(), library)
    }

    #[must_use]
    pub fn with_config(config: DashboardConfig) -> Self {
        Self::build(config, FakeLibrary::new())
    }

    fn build(config: DashboardConfig, library: Rc<FakeLibrary>) -> Self {
        let ev = EventLoop::new();
        let dom = FakeDom::new();
        let page = Page::mount(config, ev.clone(), library.clone(), dom.clone());
        Self {
            ev,
            library,
            dom,
            page,
        }
    }

    /// Advance the clock to `ms` since page mount.
    pub fn at_ms(&self, ms: u64) {
        self.ev.advance_to(Duration::from_millis(ms));
    }

    /// Load the library and fire the script `onload` hook.
    pub fn load_library(&self) {
        self.library.set_loaded(true);
        self.page.script_loaded();
        self.ev.drain_microtasks();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
