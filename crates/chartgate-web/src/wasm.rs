#![forbid(unsafe_code)]

use core::any::Any;
use core::time::Duration;
use std::cell::Cell;
use std::rc::Rc;

use chartgate_core::chart_spec::ChartSpec;
use chartgate_core::config::{ChartDefaults, DashboardConfig};
use chartgate_core::error::LibraryError;
use chartgate_core::event_loop::EventLoop;
use chartgate_core::host::{
    CanvasLocator, CanvasNode, ChartHandle, ChartLibrary, HandleId, NodeKey,
};
use chartgate_core::page::Page;
use chartgate_panels::PanelSet;
use js_sys::{Array, Function, JSON, Object, Reflect};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;
use web_time::Instant;

use crate::callbacks::{self, Parsed, ValueAxis};
use crate::logging;

const CHART_GLOBAL: &str = "Chart";
/// Property stamped on canvas elements to tell nodes with the same id apart.
const NODE_KEY_PROP: &str = "__chartgateNodeKey";

type Callback = Closure<dyn Fn(JsValue) -> JsValue>;

fn js_message(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

/// `target[key]`, created as an empty object when missing.
fn child(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    let existing = get(target, key);
    if existing.is_object() {
        return Ok(existing);
    }
    let created: JsValue = Object::new().into();
    set(target, key, &created)?;
    Ok(created)
}

fn json_to_js(value: &serde_json::Value) -> Result<JsValue, JsValue> {
    JSON::parse(&value.to_string())
}

fn lines_to_js(lines: Vec<String>) -> JsValue {
    lines
        .into_iter()
        .map(JsValue::from)
        .collect::<Array>()
        .into()
}

fn chart_constructor() -> Option<Function> {
    let ctor = get(&js_sys::global(), CHART_GLOBAL);
    ctor.is_function().then(|| ctor.unchecked_into())
}

// ---------- Document ----------------------------------------------------------

struct DomCanvas {
    canvas_id: String,
    key: NodeKey,
    element: HtmlCanvasElement,
}

impl CanvasNode for DomCanvas {
    fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    fn node_key(&self) -> NodeKey {
        self.key
    }

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct DomLocator {
    next_key: Cell<u64>,
}

impl DomLocator {
    fn key_for(&self, element: &HtmlCanvasElement) -> NodeKey {
        if let Some(key) = get(element, NODE_KEY_PROP).as_f64() {
            return NodeKey(key as u64);
        }
        let key = self.next_key.get() + 1;
        self.next_key.set(key);
        if set(element, NODE_KEY_PROP, &JsValue::from_f64(key as f64)).is_err() {
            debug!(key, "could not stamp canvas node key");
        }
        NodeKey(key)
    }
}

impl CanvasLocator for DomLocator {
    fn find_canvas(&self, canvas_id: &str) -> Option<Rc<dyn CanvasNode>> {
        let element = web_sys::window()?
            .document()?
            .get_element_by_id(canvas_id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        let key = self.key_for(&element);
        Some(Rc::new(DomCanvas {
            canvas_id: canvas_id.to_string(),
            key,
            element,
        }))
    }
}

// ---------- Rendering library -------------------------------------------------

#[derive(Default)]
struct ChartJsLibrary {
    next_handle: Cell<HandleId>,
}

struct ChartJsHandle {
    id: HandleId,
    instance: JsValue,
    destroyed: bool,
    _callbacks: Vec<Callback>,
}

impl ChartHandle for ChartJsHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn destroy(&mut self) -> Result<(), LibraryError> {
        if self.destroyed {
            return Err(LibraryError::AlreadyDestroyed);
        }
        self.destroyed = true;
        let destroy = get(&self.instance, "destroy");
        let destroy: &Function = destroy
            .dyn_ref()
            .ok_or_else(|| LibraryError::Destroy("instance has no destroy()".into()))?;
        destroy
            .call0(&self.instance)
            .map(|_| ())
            .map_err(|e| LibraryError::Destroy(js_message(&e)))
    }
}

impl ChartLibrary for ChartJsLibrary {
    fn is_available(&self) -> bool {
        chart_constructor().is_some()
    }

    fn apply_defaults(&self, defaults: &ChartDefaults) -> Result<(), LibraryError> {
        let ctor = chart_constructor().ok_or(LibraryError::NotLoaded)?;
        let fail = |e: JsValue| LibraryError::Construct(js_message(&e));
        let root = get(&ctor, "defaults");
        if !root.is_object() {
            return Err(LibraryError::Construct("Chart.defaults missing".into()));
        }
        for (path, value) in defaults.assignments() {
            let Some((last, parents)) = path.split_last() else {
                continue;
            };
            let mut target = root.clone();
            for key in parents {
                target = child(&target, key).map_err(fail)?;
            }
            set(&target, last, &json_to_js(&value).map_err(fail)?).map_err(fail)?;
        }
        Ok(())
    }

    fn construct(
        &self,
        canvas: &dyn CanvasNode,
        spec: &ChartSpec,
    ) -> Result<Box<dyn ChartHandle>, LibraryError> {
        let ctor = chart_constructor().ok_or(LibraryError::NotLoaded)?;
        let no_context = || LibraryError::NoContext(canvas.canvas_id().to_string());
        let node = canvas
            .as_any()
            .downcast_ref::<DomCanvas>()
            .ok_or_else(no_context)?;
        let context = node
            .element
            .get_context("2d")
            .ok()
            .flatten()
            .ok_or_else(no_context)?;

        let fail = |e: JsValue| LibraryError::Construct(js_message(&e));
        let config = json_to_js(&spec.to_json()).map_err(fail)?;
        let callbacks = install_callbacks(&config, spec).map_err(fail)?;
        let args = Array::of2(&context.into(), &config);
        let instance = Reflect::construct(&ctor, &args).map_err(fail)?;

        let id = self.next_handle.get() + 1;
        self.next_handle.set(id);
        Ok(Box::new(ChartJsHandle {
            id,
            instance,
            destroyed: false,
            _callbacks: callbacks,
        }))
    }
}

fn parsed(ctx: &JsValue) -> Parsed {
    let parsed = get(ctx, "parsed");
    match parsed.as_f64() {
        Some(v) => Parsed::Scalar(v),
        None => Parsed::Point {
            x: get(&parsed, "x").as_f64().unwrap_or(f64::NAN),
            y: get(&parsed, "y").as_f64().unwrap_or(f64::NAN),
        },
    }
}

fn index(ctx: &JsValue, key: &str) -> usize {
    get(ctx, key).as_f64().map_or(0, |v| v as usize)
}

/// Turn the declarative tooltip text and tick suffixes into library callbacks.
///
/// The returned closures must outlive the chart instance.
fn install_callbacks(config: &JsValue, spec: &ChartSpec) -> Result<Vec<Callback>, JsValue> {
    let mut installed = Vec::new();
    let options = child(config, "options")?;

    let text = Rc::new(spec.options.plugins.tooltip.text.clone());
    let tooltip = child(&child(&options, "plugins")?, "tooltip")?;
    Reflect::delete_property(tooltip.unchecked_ref::<Object>(), &JsValue::from_str("chartgate"))?;
    let hooks = child(&tooltip, "callbacks")?;
    let mut hook = |name: &str, f: Box<dyn Fn(JsValue) -> JsValue>| -> Result<(), JsValue> {
        let closure = Closure::wrap(f);
        set(&hooks, name, closure.as_ref())?;
        installed.push(closure);
        Ok(())
    };

    if callbacks::needs_title(&text) {
        let text = text.clone();
        hook(
            "title",
            Box::new(move |items: JsValue| {
                let first = Array::from(&items).get(0);
                let label = get(&first, "label").as_string().unwrap_or_default();
                callbacks::title(&text, index(&first, "dataIndex"), &label).into()
            }),
        )?;
    }
    if !text.value_suffixes.is_empty() {
        let text = text.clone();
        let axis = ValueAxis::for_spec(spec);
        hook(
            "label",
            Box::new(move |ctx: JsValue| {
                let dataset_label = get(&get(&ctx, "dataset"), "label")
                    .as_string()
                    .unwrap_or_default();
                let value = callbacks::value_text(parsed(&ctx), axis);
                callbacks::label(&text, index(&ctx, "datasetIndex"), &dataset_label, &value)
                    .into()
            }),
        )?;
    }
    if !text.extra_lines.is_empty() {
        let text = text.clone();
        hook(
            "afterLabel",
            Box::new(move |ctx: JsValue| {
                lines_to_js(callbacks::after_label(&text, index(&ctx, "dataIndex")))
            }),
        )?;
    }
    if !text.footer.is_empty() {
        let text = text.clone();
        hook(
            "footer",
            Box::new(move |_items: JsValue| lines_to_js(text.footer.clone())),
        )?;
    }

    let scales = get(&options, "scales");
    for (axis_id, scale) in &spec.options.scales {
        let Some(suffix) = scale.ticks.suffix.clone() else {
            continue;
        };
        let ticks = child(&child(&scales, axis_id)?, "ticks")?;
        Reflect::delete_property(ticks.unchecked_ref::<Object>(), &JsValue::from_str("chartgateSuffix"))?;
        let closure: Callback = Closure::wrap(Box::new(move |value: JsValue| {
            callbacks::tick(value.as_f64().unwrap_or(f64::NAN), &suffix).into()
        }));
        set(&ticks, "callback", closure.as_ref())?;
        installed.push(closure);
    }
    Ok(installed)
}

// ---------- Host surface ------------------------------------------------------

fn to_json_string(value: &impl Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_data(data: Option<String>) -> Result<Option<serde_json::Value>, JsValue> {
    data.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// One dashboard page in the browser.
///
/// All views and summaries cross the boundary as JSON strings.
#[wasm_bindgen]
pub struct DashboardHost {
    origin: Instant,
    ev: EventLoop,
    page: Page,
    panels: PanelSet,
}

#[wasm_bindgen]
impl DashboardHost {
    /// Mount a page. `config` is optional `DashboardConfig` JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<DashboardHost, JsValue> {
        let config = match config {
            Some(json) => DashboardConfig::from_json_str(&json)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => DashboardConfig::default(),
        };
        let ev = EventLoop::new();
        let page = Page::mount(
            config,
            ev.clone(),
            Rc::new(ChartJsLibrary::default()),
            Rc::new(DomLocator::default()),
        );
        Ok(Self {
            origin: Instant::now(),
            ev,
            panels: PanelSet::new(page.clone()),
            page,
        })
    }

    /// Route `tracing` output to the console, e.g. `"chartgate_core=debug,info"`.
    #[wasm_bindgen(js_name = initLogging)]
    pub fn init_logging(directives: &str) -> Result<(), JsValue> {
        logging::init(directives).map_err(|e| JsValue::from_str(&e))
    }

    /// Script `onload` for the rendering library.
    #[wasm_bindgen(js_name = scriptLoaded)]
    pub fn script_loaded(&self) {
        self.page.script_loaded();
        self.tick();
    }

    /// Script `onerror` for the rendering library.
    #[wasm_bindgen(js_name = scriptFailed)]
    pub fn script_failed(&self) {
        warn!("rendering library script failed to load");
        self.page.script_failed();
        self.tick();
    }

    /// Fire due timers and drain microtasks.
    pub fn tick(&self) {
        let now: Duration = self.origin.elapsed();
        self.ev.advance_to(now);
        self.ev.drain_microtasks();
    }

    /// Call once per browser animation frame, after the host has committed
    /// its DOM changes.
    #[wasm_bindgen(js_name = animationFrame)]
    pub fn animation_frame(&self) {
        self.tick();
        self.ev.run_animation_frame();
    }

    /// Mount a panel by kind; `data` is optional panel JSON. Returns the view.
    #[wasm_bindgen(js_name = mountPanel)]
    pub fn mount_panel(&mut self, kind: &str, data: Option<String>) -> Result<String, JsValue> {
        let view = self
            .panels
            .mount(kind, parse_data(data)?)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.tick();
        to_json_string(&view)
    }

    /// Apply new panel data. Returns the update summary.
    #[wasm_bindgen(js_name = updatePanel)]
    pub fn update_panel(&mut self, kind: &str, data: String) -> Result<String, JsValue> {
        let data = parse_data(Some(data))?.unwrap_or_default();
        let summary = self
            .panels
            .update(kind, data)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json_string(&summary)
    }

    #[wasm_bindgen(js_name = unmountPanel)]
    pub fn unmount_panel(&mut self, kind: &str) -> Result<(), JsValue> {
        self.panels
            .unmount(kind)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// View of one mounted panel as JSON.
    pub fn view(&self, kind: &str) -> Result<String, JsValue> {
        let view = self
            .panels
            .view(kind)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json_string(&view)
    }

    /// Re-arm parked canvases, e.g. on `visibilitychange`.
    pub fn retry(&self) {
        self.panels.retry_all();
    }

    /// Gate state for diagnostics: `idle`, `pending`, `ready`, `failed` or `cancelled`.
    #[wasm_bindgen(js_name = libraryState)]
    pub fn library_state(&self) -> String {
        use chartgate_core::readiness::PollState;
        match self.page.poll_state() {
            PollState::Idle => "idle",
            PollState::Pending { .. } => "pending",
            PollState::Ready(_) => "ready",
            PollState::Failed => "failed",
            PollState::Cancelled => "cancelled",
        }
        .to_string()
    }

    /// Tear the page down: every panel, the poll and any leftover chart.
    pub fn destroy(&mut self) {
        self.panels.unmount_all();
        self.page.unmount();
        debug!("dashboard host destroyed");
    }
}
