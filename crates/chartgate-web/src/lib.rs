#![forbid(unsafe_code)]

//! Browser binding for chartgate.
//!
//! The rendering library is the global `Chart` constructor
//! (`new Chart(ctx, config)` / `chart.destroy()`), canvases are located with
//! `document.getElementById`, and the page's [`EventLoop`] is pumped from the
//! host's `requestAnimationFrame` loop with `web-time` as the clock.
//!
//! JS usage:
//!
//! ```text
//! const host = new DashboardHost(configJson);
//! script.onload = () => host.scriptLoaded();
//! script.onerror = () => host.scriptFailed();
//! const loop = () => { host.animationFrame(); requestAnimationFrame(loop); };
//! requestAnimationFrame(loop);
//! render(JSON.parse(host.mountPanel("sla")));
//! ```
//!
//! [`EventLoop`]: chartgate_core::event_loop::EventLoop

pub mod callbacks;

#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::DashboardHost;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct DashboardHost;

#[cfg(not(target_arch = "wasm32"))]
impl DashboardHost {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_stub_builds_without_browser_stack() {
        let host = DashboardHost::new();
        assert_eq!(format!("{host:?}"), "DashboardHost");
        assert_eq!(callbacks::tick(12.0, "%"), "12%");
    }
}
