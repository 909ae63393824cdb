#![forbid(unsafe_code)]

//! `chartgate-core` coordinates an externally loaded chart rendering library
//! with the mount / update / unmount cycle of dashboard panels.
//!
//! Design goals:
//! - **Host-driven**: script load notifications, timers, animation frames and
//!   time itself are pushed in by the embedding environment through
//!   [`event_loop::EventLoop`].
//! - **Destroy before create**: a canvas id never holds two live chart
//!   handles; every construction is preceded by a release of that id.
//! - **Contained failures**: a panel that cannot draw degrades to a
//!   placeholder and never blocks other panels.
//!
//! The pieces, leaves first:
//!
//! - [`readiness::ReadinessGate`] detects when the library global becomes usable.
//! - [`registry::CanvasRegistry`] maps canvases (by node identity) to live handles.
//! - [`guard::GuardFlags`] are the per-id initialization latches.
//! - [`controller::LifecycleController`] is the per-canvas state machine.
//! - [`page::Page`] bundles the shared pieces for one page lifetime.

pub mod chart_spec;
pub mod config;
pub mod controller;
pub mod error;
pub mod event_loop;
pub mod guard;
pub mod host;
pub mod page;
pub mod readiness;
pub mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use chart_spec::{ChartKind, ChartSpec, Dataset, ScaleSpec, TooltipSpec};
pub use config::{ChartDefaults, ControllerConfig, DashboardConfig, GateConfig};
pub use controller::{ControllerState, LifecycleController};
pub use error::{ConfigError, LibraryError, LifecycleError, SpecError};
pub use event_loop::EventLoop;
pub use host::{CanvasLocator, CanvasNode, ChartHandle, ChartLibrary, HandleId, NodeKey};
pub use page::Page;
pub use readiness::{LibraryReadiness, PollState, ReadinessGate, ReadinessSource, Unsubscribe};
pub use registry::{CanvasRegistry, RegistryOp};
