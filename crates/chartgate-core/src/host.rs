#![forbid(unsafe_code)]

//! Boundaries to the rendering library and the document.
//!
//! The core never touches a global or a DOM node directly. Everything goes
//! through these traits, so any library with the shape
//! `new Library(context2d, spec) -> handle` / `handle.destroy()` can be
//! substituted, and tests can run without a browser.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use crate::chart_spec::ChartSpec;
use crate::config::ChartDefaults;
use crate::error::LibraryError;

/// Identity of one live chart instance, unique for the page lifetime.
pub type HandleId = u64;

/// Identity of one canvas node.
///
/// Two nodes that carry the same element id (an old canvas still being
/// reconciled away and its replacement) have different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(pub u64);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A canvas element in the document.
pub trait CanvasNode {
    /// The element id the canvas was located by.
    fn canvas_id(&self) -> &str;

    /// Identity of this particular node.
    fn node_key(&self) -> NodeKey;

    /// Whether the node is still attached to the document.
    fn is_connected(&self) -> bool;

    /// Access to the concrete node for library implementations.
    fn as_any(&self) -> &dyn Any;
}

/// Locates canvases by element id in the currently mounted tree.
pub trait CanvasLocator {
    fn find_canvas(&self, canvas_id: &str) -> Option<Rc<dyn CanvasNode>>;
}

/// A live rendering-library instance drawn on one canvas.
pub trait ChartHandle {
    fn id(&self) -> HandleId;

    /// Release the instance and its canvas resources.
    fn destroy(&mut self) -> Result<(), LibraryError>;
}

/// The globally loaded rendering library.
pub trait ChartLibrary {
    /// Whether the library's global entry point is present.
    fn is_available(&self) -> bool;

    /// Apply library-wide defaults. Called once per page after readiness.
    fn apply_defaults(&self, defaults: &ChartDefaults) -> Result<(), LibraryError>;

    /// Build an instance on `canvas` from `spec`.
    fn construct(
        &self,
        canvas: &dyn CanvasNode,
        spec: &ChartSpec,
    ) -> Result<Box<dyn ChartHandle>, LibraryError>;
}
