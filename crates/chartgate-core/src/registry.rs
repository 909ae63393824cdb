#![forbid(unsafe_code)]

//! Canvas registry: which live chart handle is drawn on which canvas node.
//!
//! Entries are keyed by node identity rather than element id, so a stale
//! canvas left behind by a tab switch and its freshly mounted replacement
//! never share a slot. Releasing by element id sweeps both.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::LifecycleError;
use crate::host::{CanvasNode, ChartHandle, HandleId, NodeKey};

/// One recorded registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOp {
    Destroy { canvas_id: String, released: usize },
    Set {
        canvas_id: String,
        handle: HandleId,
        node: NodeKey,
    },
}

impl RegistryOp {
    #[must_use]
    pub fn canvas_id(&self) -> &str {
        match self {
            Self::Destroy { canvas_id, .. } | Self::Set { canvas_id, .. } => canvas_id,
        }
    }
}

struct Entry {
    canvas_id: String,
    node: Rc<dyn CanvasNode>,
    handle: Box<dyn ChartHandle>,
}

/// Registry of live handles for one page.
#[derive(Default)]
pub struct CanvasRegistry {
    entries: BTreeMap<NodeKey, Entry>,
    ops: Vec<RegistryOp>,
}

impl fmt::Debug for CanvasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(key, entry)| (key, (&entry.canvas_id, entry.handle.id()))),
            )
            .finish()
    }
}

impl CanvasRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle drawn on the connected canvas with this id, if any.
    #[must_use]
    pub fn get(&self, canvas_id: &str) -> Option<HandleId> {
        self.entries
            .values()
            .find(|e| e.canvas_id == canvas_id && e.node.is_connected())
            .map(|e| e.handle.id())
    }

    /// Handle drawn on this exact node.
    #[must_use]
    pub fn get_by_node(&self, node: NodeKey) -> Option<HandleId> {
        self.entries.get(&node).map(|e| e.handle.id())
    }

    /// Record `handle` as drawn on `node`.
    ///
    /// Any entry still recorded under the same element id is released first.
    pub fn set(&mut self, node: Rc<dyn CanvasNode>, handle: Box<dyn ChartHandle>) {
        let canvas_id = node.canvas_id().to_string();
        if self.live_count(&canvas_id) > 0 {
            warn!(canvas_id = %canvas_id, "set over a live entry; releasing it first");
            self.destroy(&canvas_id);
        }
        let key = node.node_key();
        let handle_id = handle.id();
        debug!(canvas_id = %canvas_id, handle = handle_id, node = %key, "registry set");
        self.ops.push(RegistryOp::Set {
            canvas_id: canvas_id.clone(),
            handle: handle_id,
            node: key,
        });
        self.entries.insert(
            key,
            Entry {
                canvas_id,
                node,
                handle,
            },
        );
    }

    /// Release every handle recorded under `canvas_id`. Idempotent.
    ///
    /// Returns how many handles were released.
    pub fn destroy(&mut self, canvas_id: &str) -> usize {
        let keys: Vec<NodeKey> = self
            .entries
            .iter()
            .filter(|(_, e)| e.canvas_id == canvas_id)
            .map(|(k, _)| *k)
            .collect();
        let mut released = 0;
        for key in keys {
            if let Some(entry) = self.entries.remove(&key) {
                release(entry);
                released += 1;
            }
        }
        if released == 0 {
            debug!(canvas_id, "destroy on empty slot");
        }
        self.ops.push(RegistryOp::Destroy {
            canvas_id: canvas_id.to_string(),
            released,
        });
        released
    }

    /// Release everything. Used when the page goes away.
    pub fn destroy_all(&mut self) -> usize {
        let ids: Vec<String> = self
            .entries
            .values()
            .map(|e| e.canvas_id.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        ids.iter().map(|id| self.destroy(id)).sum()
    }

    /// Entries recorded under `canvas_id`, stale nodes included.
    #[must_use]
    pub fn live_count(&self, canvas_id: &str) -> usize {
        self.entries
            .values()
            .filter(|e| e.canvas_id == canvas_id)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Element ids with at least one entry, sorted.
    #[must_use]
    pub fn canvas_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.values().map(|e| e.canvas_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Every mutation so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[RegistryOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<RegistryOp> {
        std::mem::take(&mut self.ops)
    }
}

fn release(mut entry: Entry) {
    if !entry.node.is_connected() {
        let stale = LifecycleError::StaleHandleDestroy {
            canvas_id: entry.canvas_id.clone(),
        };
        debug!(node = %entry.node.node_key(), "{stale}");
    }
    if let Err(err) = entry.handle.destroy() {
        warn!(
            canvas_id = %entry.canvas_id,
            handle = entry.handle.id(),
            error = %err,
            "chart handle destroy failed"
        );
    }
}
