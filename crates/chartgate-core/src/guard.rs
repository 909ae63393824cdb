#![forbid(unsafe_code)]

//! Per-canvas initialization latches.
//!
//! A controller must hold the flag for a canvas id before it writes that id's
//! registry slot. The flag is released when the [`GuardToken`] drops, so every
//! exit path (success, construction error, unmount) lets go of it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

/// Identity of one lifecycle controller within a page.
pub type ControllerId = u64;

type Held = RefCell<BTreeMap<String, ControllerId>>;

/// The set of held flags for one page.
#[derive(Clone, Default)]
pub struct GuardFlags {
    held: Rc<Held>,
}

impl fmt::Debug for GuardFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.held.borrow().iter()).finish()
    }
}

impl GuardFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag for `canvas_id`, or `None` if any controller holds it.
    pub fn try_acquire(&self, canvas_id: &str, owner: ControllerId) -> Option<GuardToken> {
        let mut held = self.held.borrow_mut();
        if let Some(holder) = held.get(canvas_id) {
            debug!(canvas_id, owner, holder = *holder, "guard busy");
            return None;
        }
        held.insert(canvas_id.to_string(), owner);
        Some(GuardToken {
            flags: Rc::downgrade(&self.held),
            canvas_id: canvas_id.to_string(),
            owner,
        })
    }

    #[must_use]
    pub fn holder(&self, canvas_id: &str) -> Option<ControllerId> {
        self.held.borrow().get(canvas_id).copied()
    }

    #[must_use]
    pub fn is_held(&self, canvas_id: &str) -> bool {
        self.holder(canvas_id).is_some()
    }

    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.borrow().len()
    }
}

/// Scoped ownership of one flag.
#[must_use = "the flag is released as soon as the token drops"]
pub struct GuardToken {
    flags: Weak<Held>,
    canvas_id: String,
    owner: ControllerId,
}

impl GuardToken {
    #[must_use]
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    #[must_use]
    pub const fn owner(&self) -> ControllerId {
        self.owner
    }
}

impl fmt::Debug for GuardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardToken")
            .field("canvas_id", &self.canvas_id)
            .field("owner", &self.owner)
            .finish()
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        if let Some(held) = self.flags.upgrade() {
            let mut held = held.borrow_mut();
            if held.get(&self.canvas_id) == Some(&self.owner) {
                held.remove(&self.canvas_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let flags = GuardFlags::new();
        let token = flags.try_acquire("c", 1).expect("free");
        assert!(flags.try_acquire("c", 2).is_none());
        assert_eq!(flags.holder("c"), Some(1));

        drop(token);
        assert!(!flags.is_held("c"));
        assert!(flags.try_acquire("c", 2).is_some());
    }

    #[test]
    fn ids_are_independent() {
        let flags = GuardFlags::new();
        let _a = flags.try_acquire("a", 1).expect("free");
        let _b = flags.try_acquire("b", 1).expect("free");
        assert_eq!(flags.held_count(), 2);
    }

    #[test]
    fn token_outliving_flags_is_harmless() {
        let flags = GuardFlags::new();
        let token = flags.try_acquire("c", 1).expect("free");
        drop(flags);
        assert_eq!(token.owner(), 1);
        drop(token);
    }
}
