#![forbid(unsafe_code)]

//! Readiness gate for the externally loaded rendering library.
//!
//! One gate exists per page. The first subscription starts a single shared,
//! cancellable poll driven by the page's [`EventLoop`]; every subscriber is
//! served from that one poll. The script `onload` hook can short-circuit the
//! poll through [`ReadinessGate::notify_loaded`].
//!
//! # Invariants
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Single resolution | the outcome is decided once and never changes |
//! | Exactly once | each live subscriber receives one [`LibraryReadiness`] |
//! | Ordered | delivery follows registration order |
//! | Asynchronous | callbacks never run inside `subscribe` |
//! | Cancellable | after [`ReadinessGate::cancel`] no callback runs |
//! | Bounded | the poll gives up after `max_poll_attempts` ticks |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GateConfig;
use crate::event_loop::{EventLoop, TimerId};
use crate::host::ChartLibrary;

/// How readiness was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessSource {
    /// The script load callback fired and the symbol was present.
    Callback,
    /// A poll check found the symbol.
    Poll,
    /// The poll gave up.
    Timeout,
}

/// Outcome delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LibraryReadiness {
    pub available: bool,
    pub source: ReadinessSource,
}

impl LibraryReadiness {
    const fn ready(source: ReadinessSource) -> Self {
        Self {
            available: true,
            source,
        }
    }

    const fn timed_out() -> Self {
        Self {
            available: false,
            source: ReadinessSource::Timeout,
        }
    }
}

/// State of the shared poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Nobody has subscribed yet.
    Idle,
    /// Probing; `attempts_left` ticks remain before giving up.
    Pending { attempts_left: u32 },
    /// The library is usable.
    Ready(ReadinessSource),
    /// The poll exhausted its attempts.
    Failed,
    /// The page went away before resolution.
    Cancelled,
}

impl PollState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed | Self::Cancelled)
    }
}

type SubscriberId = u64;
type Callback = Box<dyn FnOnce(LibraryReadiness)>;

struct GateInner {
    config: GateConfig,
    event_loop: EventLoop,
    library: Rc<dyn ChartLibrary>,
    state: PollState,
    outcome: Option<LibraryReadiness>,
    subscribers: Vec<(SubscriberId, Callback)>,
    next_subscriber: SubscriberId,
    timer: Option<TimerId>,
    flush_queued: bool,
}

/// Shared handle to a page's readiness gate.
#[derive(Clone)]
pub struct ReadinessGate {
    inner: Rc<RefCell<GateInner>>,
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReadinessGate")
            .field("state", &inner.state)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl ReadinessGate {
    #[must_use]
    pub fn new(config: GateConfig, event_loop: EventLoop, library: Rc<dyn ChartLibrary>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GateInner {
                config,
                event_loop,
                library,
                state: PollState::Idle,
                outcome: None,
                subscribers: Vec::new(),
                next_subscriber: 0,
                timer: None,
                flush_queued: false,
            })),
        }
    }

    /// Register `on_ready`; it runs once with the outcome, never synchronously.
    ///
    /// The first subscription checks the library: if the symbol is already
    /// present the gate resolves on the next microtask, otherwise the shared
    /// poll starts. A subscription joining a running poll checks too, so a
    /// library that loaded between ticks is seen immediately. After
    /// resolution, subscribers receive the stored outcome on the next microtask.
    pub fn subscribe(&self, on_ready: impl FnOnce(LibraryReadiness) + 'static) -> Unsubscribe {
        let (id, state) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == PollState::Cancelled {
                debug!("subscribe after cancel ignored");
                return Unsubscribe::inert();
            }
            inner.next_subscriber += 1;
            let id = inner.next_subscriber;
            inner.subscribers.push((id, Box::new(on_ready)));
            (id, inner.state)
        };

        match state {
            PollState::Idle | PollState::Pending { .. } => {
                let library = self.inner.borrow().library.clone();
                if library.is_available() {
                    self.resolve(LibraryReadiness::ready(ReadinessSource::Poll));
                } else if state == PollState::Idle {
                    self.start_poll();
                }
            }
            PollState::Ready(_) | PollState::Failed => self.schedule_flush(),
            PollState::Cancelled => {}
        }

        Unsubscribe {
            gate: Rc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Script `onload` hook.
    ///
    /// Resolves with source [`ReadinessSource::Callback`] if the check
    /// confirms the symbol; otherwise polling continues.
    pub fn notify_loaded(&self) {
        let (state, library) = {
            let inner = self.inner.borrow();
            (inner.state, inner.library.clone())
        };
        match state {
            PollState::Idle | PollState::Pending { .. } => {
                if library.is_available() {
                    self.resolve(LibraryReadiness::ready(ReadinessSource::Callback));
                } else {
                    warn!("library load callback fired but the global symbol is missing; still polling");
                    if state == PollState::Idle {
                        self.start_poll();
                    }
                }
            }
            _ => debug!(?state, "load callback after resolution ignored"),
        }
    }

    /// Script `onerror` hook. The poll keeps running until its cap.
    pub fn notify_load_error(&self) {
        let state = self.inner.borrow().state;
        warn!(?state, "library script failed to load");
        if state == PollState::Idle {
            self.start_poll();
        }
    }

    /// Stop polling and drop every pending subscriber.
    pub fn cancel(&self) {
        let dropped = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == PollState::Cancelled {
                return;
            }
            if let Some(timer) = inner.timer.take() {
                inner.event_loop.clear_timeout(timer);
            }
            inner.state = PollState::Cancelled;
            std::mem::take(&mut inner.subscribers)
        };
        debug!(dropped = dropped.len(), "readiness gate cancelled");
        drop(dropped);
    }

    #[must_use]
    pub fn state(&self) -> PollState {
        self.inner.borrow().state
    }

    /// The resolved outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<LibraryReadiness> {
        self.inner.borrow().outcome
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), PollState::Ready(_))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    #[must_use]
    pub fn config(&self) -> GateConfig {
        self.inner.borrow().config.clone()
    }

    fn start_poll(&self) {
        let attempts_left = {
            let mut inner = self.inner.borrow_mut();
            inner.state = PollState::Pending {
                attempts_left: inner.config.max_poll_attempts,
            };
            inner.config.max_poll_attempts
        };
        debug!(attempts_left, "readiness poll started");
        self.schedule_tick();
    }

    fn schedule_tick(&self) {
        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        let interval = inner.config.poll_interval();
        let timer = inner.event_loop.set_timeout(interval, move || {
            if let Some(inner) = weak.upgrade() {
                ReadinessGate { inner }.tick();
            }
        });
        inner.timer = Some(timer);
    }

    fn tick(&self) {
        let (attempts_left, library) = {
            let mut inner = self.inner.borrow_mut();
            inner.timer = None;
            match inner.state {
                PollState::Pending { attempts_left } => (attempts_left, inner.library.clone()),
                _ => return,
            }
        };

        if library.is_available() {
            self.resolve(LibraryReadiness::ready(ReadinessSource::Poll));
            return;
        }

        let attempts_left = attempts_left.saturating_sub(1);
        if attempts_left == 0 {
            let attempts = self.inner.borrow().config.max_poll_attempts;
            warn!(attempts, "rendering library unavailable; giving up");
            self.finish(PollState::Failed, LibraryReadiness::timed_out());
        } else {
            self.inner.borrow_mut().state = PollState::Pending { attempts_left };
            self.schedule_tick();
        }
    }

    fn resolve(&self, outcome: LibraryReadiness) {
        let attempts_left = match self.state() {
            PollState::Pending { attempts_left } => Some(attempts_left),
            _ => None,
        };
        info!(source = ?outcome.source, ?attempts_left, "rendering library ready");
        self.finish(PollState::Ready(outcome.source), outcome);
    }

    fn finish(&self, state: PollState, outcome: LibraryReadiness) {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(timer) = inner.timer.take() {
                inner.event_loop.clear_timeout(timer);
            }
            inner.state = state;
            inner.outcome = Some(outcome);
        }
        self.schedule_flush();
    }

    fn schedule_flush(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.flush_queued {
            return;
        }
        inner.flush_queued = true;
        let weak = Rc::downgrade(&self.inner);
        inner.event_loop.queue_microtask(move || {
            if let Some(inner) = weak.upgrade() {
                ReadinessGate { inner }.flush();
            }
        });
    }

    /// Deliver the outcome one subscriber at a time so that unsubscribes and
    /// cancels issued by a callback are honoured for the rest.
    fn flush(&self) {
        self.inner.borrow_mut().flush_queued = false;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                match inner.outcome {
                    Some(outcome) if inner.state != PollState::Cancelled => {
                        if inner.subscribers.is_empty() {
                            None
                        } else {
                            let (_, callback) = inner.subscribers.remove(0);
                            Some((callback, outcome))
                        }
                    }
                    _ => None,
                }
            };
            let Some((callback, outcome)) = next else {
                break;
            };
            callback(outcome);
        }
    }
}

/// Subscription guard returned by [`ReadinessGate::subscribe`].
///
/// Dropping it removes the subscriber if it has not been served yet.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct Unsubscribe {
    gate: Weak<RefCell<GateInner>>,
    id: Option<SubscriberId>,
}

impl Unsubscribe {
    fn inert() -> Self {
        Self {
            gate: Weak::new(),
            id: None,
        }
    }

    /// Explicitly unsubscribe.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(inner) = self.gate.upgrade() else {
            return;
        };
        let removed = {
            let mut inner = inner.borrow_mut();
            inner
                .subscribers
                .iter()
                .position(|(sid, _)| *sid == id)
                .map(|pos| inner.subscribers.remove(pos))
        };
        drop(removed);
    }
}
