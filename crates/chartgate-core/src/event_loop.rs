#![forbid(unsafe_code)]

//! Host-driven cooperative event loop.
//!
//! [`EventLoop`] models the three suspension points a browser page offers
//! (microtasks, timers, animation frames) without threads, blocking or a wall
//! clock. The host owns the pump:
//!
//! 1. Advance time via [`EventLoop::advance`] / [`EventLoop::advance_to`];
//!    due timers fire in deadline order.
//! 2. Run one animation frame via [`EventLoop::run_animation_frame`].
//! 3. Microtasks are drained after every macrotask.
//!
//! Callbacks never run while the loop's own state is borrowed, so a callback
//! may schedule or cancel any other work, including on this loop.
//!
//! # Example
//!
//! ```
//! use chartgate_core::event_loop::EventLoop;
//! use core::time::Duration;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let ev = EventLoop::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! ev.set_timeout(Duration::from_millis(100), move || flag.set(true));
//!
//! ev.advance(Duration::from_millis(99));
//! assert!(!fired.get());
//! ev.advance(Duration::from_millis(1));
//! assert!(fired.get());
//! ```

use core::fmt;
use core::time::Duration;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

/// Identifier returned by [`EventLoop::set_timeout`].
pub type TimerId = u64;

/// Identifier returned by [`EventLoop::request_animation_frame`].
pub type FrameId = u64;

type Task = Box<dyn FnOnce()>;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Move forward to `t`. Never moves backwards.
    pub fn advance_to(&mut self, t: Duration) {
        if t > self.now {
            self.now = t;
        }
    }
}

#[derive(Default)]
struct LoopState {
    clock: DeterministicClock,
    next_id: u64,
    frame_idx: u64,
    microtasks: VecDeque<Task>,
    timers: BTreeMap<(Duration, TimerId), Task>,
    timer_deadlines: HashMap<TimerId, Duration>,
    frames: VecDeque<(FrameId, Task)>,
}

impl LoopState {
    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Cheaply clonable handle to one page's cooperative loop.
#[derive(Clone, Default)]
pub struct EventLoop {
    inner: Rc<RefCell<LoopState>>,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("EventLoop")
            .field("now", &state.clock.now())
            .field("frame_idx", &state.frame_idx)
            .field("microtasks", &state.microtasks.len())
            .field("timers", &state.timers.len())
            .field("frames", &state.frames.len())
            .finish()
    }
}

impl EventLoop {
    /// Create a loop with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current loop time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().clock.now()
    }

    /// Number of animation frames run so far.
    #[must_use]
    pub fn frame_idx(&self) -> u64 {
        self.inner.borrow().frame_idx
    }

    /// Queue `task` to run after the current macrotask.
    pub fn queue_microtask(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().microtasks.push_back(Box::new(task));
    }

    /// Run `task` once the clock reaches `now + delay`.
    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.inner.borrow_mut();
        let id = state.alloc_id();
        let deadline = state.clock.now().saturating_add(delay);
        state.timers.insert((deadline, id), Box::new(task));
        state.timer_deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut state = self.inner.borrow_mut();
        match state.timer_deadlines.remove(&id) {
            Some(deadline) => state.timers.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Run `task` on the next animation frame.
    pub fn request_animation_frame(&self, task: impl FnOnce() + 'static) -> FrameId {
        let mut state = self.inner.borrow_mut();
        let id = state.alloc_id();
        state.frames.push_back((id, Box::new(task)));
        id
    }

    /// Cancel a pending frame callback. Returns `false` if it already ran.
    pub fn cancel_animation_frame(&self, id: FrameId) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.frames.len();
        state.frames.retain(|(frame_id, _)| *frame_id != id);
        state.frames.len() != before
    }

    /// Run queued microtasks until none remain.
    pub fn drain_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.borrow_mut().microtasks.pop_front();
            let Some(task) = task else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// Advance the clock by `dt`, firing due timers. Returns timers fired.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now().saturating_add(dt);
        self.advance_to(target)
    }

    /// Advance the clock to `target`, firing every timer due on the way.
    ///
    /// Timers scheduled by a firing timer are honoured if they fall due before
    /// `target`.
    pub fn advance_to(&self, target: Duration) -> usize {
        self.drain_microtasks();
        let mut fired = 0;
        loop {
            let task = {
                let mut state = self.inner.borrow_mut();
                match state.timers.first_key_value() {
                    Some((&(deadline, _), _)) if deadline <= target => {}
                    _ => break,
                }
                let Some(((deadline, id), task)) = state.timers.pop_first() else {
                    break;
                };
                state.timer_deadlines.remove(&id);
                state.clock.advance_to(deadline);
                task
            };
            task();
            fired += 1;
            self.drain_microtasks();
        }
        self.inner.borrow_mut().clock.advance_to(target);
        fired
    }

    /// Run one animation frame.
    ///
    /// Only callbacks requested before the frame started run; callbacks
    /// requested from inside the frame wait for the next one.
    pub fn run_animation_frame(&self) -> usize {
        self.drain_microtasks();
        let cutoff = {
            let mut state = self.inner.borrow_mut();
            state.frame_idx += 1;
            state.next_id
        };
        let mut ran = 0;
        loop {
            let task = {
                let mut state = self.inner.borrow_mut();
                match state.frames.front() {
                    Some((id, _)) if *id <= cutoff => state.frames.pop_front().map(|(_, t)| t),
                    _ => None,
                }
            };
            let Some(task) = task else {
                break;
            };
            task();
            ran += 1;
            self.drain_microtasks();
        }
        ran
    }

    /// Run up to `max_frames` frames, stopping early once no frame is pending.
    pub fn run_frames(&self, max_frames: u32) -> u32 {
        let mut frames = 0;
        while frames < max_frames && self.pending_frames() > 0 {
            self.run_animation_frame();
            frames += 1;
        }
        frames
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    #[must_use]
    pub fn pending_microtasks(&self) -> usize {
        self.inner.borrow().microtasks.len()
    }

    /// True when nothing is scheduled.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let state = self.inner.borrow();
        state.microtasks.is_empty() && state.timers.is_empty() && state.frames.is_empty()
    }
}
