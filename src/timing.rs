//! Debounce and throttle wrappers over a pluggable timer.
//!
//! In the browser the timer is `gloo_timers::callback::Timeout`; tests
//! drive a virtual clock instead.

use gloo_timers::callback::Timeout;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Something that can run an action after a delay.
///
/// Dropping the returned handle cancels the action if it has not run yet.
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, action: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers via `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, action: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, action)
    }
}

/// Runs `action` with the most recent value once calls have been quiet
/// for `delay_ms`. Each call cancels the one pending before it.
pub struct Debouncer<T, S: Scheduler = GlooScheduler> {
    scheduler: S,
    delay_ms: u32,
    action: Rc<dyn Fn(T)>,
    pending: RefCell<Option<S::Handle>>,
    armed: Rc<Cell<bool>>,
}

impl<T: 'static, S: Scheduler> Debouncer<T, S> {
    pub fn new(scheduler: S, delay_ms: u32, action: impl Fn(T) + 'static) -> Self {
        Self {
            scheduler,
            delay_ms,
            action: Rc::new(action),
            pending: RefCell::new(None),
            armed: Rc::new(Cell::new(false)),
        }
    }

    pub fn call(&self, value: T) {
        // Dropping the old handle cancels it.
        self.pending.borrow_mut().take();

        let action = self.action.clone();
        let armed = self.armed.clone();
        armed.set(true);
        let handle = self.scheduler.schedule(
            self.delay_ms,
            Box::new(move || {
                armed.set(false);
                action(value);
            }),
        );
        *self.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
        self.armed.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.armed.get()
    }
}

/// Lets the first call through, then drops calls until `limit_ms` has passed.
pub struct Throttle<S: Scheduler = GlooScheduler> {
    scheduler: S,
    limit_ms: u32,
    blocked: Rc<Cell<bool>>,
    reset: RefCell<Option<S::Handle>>,
}

impl<S: Scheduler> Throttle<S> {
    pub fn new(scheduler: S, limit_ms: u32) -> Self {
        Self {
            scheduler,
            limit_ms,
            blocked: Rc::new(Cell::new(false)),
            reset: RefCell::new(None),
        }
    }

    /// Run `f` unless throttled. Returns whether it ran.
    pub fn call(&self, f: impl FnOnce()) -> bool {
        if self.blocked.get() {
            return false;
        }
        f();
        self.blocked.set(true);
        let blocked = self.blocked.clone();
        let handle = self
            .scheduler
            .schedule(self.limit_ms, Box::new(move || blocked.set(false)));
        *self.reset.borrow_mut() = Some(handle);
        true
    }
}
