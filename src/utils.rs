use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::Viewport;
use crate::runtime::{EventLoop, TimerId};

pub const MOBILE_BREAKPOINT: f64 = 768.0;

/// Debounced wrapper; see [`debounce`].
pub struct Debounced<A> {
    inner: Rc<DebounceInner<A>>,
}

struct DebounceInner<A> {
    func: RefCell<Box<dyn FnMut(A)>>,
    wait_ms: u32,
    event_loop: Rc<dyn EventLoop>,
    pending: Cell<Option<TimerId>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: 'static> Debounced<A> {
    pub fn call(&self, args: A) {
        if let Some(id) = self.inner.pending.take() {
            self.inner.event_loop.clear_timeout(id);
        }
        let inner = Rc::clone(&self.inner);
        let id = self.inner.event_loop.set_timeout(
            self.inner.wait_ms,
            Box::new(move || {
                inner.pending.set(None);
                (inner.func.borrow_mut())(args);
            }),
        );
        self.inner.pending.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

/// Runs `func` `wait_ms` after the last call, with that call's arguments.
pub fn debounce<A: 'static>(
    event_loop: Rc<dyn EventLoop>,
    wait_ms: u32,
    func: impl FnMut(A) + 'static,
) -> Debounced<A> {
    Debounced {
        inner: Rc::new(DebounceInner {
            func: RefCell::new(Box::new(func)),
            wait_ms,
            event_loop,
            pending: Cell::new(None),
        }),
    }
}

/// Throttled wrapper; see [`throttle`].
pub struct Throttled<A> {
    inner: Rc<ThrottleInner<A>>,
}

struct ThrottleInner<A> {
    func: RefCell<Box<dyn FnMut(A)>>,
    limit_ms: u32,
    event_loop: Rc<dyn EventLoop>,
    in_window: Cell<bool>,
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: 'static> Throttled<A> {
    /// Returns whether `func` ran.
    pub fn call(&self, args: A) -> bool {
        if self.inner.in_window.get() {
            return false;
        }
        // Close the window before running so a re-entrant call is dropped.
        self.inner.in_window.set(true);
        let inner = Rc::clone(&self.inner);
        self.inner.event_loop.set_timeout(
            self.inner.limit_ms,
            Box::new(move || inner.in_window.set(false)),
        );
        (self.inner.func.borrow_mut())(args);
        true
    }
}

/// Leading-edge throttle: the first call of each `limit_ms` window runs
/// immediately and the rest of the window is dropped.
pub fn throttle<A: 'static>(
    event_loop: Rc<dyn EventLoop>,
    limit_ms: u32,
    func: impl FnMut(A) + 'static,
) -> Throttled<A> {
    Throttled {
        inner: Rc::new(ThrottleInner {
            func: RefCell::new(Box::new(func)),
            limit_ms,
            event_loop,
            in_window: Cell::new(false),
        }),
    }
}

pub fn is_mobile(viewport: &dyn Viewport) -> bool {
    viewport.inner_width() <= MOBILE_BREAKPOINT
}

pub fn is_touch_device(viewport: &dyn Viewport) -> bool {
    viewport.has_touch_start() || viewport.max_touch_points() > 0
}
