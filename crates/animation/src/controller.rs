use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use frameclock::{FrameClock, TickCallback, TickerProvider, MICROSECONDS_PER_SECOND};
use tracing::{debug, trace};

use crate::observers::{Listener, ListenerId, ObserverList};

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Diagnostic identity of a controller, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GradientAnimationController#{}", self.0)
    }
}

struct ControllerState {
    clock: Option<FrameClock>,
    last_elapsed: Option<Duration>,
}

struct ControllerInner {
    id: ControllerId,
    state: RefCell<ControllerState>,
    listeners: ObserverList,
}

impl ControllerInner {
    fn handle_tick(&self, elapsed: Duration) {
        {
            let mut state = self.state.borrow_mut();
            assert!(
                state.clock.is_some(),
                "{} received a tick after dispose",
                self.id
            );
            state.last_elapsed = Some(elapsed);
        }
        trace!(
            controller = %self.id,
            elapsed_us = elapsed.as_micros() as u64,
            listeners = self.listeners.len(),
            "tick"
        );
        self.listeners.notify();
    }
}

/// Open-ended animation driver for a mesh gradient.
///
/// The controller turns frame ticks into change notifications. Cloning yields
/// another handle to the same controller, which is how one controller is
/// shared between several hosts; [`ptr_eq`](Self::ptr_eq) compares identity.
///
/// Exactly one party is responsible for calling [`dispose`](Self::dispose).
/// Every lifecycle operation after disposal panics.
#[derive(Clone)]
pub struct GradientAnimationController {
    inner: Rc<ControllerInner>,
}

impl GradientAnimationController {
    /// Creates a stopped controller driven by a ticker from `provider`.
    pub fn new(provider: &dyn TickerProvider) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<ControllerInner>| {
            let weak = weak.clone();
            let on_tick: TickCallback = Rc::new(move |elapsed| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_tick(elapsed);
                }
            });
            ControllerInner {
                id: ControllerId(NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed)),
                state: RefCell::new(ControllerState {
                    clock: Some(FrameClock::new(provider, on_tick)),
                    last_elapsed: None,
                }),
                listeners: ObserverList::new(),
            }
        });
        debug!(controller = %inner.id, "controller created");
        Self { inner }
    }

    pub fn id(&self) -> ControllerId {
        self.inner.id
    }

    /// True when both handles refer to the same controller.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_animating(&self) -> bool {
        self.inner
            .state
            .borrow()
            .clock
            .as_ref()
            .is_some_and(FrameClock::is_active)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.borrow().clock.is_none()
    }

    /// Elapsed time reported by the latest tick; `None` unless animating.
    pub fn last_elapsed_duration(&self) -> Option<Duration> {
        self.inner.state.borrow().last_elapsed
    }

    /// [`last_elapsed_duration`](Self::last_elapsed_duration) in fractional seconds.
    pub fn last_elapsed_seconds(&self) -> Option<f64> {
        self.last_elapsed_duration()
            .map(|elapsed| elapsed.as_micros() as f64 / MICROSECONDS_PER_SECOND as f64)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Moves the controller onto a new frame source. Listeners and running
    /// state are unchanged.
    pub fn resync(&self, provider: &dyn TickerProvider) {
        self.with_clock("resync", |clock| clock.resync(provider));
        debug!(controller = %self.inner.id, "controller resynced");
    }

    pub fn start(&self) {
        self.with_clock("start", FrameClock::start);
        debug!(controller = %self.inner.id, "controller started");
    }

    /// Stops as a cancellation; see [`stop_with`](Self::stop_with).
    pub fn stop(&self) {
        self.stop_with(true);
    }

    /// Stops ticking and forgets the last elapsed duration.
    ///
    /// The animation never completes on its own, so `canceled` is only
    /// forwarded to the ticker and reported.
    pub fn stop_with(&self, canceled: bool) {
        self.with_clock("stop", |clock| clock.stop(canceled));
        self.inner.state.borrow_mut().last_elapsed = None;
        debug!(controller = %self.inner.id, canceled, "controller stopped");
    }

    /// Releases the frame source and drops every listener.
    ///
    /// # Panics
    ///
    /// Panics when the controller has already been disposed.
    pub fn dispose(&self) {
        let clock = self.inner.state.borrow_mut().clock.take();
        let Some(mut clock) = clock else {
            panic!("{} disposed twice", self.inner.id);
        };
        clock.dispose();
        self.inner.state.borrow_mut().last_elapsed = None;
        self.inner.listeners.clear();
        debug!(controller = %self.inner.id, "controller disposed");
    }

    /// Registers `listener` to run after every tick.
    ///
    /// # Panics
    ///
    /// Panics when the controller has been disposed.
    pub fn add_listener(&self, listener: Listener) -> ListenerId {
        assert!(
            !self.is_disposed(),
            "{}::add_listener called after dispose",
            self.inner.id
        );
        self.inner.listeners.add(listener)
    }

    /// Unregisters a listener. Returns `false` if it was not registered, which
    /// includes every listener of a disposed controller.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    fn with_clock<R>(&self, operation: &str, f: impl FnOnce(&mut FrameClock) -> R) -> R {
        let mut state = self.inner.state.borrow_mut();
        match state.clock.as_mut() {
            Some(clock) => f(clock),
            None => panic!("{}::{operation} called after dispose", self.inner.id),
        }
    }
}

impl fmt::Debug for GradientAnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("GradientAnimationController")
            .field("id", &self.inner.id)
            .field("animating", &state.clock.as_ref().is_some_and(FrameClock::is_active))
            .field("disposed", &state.clock.is_none())
            .field("last_elapsed", &state.last_elapsed)
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}
