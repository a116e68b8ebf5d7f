use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::scheduler::{FrameCallbackId, FrameScheduler};

/// Receives the duration elapsed since the ticker was started, once per frame.
pub type TickCallback = Rc<dyn Fn(Duration)>;

/// Capability to create tickers bound to some frame source.
pub trait TickerProvider {
    fn create_ticker(&self, on_tick: TickCallback) -> Ticker;
}

impl<S: FrameScheduler + 'static> TickerProvider for Rc<S> {
    fn create_ticker(&self, on_tick: TickCallback) -> Ticker {
        let scheduler: Rc<dyn FrameScheduler> = self.clone();
        Ticker::new(scheduler, on_tick)
    }
}

impl TickerProvider for Rc<dyn FrameScheduler> {
    fn create_ticker(&self, on_tick: TickCallback) -> Ticker {
        Ticker::new(Rc::clone(self), on_tick)
    }
}

static NEXT_TICKER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct TickerState {
    active: bool,
    disposed: bool,
    /// Timestamp of the first frame delivered since the last start or absorb.
    start_time: Option<Duration>,
    /// Elapsed time inherited from an absorbed ticker.
    carried: Duration,
    last_elapsed: Duration,
    pending: Option<FrameCallbackId>,
}

struct TickerShared {
    id: u64,
    scheduler: Rc<dyn FrameScheduler>,
    on_tick: TickCallback,
    state: RefCell<TickerState>,
}

/// Per-frame callback subscription on a single [`FrameScheduler`].
///
/// While active, the ticker keeps exactly one frame callback scheduled and
/// forwards the elapsed time to its `on_tick` callback. The first frame after
/// `start` defines the zero point, so the first delivered value is the
/// carried-over elapsed time (zero for a fresh start) and later values never
/// decrease.
pub struct Ticker {
    shared: Rc<TickerShared>,
}

impl Ticker {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, on_tick: TickCallback) -> Self {
        Self {
            shared: Rc::new(TickerShared {
                id: NEXT_TICKER_ID.fetch_add(1, Ordering::Relaxed),
                scheduler,
                on_tick,
                state: RefCell::new(TickerState::default()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn is_active(&self) -> bool {
        self.shared.state.borrow().active
    }

    /// True while a frame callback is scheduled on the frame source.
    pub fn is_ticking(&self) -> bool {
        self.shared.state.borrow().pending.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.state.borrow().disposed
    }

    /// Begins delivering ticks. Starting an active ticker does nothing.
    pub fn start(&mut self) {
        {
            let mut state = self.shared.state.borrow_mut();
            assert!(!state.disposed, "Ticker#{} started after dispose", self.shared.id);
            if state.active {
                debug!(ticker = self.shared.id, "start ignored; ticker already active");
                return;
            }
            state.active = true;
            state.start_time = None;
            state.carried = Duration::ZERO;
            state.last_elapsed = Duration::ZERO;
        }
        schedule_tick(&self.shared);
    }

    /// Stops delivering ticks and cancels the scheduled frame callback.
    ///
    /// `canceled` distinguishes an explicit cancellation from a natural
    /// completion; it is reported but does not change what happens.
    pub fn stop(&mut self, canceled: bool) {
        let pending = {
            let mut state = self.shared.state.borrow_mut();
            assert!(!state.disposed, "Ticker#{} stopped after dispose", self.shared.id);
            if !state.active {
                return;
            }
            state.active = false;
            state.start_time = None;
            state.carried = Duration::ZERO;
            state.pending.take()
        };
        if let Some(id) = pending {
            self.shared.scheduler.cancel_frame(id);
        }
        debug!(ticker = self.shared.id, canceled, "ticker stopped");
    }

    /// Takes over the running state of `other`, which must be inactive afterwards.
    ///
    /// A frame callback already scheduled by `other` is cancelled on its frame
    /// source and rescheduled on this ticker's source, so exactly one callback
    /// stays in flight across the swap. Elapsed time continues from the last
    /// value `other` delivered, even when the two sources use different epochs.
    /// Wall time between `other`'s last frame and this ticker's first frame is
    /// not counted, so that first tick repeats the carried elapsed value.
    ///
    /// # Panics
    ///
    /// Panics if either ticker is disposed or if this ticker is already active.
    pub fn absorb(&mut self, other: &mut Ticker) {
        {
            let state = self.shared.state.borrow();
            assert!(!state.disposed, "Ticker#{} absorbed after dispose", self.shared.id);
            assert!(
                !state.active,
                "Ticker#{} cannot absorb while active",
                self.shared.id
            );
        }
        let (active, carried, pending) = {
            let mut theirs = other.shared.state.borrow_mut();
            assert!(
                !theirs.disposed,
                "Ticker#{} absorbed a disposed ticker #{}",
                self.shared.id,
                other.shared.id
            );
            let carried = if theirs.start_time.is_some() {
                theirs.last_elapsed
            } else {
                theirs.carried
            };
            let taken = (theirs.active, carried, theirs.pending.take());
            theirs.active = false;
            theirs.start_time = None;
            theirs.carried = Duration::ZERO;
            taken
        };
        if let Some(id) = pending {
            other.shared.scheduler.cancel_frame(id);
        }
        {
            let mut state = self.shared.state.borrow_mut();
            state.active = active;
            state.start_time = None;
            state.carried = carried;
            state.last_elapsed = carried;
        }
        debug!(
            ticker = self.shared.id,
            from = other.shared.id,
            active,
            had_pending = pending.is_some(),
            carried_us = carried.as_micros() as u64,
            "ticker absorbed"
        );
        if active {
            schedule_tick(&self.shared);
        }
    }

    /// Releases the frame source. Every later operation panics.
    pub fn dispose(&mut self) {
        let pending = {
            let mut state = self.shared.state.borrow_mut();
            assert!(!state.disposed, "Ticker#{} disposed twice", self.shared.id);
            state.disposed = true;
            state.active = false;
            state.pending.take()
        };
        if let Some(id) = pending {
            self.shared.scheduler.cancel_frame(id);
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let pending = self.shared.state.borrow_mut().pending.take();
        if let Some(id) = pending {
            self.shared.scheduler.cancel_frame(id);
        }
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Ticker")
            .field("id", &self.shared.id)
            .field("active", &state.active)
            .field("ticking", &state.pending.is_some())
            .field("disposed", &state.disposed)
            .finish()
    }
}

fn schedule_tick(shared: &Rc<TickerShared>) {
    let weak = Rc::downgrade(shared);
    let id = shared.scheduler.schedule_frame(Box::new(move |timestamp| {
        if let Some(shared) = weak.upgrade() {
            on_frame(&shared, timestamp);
        }
    }));
    shared.state.borrow_mut().pending = Some(id);
}

fn on_frame(shared: &Rc<TickerShared>, timestamp: Duration) {
    let elapsed = {
        let mut state = shared.state.borrow_mut();
        state.pending = None;
        if !state.active || state.disposed {
            return;
        }
        let start = *state.start_time.get_or_insert(timestamp);
        let Some(since_start) = timestamp.checked_sub(start) else {
            panic!(
                "Ticker#{} received frame timestamp {timestamp:?} before its start {start:?}",
                shared.id
            );
        };
        let elapsed = state.carried + since_start;
        state.last_elapsed = elapsed;
        elapsed
    };

    (shared.on_tick)(elapsed);

    // The callback may have stopped, restarted or disposed this ticker.
    let reschedule = {
        let state = shared.state.borrow();
        state.active && !state.disposed && state.pending.is_none()
    };
    if reschedule {
        schedule_tick(shared);
    }
}
