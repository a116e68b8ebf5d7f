use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::ticker::{TickCallback, Ticker, TickerProvider};

/// Start/stop/rebind wrapper around a single [`Ticker`].
///
/// The clock keeps its tick handler across rebinds, so the code reacting to
/// ticks never needs to know which frame source is currently driving it.
pub struct FrameClock {
    ticker: Option<Ticker>,
    on_tick: TickCallback,
}

impl FrameClock {
    /// Binds a new, inactive clock to `provider`.
    pub fn new(provider: &dyn TickerProvider, on_tick: TickCallback) -> Self {
        let ticker = provider.create_ticker(Rc::clone(&on_tick));
        Self {
            ticker: Some(ticker),
            on_tick,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_active)
    }

    pub fn is_disposed(&self) -> bool {
        self.ticker.is_none()
    }

    pub fn start(&mut self) {
        self.ticker_mut("start").start();
    }

    pub fn stop(&mut self, canceled: bool) {
        self.ticker_mut("stop").stop(canceled);
    }

    /// Moves the clock onto a ticker from `provider`.
    ///
    /// Running state and any frame already scheduled on the old source carry
    /// over; the old ticker is disposed.
    pub fn resync(&mut self, provider: &dyn TickerProvider) {
        let mut replacement = provider.create_ticker(Rc::clone(&self.on_tick));
        let old = self.ticker_mut("resync");
        replacement.absorb(old);
        old.dispose();
        debug!(
            from = old.id(),
            to = replacement.id(),
            active = replacement.is_active(),
            "frame clock resynced"
        );
        self.ticker = Some(replacement);
    }

    /// Releases the ticker. The clock cannot be used afterwards.
    pub fn dispose(&mut self) {
        let Some(mut ticker) = self.ticker.take() else {
            panic!("FrameClock disposed twice");
        };
        ticker.dispose();
    }

    fn ticker_mut(&mut self, operation: &str) -> &mut Ticker {
        match self.ticker.as_mut() {
            Some(ticker) => ticker,
            None => panic!("FrameClock::{operation} called after dispose"),
        }
    }
}

impl fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameClock")
            .field("ticker", &self.ticker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use super::*;
    use crate::scheduler::ManualFrameScheduler;

    fn clock_on(source: &Rc<ManualFrameScheduler>) -> (FrameClock, Rc<RefCell<Vec<Duration>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let clock = FrameClock::new(source, Rc::new(move |elapsed| sink.borrow_mut().push(elapsed)));
        (clock, seen)
    }

    #[test]
    fn start_and_stop_toggle_activity() {
        let source = Rc::new(ManualFrameScheduler::new());
        let (mut clock, seen) = clock_on(&source);
        assert!(!clock.is_active());
        clock.start();
        assert!(clock.is_active());
        source.pump(Duration::from_millis(5));
        clock.stop(true);
        assert!(!clock.is_active());
        source.pump(Duration::from_millis(21));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn resync_while_running_keeps_one_frame_in_flight() {
        let first = Rc::new(ManualFrameScheduler::new());
        let second = Rc::new(ManualFrameScheduler::new());
        let (mut clock, seen) = clock_on(&first);
        clock.start();
        first.pump(Duration::from_millis(0));
        first.pump(Duration::from_millis(16));

        clock.resync(&second);
        assert!(clock.is_active());
        assert_eq!(first.pending_count(), 0);
        assert_eq!(second.pending_count(), 1);

        assert_eq!(first.pump(Duration::from_millis(32)), 0);
        assert_eq!(second.pump(Duration::from_millis(100)), 1);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(second.pending_count(), 1);
    }

    #[test]
    fn resync_while_stopped_stays_stopped() {
        let first = Rc::new(ManualFrameScheduler::new());
        let second = Rc::new(ManualFrameScheduler::new());
        let (mut clock, seen) = clock_on(&first);
        clock.resync(&second);
        assert!(!clock.is_active());
        second.pump(Duration::from_millis(16));
        assert!(seen.borrow().is_empty());

        clock.start();
        assert_eq!(first.pending_count(), 0);
        assert_eq!(second.pending_count(), 1);
    }

    #[test]
    fn dispose_cancels_the_scheduled_frame() {
        let source = Rc::new(ManualFrameScheduler::new());
        let (mut clock, seen) = clock_on(&source);
        clock.start();
        clock.dispose();
        assert!(clock.is_disposed());
        assert!(!clock.is_active());
        assert_eq!(source.pending_count(), 0);
        source.pump(Duration::ZERO);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    #[should_panic(expected = "FrameClock::start called after dispose")]
    fn start_after_dispose_panics() {
        let source = Rc::new(ManualFrameScheduler::new());
        let (mut clock, _) = clock_on(&source);
        clock.dispose();
        clock.start();
    }

    #[test]
    #[should_panic(expected = "FrameClock::resync called after dispose")]
    fn resync_after_dispose_panics() {
        let source = Rc::new(ManualFrameScheduler::new());
        let (mut clock, _) = clock_on(&source);
        clock.dispose();
        clock.resync(&source);
    }

    #[test]
    #[should_panic(expected = "FrameClock disposed twice")]
    fn double_dispose_panics() {
        let source = Rc::new(ManualFrameScheduler::new());
        let (mut clock, _) = clock_on(&source);
        clock.dispose();
        clock.dispose();
    }
}
