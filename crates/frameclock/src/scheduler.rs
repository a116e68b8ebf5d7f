use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Handle returned when a frame callback is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameCallbackId(u64);

impl FrameCallbackId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// One-shot callback run on the next frame with that frame's timestamp.
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// Source of per-frame callbacks supplied by the surrounding environment.
///
/// Timestamps are measured from an epoch chosen by the scheduler and must
/// never decrease between frames. Implementations must not invoke a callback
/// from inside `schedule_frame`; it always runs on a later frame.
pub trait FrameScheduler {
    /// Registers `callback` to run once on the next frame.
    fn schedule_frame(&self, callback: FrameCallback) -> FrameCallbackId;
    /// Drops a callback that has not run yet. Unknown ids are ignored.
    fn cancel_frame(&self, id: FrameCallbackId);
}

/// Deterministic scheduler that only produces frames when pumped.
///
/// The command-line driver pumps it from a real-time loop; tests pump it with
/// synthetic timestamps.
pub struct ManualFrameScheduler {
    next_id: Cell<u64>,
    pending: RefCell<BTreeMap<FrameCallbackId, FrameCallback>>,
    last_timestamp: Cell<Option<Duration>>,
    frames: Cell<u64>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Timestamp of the most recent pump, if any.
    pub fn last_timestamp(&self) -> Option<Duration> {
        self.last_timestamp.get()
    }

    /// Number of frames pumped so far.
    pub fn frame_count(&self) -> u64 {
        self.frames.get()
    }

    /// Produces one frame at `timestamp`.
    ///
    /// Every callback scheduled before this call runs in scheduling order,
    /// unless it is cancelled by an earlier callback of the same frame.
    /// Callbacks scheduled while pumping wait for the next frame. Returns the
    /// number of callbacks that ran.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` is earlier than the previous frame's timestamp.
    pub fn pump(&self, timestamp: Duration) -> usize {
        if let Some(previous) = self.last_timestamp.get() {
            assert!(
                timestamp >= previous,
                "frame timestamp went backwards: {timestamp:?} < {previous:?}"
            );
        }
        self.last_timestamp.set(Some(timestamp));
        self.frames.set(self.frames.get().saturating_add(1));

        let cutoff = FrameCallbackId(self.next_id.get());
        let mut ran = 0;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                match pending.first_key_value() {
                    Some((id, _)) if *id < cutoff => {
                        let id = *id;
                        pending.remove(&id)
                    }
                    _ => None,
                }
            };
            let Some(callback) = next else {
                break;
            };
            callback(timestamp);
            ran += 1;
        }
        ran
    }
}

impl Default for ManualFrameScheduler {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            pending: RefCell::new(BTreeMap::new()),
            last_timestamp: Cell::new(None),
            frames: Cell::new(0),
        }
    }
}

impl fmt::Debug for ManualFrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrameScheduler")
            .field("pending", &self.pending_count())
            .field("last_timestamp", &self.last_timestamp.get())
            .field("frames", &self.frames.get())
            .finish()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn schedule_frame(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = FrameCallbackId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().insert(id, callback);
        id
    }

    fn cancel_frame(&self, id: FrameCallbackId) {
        self.pending.borrow_mut().remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn pump_runs_callbacks_in_scheduling_order() {
        let scheduler = ManualFrameScheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "c"] {
            let seen = Rc::clone(&seen);
            scheduler.schedule_frame(Box::new(move |ts| seen.borrow_mut().push((label, ts))));
        }

        let ran = scheduler.pump(Duration::from_millis(16));
        assert_eq!(ran, 3);
        assert_eq!(
            *seen.borrow(),
            vec![
                ("a", Duration::from_millis(16)),
                ("b", Duration::from_millis(16)),
                ("c", Duration::from_millis(16)),
            ]
        );
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.frame_count(), 1);
    }

    #[test]
    fn callbacks_scheduled_during_pump_wait_for_next_frame() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let hits = Rc::new(Cell::new(0));
        {
            let inner = Rc::clone(&scheduler);
            let hits = Rc::clone(&hits);
            scheduler.schedule_frame(Box::new(move |_| {
                let hits = Rc::clone(&hits);
                inner.schedule_frame(Box::new(move |_| hits.set(hits.get() + 1)));
            }));
        }

        assert_eq!(scheduler.pump(Duration::ZERO), 1);
        assert_eq!(hits.get(), 0);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.pump(Duration::from_millis(16)), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cancelled_callbacks_never_run() {
        let scheduler = ManualFrameScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = Rc::clone(&hits);
        let id = scheduler.schedule_frame(Box::new(move |_| hits_clone.set(1)));
        scheduler.cancel_frame(id);
        assert_eq!(scheduler.pump(Duration::ZERO), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn callback_may_cancel_a_later_callback_of_the_same_frame() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let victim_ran = Rc::new(Cell::new(false));
        let victim_id = Rc::new(Cell::new(None));
        {
            let scheduler_ref = Rc::clone(&scheduler);
            let victim_id = Rc::clone(&victim_id);
            scheduler.schedule_frame(Box::new(move |_| {
                if let Some(id) = victim_id.get() {
                    scheduler_ref.cancel_frame(id);
                }
            }));
        }
        let flag = Rc::clone(&victim_ran);
        victim_id.set(Some(scheduler.schedule_frame(Box::new(move |_| flag.set(true)))));

        assert_eq!(scheduler.pump(Duration::ZERO), 1);
        assert!(!victim_ran.get());
    }

    #[test]
    #[should_panic(expected = "frame timestamp went backwards")]
    fn rejects_backwards_timestamps() {
        let scheduler = ManualFrameScheduler::new();
        scheduler.pump(Duration::from_millis(32));
        scheduler.pump(Duration::from_millis(16));
    }
}
