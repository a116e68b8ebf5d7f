use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use frameclock::{ManualFrameScheduler, TickerProvider};
use serde::Serialize;
use tracing::trace;

/// Limits on how long a [`FrameLoop`] runs. An empty budget runs until the
/// scheduler has nothing left to deliver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameBudget {
    pub frames: Option<u64>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    FrameBudget,
    DurationBudget,
    /// No frame callback was pending.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub callbacks: u64,
    pub elapsed: Duration,
    pub stop: StopReason,
}

/// Real-time frame source: pumps a [`ManualFrameScheduler`] once per
/// `interval`, stamping each frame with the time since the loop started.
pub struct FrameLoop {
    scheduler: Rc<ManualFrameScheduler>,
    interval: Duration,
}

impl FrameLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            scheduler: Rc::new(ManualFrameScheduler::new()),
            interval,
        }
    }

    pub fn provider(&self) -> Rc<dyn TickerProvider> {
        Rc::new(Rc::clone(&self.scheduler))
    }

    pub fn pending_callbacks(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn run(&self, budget: FrameBudget) -> LoopStats {
        let origin = Instant::now();
        let mut next_frame = Duration::ZERO;
        let mut frames = 0u64;
        let mut callbacks = 0u64;

        let stop = loop {
            if budget.frames.is_some_and(|limit| frames >= limit) {
                break StopReason::FrameBudget;
            }
            if self.scheduler.pending_count() == 0 {
                break StopReason::Idle;
            }

            let now = origin.elapsed();
            if let Some(wait) = next_frame.checked_sub(now) {
                thread::sleep(wait);
            }
            let timestamp = origin.elapsed();
            if budget.duration.is_some_and(|limit| timestamp >= limit) {
                break StopReason::DurationBudget;
            }

            let ran = self.scheduler.pump(timestamp);
            frames += 1;
            callbacks += ran as u64;
            trace!(frame = frames, ?timestamp, callbacks = ran, "frame pumped");
            next_frame += self.interval;
        };

        LoopStats {
            frames,
            callbacks,
            elapsed: origin.elapsed(),
            stop,
        }
    }
}
