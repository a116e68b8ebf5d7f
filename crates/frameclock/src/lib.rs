//! Frame-driven timing primitives.
//!
//! Everything here is single-threaded and cooperative. A host environment
//! implements [`FrameScheduler`] (or uses [`ManualFrameScheduler`]) to deliver
//! one callback per rendered frame; tickers and clocks build on top of it:
//!
//! ```text
//!   FrameScheduler ──frame timestamp──▶ Ticker ──elapsed──▶ FrameClock ──▶ on_tick
//!          ▲                              │
//!          └────── schedule / cancel ─────┘
//! ```
//!
//! A [`Ticker`] converts absolute frame timestamps into durations elapsed since
//! it was started. A [`FrameClock`] owns exactly one ticker at a time and can
//! be rebound to another [`TickerProvider`] without losing the frame that was
//! already scheduled on the old one.

mod clock;
mod scheduler;
mod ticker;

pub use clock::FrameClock;
pub use scheduler::{FrameCallback, FrameCallbackId, FrameScheduler, ManualFrameScheduler};
pub use ticker::{TickCallback, Ticker, TickerProvider};

/// Conversion factor between `Duration::as_micros` and fractional seconds.
pub const MICROSECONDS_PER_SECOND: u64 = 1_000_000;
