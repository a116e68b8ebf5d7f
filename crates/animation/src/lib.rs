//! Animation driver for the mesh gradient.
//!
//! [`GradientAnimationController`] owns a [`frameclock::FrameClock`] and turns
//! its ticks into change notifications for any number of observers. The
//! observer bookkeeping lives in [`ObserverList`], which the controller embeds
//! rather than inherits.

mod controller;
mod observers;

pub use controller::{ControllerId, GradientAnimationController};
pub use observers::{Listener, ListenerId, ObserverList};
