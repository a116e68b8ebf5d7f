//! Renderer-facing half of meshgrad.
//!
//! The crate glues the animation controller to whatever surface paints the
//! mesh gradient effect. The overall flow is:
//!
//! ```text
//!   FrameScheduler ─▶ GradientAnimationController ─▶ GradientHost::on_tick
//!                                                         │ phase += step
//!                                                         ▼
//!                              RedrawSurface::request_redraw(RenderRequest)
//!                                                         │
//!                                                         └─▶ GradientUniforms ─▶ GPU UBO
//! ```
//!
//! [`GradientHost`] owns or borrows the controller and enforces who disposes
//! it, while the surface and the compiled effect stay external collaborators:
//! the host only hands them a phase, four colors and the effect options.

mod host;
mod precache;
mod runtime;
mod types;
mod uniforms;

pub use host::{ControllerBinding, GradientHost, HostConfig, HostError, Ownership};
pub use precache::{
    precache_effect, EffectInfo, EffectLoader, FileEffectLoader, PrecacheOutcome, PrecacheTask,
};
pub use runtime::{PhaseSample, RenderPolicy, DEFAULT_PHASE_STEP};
pub use types::{Color, MeshGradientOptions, RedrawSurface, RenderRequest, COLOR_COUNT};
pub use uniforms::GradientUniforms;
