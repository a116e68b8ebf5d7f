/// Per-tick phase increment used when the caller does not pick one.
pub const DEFAULT_PHASE_STEP: f32 = 0.01;

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether the gradient animates from frame ticks or
/// is evaluated once at a fixed phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderPolicy {
    /// Advance the phase by `phase_step` on every controller tick.
    Animate {
        /// Fixed phase increment applied per tick.
        phase_step: f32,
    },
    /// Render a single still frame at `seed`; no controller is ever created.
    Still {
        /// Phase the effect is evaluated at.
        seed: f32,
    },
}

impl RenderPolicy {
    /// A seed always wins over animation.
    pub fn from_seed(seed: Option<f32>, phase_step: f32) -> Self {
        match seed {
            Some(seed) => Self::Still { seed },
            None => Self::Animate { phase_step },
        }
    }

    pub fn initial_phase(&self) -> f32 {
        match self {
            Self::Animate { .. } => 0.0,
            Self::Still { seed } => *seed,
        }
    }

    pub fn is_still(&self) -> bool {
        matches!(self, Self::Still { .. })
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate {
            phase_step: DEFAULT_PHASE_STEP,
        }
    }
}

/// Snapshot of the phase state supplied to the effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    /// Current phase scalar.
    pub phase: f32,
    /// Number of controller ticks folded into `phase`.
    pub ticks: u64,
}

impl PhaseSample {
    pub fn new(phase: f32, ticks: u64) -> Self {
        Self { phase, ticks }
    }

    /// Applies one tick under `policy`. Still policies never move.
    pub fn advance(self, policy: &RenderPolicy) -> Self {
        match policy {
            RenderPolicy::Animate { phase_step } => Self {
                phase: self.phase + phase_step,
                ticks: self.ticks.saturating_add(1),
            },
            RenderPolicy::Still { .. } => self,
        }
    }
}
