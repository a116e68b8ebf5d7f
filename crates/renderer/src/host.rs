use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use animation::{GradientAnimationController, Listener, ListenerId};
use frameclock::TickerProvider;
use tracing::debug;

use crate::precache::{precache_effect, EffectLoader, PrecacheTask};
use crate::runtime::{PhaseSample, RenderPolicy, DEFAULT_PHASE_STEP};
use crate::types::{Color, MeshGradientOptions, RedrawSurface, RenderRequest, COLOR_COUNT};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("mesh gradient requires exactly {expected} colors, got {actual}")]
    ColorCount { expected: usize, actual: usize },
}

/// Everything a [`GradientHost`] needs at construction.
#[derive(Clone)]
pub struct HostConfig {
    pub colors: Vec<Color>,
    /// Renders one still frame at this phase instead of animating.
    pub seed: Option<f32>,
    /// Phase increment applied per tick.
    pub phase_step: f32,
    pub options: MeshGradientOptions,
    /// Caller-owned controller; the host creates its own when `None`.
    pub controller: Option<GradientAnimationController>,
    /// Effect to warm up in the background at construction.
    pub effect_loader: Option<Arc<dyn EffectLoader>>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            colors: Vec::new(),
            seed: None,
            phase_step: DEFAULT_PHASE_STEP,
            options: MeshGradientOptions::default(),
            controller: None,
            effect_loader: None,
        }
    }
}

/// Who is responsible for disposing the bound controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    SelfOwned,
    ExternallyOwned,
}

/// Controller held by a host, tagged with its disposal responsibility.
#[derive(Debug, Clone)]
pub enum ControllerBinding {
    /// Created by the host, disposed by the host.
    SelfOwned(GradientAnimationController),
    /// Supplied by the caller, who keeps the duty to dispose it.
    ExternallyOwned(GradientAnimationController),
}

impl ControllerBinding {
    pub fn controller(&self) -> &GradientAnimationController {
        match self {
            Self::SelfOwned(controller) | Self::ExternallyOwned(controller) => controller,
        }
    }

    pub fn ownership(&self) -> Ownership {
        match self {
            Self::SelfOwned(_) => Ownership::SelfOwned,
            Self::ExternallyOwned(_) => Ownership::ExternallyOwned,
        }
    }

    /// True if `external` names the controller this binding already holds.
    fn matches(&self, external: Option<&GradientAnimationController>) -> bool {
        match (self, external) {
            (Self::ExternallyOwned(current), Some(next)) => current.ptr_eq(next),
            (Self::SelfOwned(_), None) => true,
            _ => false,
        }
    }
}

struct Attachment {
    binding: ControllerBinding,
    listener: ListenerId,
}

impl Attachment {
    /// Unhooks the host and disposes the controller if the host owns it and
    /// `successor` does not take it over.
    fn release(self, successor: Option<&GradientAnimationController>) {
        let controller = self.binding.controller();
        controller.remove_listener(self.listener);
        match &self.binding {
            ControllerBinding::SelfOwned(owned)
                if !successor.is_some_and(|next| next.ptr_eq(owned)) =>
            {
                owned.dispose();
            }
            _ => {
                debug!(controller = %controller.id(), "left controller with its owner");
            }
        }
    }
}

struct HostShared {
    policy: RenderPolicy,
    sample: Cell<PhaseSample>,
    redraws: Cell<u64>,
    colors: Cell<[Color; COLOR_COUNT]>,
    options: Cell<MeshGradientOptions>,
    surface: Rc<dyn RedrawSurface>,
}

impl HostShared {
    fn on_tick(&self) {
        let sample = self.sample.get().advance(&self.policy);
        self.sample.set(sample);
        self.request_redraw();
    }

    fn request_redraw(&self) {
        let request = RenderRequest {
            time: self.sample.get().phase,
            colors: self.colors.get(),
            options: self.options.get(),
        };
        self.redraws.set(self.redraws.get().saturating_add(1));
        self.surface.request_redraw(&request);
    }
}

/// Stateful owner of the animated mesh gradient.
///
/// The host binds to one controller at a time, advances its phase on every
/// controller tick and asks the surface to redraw. Dropping the host tears it
/// down: a self-owned controller is disposed, an externally owned one is only
/// unsubscribed from.
pub struct GradientHost {
    shared: Rc<HostShared>,
    provider: Rc<dyn TickerProvider>,
    attachment: Option<Attachment>,
    precache: Option<PrecacheTask>,
}

impl GradientHost {
    /// Validates `config`, binds a controller unless a seed is set, and
    /// requests the initial redraw.
    ///
    /// A supplied controller is never started here; the host mirrors whatever
    /// state the caller left it in. A self-created controller starts at once.
    pub fn new(
        config: HostConfig,
        provider: Rc<dyn TickerProvider>,
        surface: Rc<dyn RedrawSurface>,
    ) -> Result<Self, HostError> {
        let colors = validate_colors(&config.colors)?;
        let policy = RenderPolicy::from_seed(config.seed, config.phase_step);
        let precache = config.effect_loader.map(precache_effect);

        let shared = Rc::new(HostShared {
            policy,
            sample: Cell::new(PhaseSample::new(policy.initial_phase(), 0)),
            redraws: Cell::new(0),
            colors: Cell::new(colors),
            options: Cell::new(config.options),
            surface,
        });
        let mut host = Self {
            shared,
            provider,
            attachment: None,
            precache,
        };

        if policy.is_still() {
            if config.controller.is_some() {
                debug!("seed supplied; ignoring external controller");
            }
            debug!(phase = policy.initial_phase(), "gradient host in still mode");
        } else {
            let attachment = host.attach(config.controller);
            match attachment.binding.ownership() {
                Ownership::SelfOwned => attachment.binding.controller().start(),
                Ownership::ExternallyOwned => debug!(
                    controller = %attachment.binding.controller().id(),
                    animating = attachment.binding.controller().is_animating(),
                    "adopted external controller"
                ),
            }
            host.attachment = Some(attachment);
        }

        host.shared.request_redraw();
        Ok(host)
    }

    /// Rebinds after the caller's controller reference changed.
    ///
    /// Passing the controller that is already bound (or `None` while the host
    /// runs its own) changes nothing. Otherwise the current controller is
    /// released, disposing it if the host owns it, and the replacement is
    /// started if the old one was animating.
    pub fn update_controller(&mut self, external: Option<GradientAnimationController>) {
        let Some(current) = self.attachment.as_ref() else {
            debug!("still host ignores controller updates");
            return;
        };
        if current.binding.matches(external.as_ref()) {
            return;
        }

        let Some(previous) = self.attachment.take() else {
            return;
        };
        let was_animating = previous.binding.controller().is_animating();
        previous.release(external.as_ref());

        let next = self.attach(external);
        if was_animating && !next.binding.controller().is_animating() {
            next.binding.controller().start();
        }
        debug!(
            controller = %next.binding.controller().id(),
            ownership = ?next.binding.ownership(),
            was_animating,
            "gradient host rebound"
        );
        self.attachment = Some(next);
    }

    /// Replaces colors and options and requests one redraw.
    pub fn update_appearance(
        &self,
        colors: &[Color],
        options: MeshGradientOptions,
    ) -> Result<(), HostError> {
        let colors = validate_colors(colors)?;
        self.shared.colors.set(colors);
        self.shared.options.set(options);
        self.shared.request_redraw();
        Ok(())
    }

    /// Explicit form of dropping the host.
    pub fn teardown(self) {}

    pub fn phase(&self) -> f32 {
        self.shared.sample.get().phase
    }

    /// Ticks applied to the phase so far.
    pub fn tick_count(&self) -> u64 {
        self.shared.sample.get().ticks
    }

    pub fn redraw_count(&self) -> u64 {
        self.shared.redraws.get()
    }

    pub fn policy(&self) -> RenderPolicy {
        self.shared.policy
    }

    pub fn is_static(&self) -> bool {
        self.shared.policy.is_still()
    }

    pub fn colors(&self) -> [Color; COLOR_COUNT] {
        self.shared.colors.get()
    }

    pub fn options(&self) -> MeshGradientOptions {
        self.shared.options.get()
    }

    pub fn binding(&self) -> Option<&ControllerBinding> {
        self.attachment.as_ref().map(|attachment| &attachment.binding)
    }

    pub fn ownership(&self) -> Option<Ownership> {
        self.binding().map(ControllerBinding::ownership)
    }

    pub fn controller(&self) -> Option<&GradientAnimationController> {
        self.binding().map(ControllerBinding::controller)
    }

    pub fn precache(&self) -> Option<&PrecacheTask> {
        self.precache.as_ref()
    }

    fn attach(&self, external: Option<GradientAnimationController>) -> Attachment {
        let binding = match external {
            Some(controller) => ControllerBinding::ExternallyOwned(controller),
            None => ControllerBinding::SelfOwned(GradientAnimationController::new(
                self.provider.as_ref(),
            )),
        };
        let listener = binding.controller().add_listener(self.tick_listener());
        Attachment { binding, listener }
    }

    fn tick_listener(&self) -> Listener {
        let shared: Weak<HostShared> = Rc::downgrade(&self.shared);
        Rc::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.on_tick();
            }
        })
    }
}

impl Drop for GradientHost {
    fn drop(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            debug!(
                controller = %attachment.binding.controller().id(),
                ownership = ?attachment.binding.ownership(),
                "gradient host torn down"
            );
            attachment.release(None);
        }
    }
}

impl fmt::Debug for GradientHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientHost")
            .field("policy", &self.shared.policy)
            .field("sample", &self.shared.sample.get())
            .field("redraws", &self.shared.redraws.get())
            .field("binding", &self.binding())
            .finish()
    }
}

fn validate_colors(colors: &[Color]) -> Result<[Color; COLOR_COUNT], HostError> {
    colors.try_into().map_err(|_| HostError::ColorCount {
        expected: COLOR_COUNT,
        actual: colors.len(),
    })
}
