use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use meshconfig::MeshConfig;
use renderer::{
    EffectLoader, FileEffectLoader, GradientHost, HostConfig, Ownership, PrecacheOutcome,
    RedrawSurface,
};
use tracing_subscriber::EnvFilter;

use crate::bindings::{map_colors, map_options};
use crate::cli::RunArgs;
use crate::frame_loop::{FrameBudget, FrameLoop};
use crate::report::RunReport;
use crate::surface::LoggingSurface;

const DEFAULT_FPS: f32 = 60.0;

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => MeshConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config
        .validate()
        .context("invalid settings after applying command-line overrides")?;

    let interval = config
        .frame_interval()
        .unwrap_or_else(|| Duration::from_secs_f64(1.0 / f64::from(DEFAULT_FPS)));
    let budget = FrameBudget {
        frames: args.frames,
        duration: config.duration,
    };
    let frame_loop = FrameLoop::new(interval);
    let surface = Rc::new(LoggingSurface::default());
    let host_surface: Rc<dyn RedrawSurface> = surface.clone();

    let host_config = HostConfig {
        colors: map_colors(&config)?,
        seed: config.seed,
        phase_step: config.phase_step,
        options: map_options(&config.options),
        controller: None,
        effect_loader: config
            .shader
            .clone()
            .map(|path| Arc::new(FileEffectLoader::new(path)) as Arc<dyn EffectLoader>),
    };
    let host = GradientHost::new(host_config, frame_loop.provider(), host_surface)
        .context("failed to set up gradient host")?;
    tracing::info!(
        policy = ?host.policy(),
        ?interval,
        frames = ?budget.frames,
        duration = ?budget.duration,
        "mesh gradient running"
    );

    let stats = frame_loop.run(budget);

    let effect = host.precache().map(|task| match task.try_outcome() {
        Some(PrecacheOutcome::Ready(info)) => format!("ready ({} bytes)", info.bytes),
        Some(PrecacheOutcome::Failed(message)) => format!("failed: {message}"),
        None => "pending".to_string(),
    });
    let mut report = RunReport {
        mode: if host.is_static() { "still" } else { "animate" },
        ownership: host.ownership().map(|ownership| match ownership {
            Ownership::SelfOwned => "self_owned",
            Ownership::ExternallyOwned => "externally_owned",
        }),
        controller: host.controller().map(|controller| controller.id().to_string()),
        frames: stats.frames,
        callbacks: stats.callbacks,
        ticks: host.tick_count(),
        redraws: host.redraw_count(),
        surface_requests: 0,
        final_phase: host.phase(),
        elapsed_ms: stats.elapsed.as_millis(),
        stop: stats.stop,
        effect,
        pending_after_teardown: 0,
    };

    host.teardown();
    report.surface_requests = surface.request_count();
    report.pending_after_teardown = frame_loop.pending_callbacks();
    tracing::debug!(
        stop = ?stats.stop,
        pending = report.pending_after_teardown,
        "gradient host torn down"
    );

    println!("{}", report.render(args.report)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<MeshConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    MeshConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn apply_overrides(config: &mut MeshConfig, args: &RunArgs) {
    if !args.colors.is_empty() {
        config.colors = args.colors.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(step) = args.phase_step {
        config.phase_step = step;
    }
    if args.fps.is_some() {
        config.fps = args.fps;
    }
    if args.duration.is_some() {
        config.duration = args.duration;
    }
    if args.shader.is_some() {
        config.shader = args.shader.clone();
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
