use std::fmt::Write as _;

use serde::Serialize;

use crate::frame_loop::StopReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Summary printed once the host has been torn down.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// `animate` or `still`.
    pub mode: &'static str,
    /// `self_owned` or `externally_owned`; absent in still mode.
    pub ownership: Option<&'static str>,
    pub controller: Option<String>,
    pub frames: u64,
    pub callbacks: u64,
    pub ticks: u64,
    pub redraws: u64,
    pub surface_requests: u64,
    pub final_phase: f32,
    pub elapsed_ms: u128,
    pub stop: StopReason,
    /// `ready`, `failed: ...` or `pending` when an effect was precached.
    pub effect: Option<String>,
    pub pending_after_teardown: usize,
}

impl RunReport {
    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(self),
            ReportFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "mode:        {}", self.mode);
        if let (Some(ownership), Some(controller)) = (self.ownership, &self.controller) {
            let _ = writeln!(out, "controller:  {controller} ({ownership})");
        }
        let _ = writeln!(
            out,
            "frames:      {} ({} callbacks, {} ms, stopped: {})",
            self.frames,
            self.callbacks,
            self.elapsed_ms,
            stop_label(self.stop)
        );
        let _ = writeln!(out, "ticks:       {}", self.ticks);
        let _ = writeln!(
            out,
            "redraws:     {} ({} reached the surface)",
            self.redraws, self.surface_requests
        );
        let _ = writeln!(out, "final phase: {:.4}", self.final_phase);
        if let Some(effect) = &self.effect {
            let _ = writeln!(out, "effect:      {effect}");
        }
        let _ = write!(out, "pending:     {}", self.pending_after_teardown);
        out
    }
}

fn stop_label(stop: StopReason) -> &'static str {
    match stop {
        StopReason::FrameBudget => "frame budget",
        StopReason::DurationBudget => "duration budget",
        StopReason::Idle => "idle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            mode: "animate",
            ownership: Some("self_owned"),
            controller: Some("GradientAnimationController#3".into()),
            frames: 4,
            callbacks: 4,
            ticks: 4,
            redraws: 5,
            surface_requests: 5,
            final_phase: 0.04,
            elapsed_ms: 70,
            stop: StopReason::FrameBudget,
            effect: None,
            pending_after_teardown: 0,
        }
    }

    #[test]
    fn renders_json() {
        let json = report().render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "animate");
        assert_eq!(value["stop"], "frame_budget");
        assert_eq!(value["redraws"], 5);
        assert!(value["effect"].is_null());
    }

    #[test]
    fn renders_text() {
        let text = report().render(ReportFormat::Text).unwrap();
        assert!(text.contains("controller:  GradientAnimationController#3 (self_owned)"));
        assert!(text.contains("stopped: frame budget"));
        assert!(text.contains("final phase: 0.0400"));
        assert!(!text.contains("effect:"));
    }
}
