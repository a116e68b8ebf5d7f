use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::report::ReportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "meshgrad",
    author,
    version,
    about = "Animated mesh gradient driver",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// TOML configuration file; command-line flags override its values.
    #[arg(long, value_name = "FILE", env = "MESHGRAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Corner color (`#rrggbb` or `#rrggbbaa`). Repeat to replace the whole palette.
    #[arg(long = "color", value_name = "HEX")]
    pub colors: Vec<String>,

    /// Render a single still frame at this phase instead of animating.
    #[arg(long, value_name = "PHASE")]
    pub seed: Option<f32>,

    /// Phase increment applied on every tick.
    #[arg(long, value_name = "STEP")]
    pub phase_step: Option<f32>,

    /// Frame rate the loop is pumped at (defaults to 60).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Stop after this many frames.
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<u64>,

    /// Stop after this much wall-clock time (seconds or e.g. `2s 500ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Effect file to precache in the background.
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Run report format: `text` or `json`.
    #[arg(
        long,
        value_name = "FORMAT",
        value_parser = parse_report_format,
        default_value = "text"
    )]
    pub report: ReportFormat,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let duration = match trimmed.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            Duration::try_from_secs_f64(seconds)
                .map_err(|err| format!("invalid duration '{trimmed}': {err}"))?
        }
        Ok(_) => return Err(format!("invalid duration '{trimmed}'")),
        Err(_) => humantime::parse_duration(trimmed)
            .map_err(|err| format!("invalid duration '{trimmed}': {err}"))?,
    };

    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

pub fn parse_report_format(value: &str) -> Result<ReportFormat, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("report format must not be empty".to_string());
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "text" | "plain" => Ok(ReportFormat::Text),
        "json" => Ok(ReportFormat::Json),
        other => Err(format!("unknown report format '{other}'; expected text or json")),
    }
}
