use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeshConfig {
    pub version: u32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub seed: Option<f32>,
    #[serde(default = "default_phase_step")]
    pub phase_step: f32,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub shader: Option<PathBuf>,
    #[serde(default)]
    pub options: GradientOptions,
}

/// Effect tunables, forwarded to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GradientOptions {
    pub frequency: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub grain: f32,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            frequency: 5.0,
            amplitude: 30.0,
            speed: 1.0,
            grain: 0.0,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            version: 1,
            colors: Vec::new(),
            seed: None,
            phase_step: default_phase_step(),
            fps: None,
            duration: None,
            shader: None,
            options: GradientOptions::default(),
        }
    }
}

fn default_phase_step() -> f32 {
    0.01
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn interval_for_fps(fps: f32) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / f64::from(fps)).ok()
}

/// Parses `#rrggbb` or `#rrggbbaa` (the `#` is optional) into RGBA bytes.
pub fn parse_hex_color(raw: &str) -> Result<[u8; 4], ConfigError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ConfigError::Invalid(format!(
            "color '{raw}' is not a #rrggbb or #rrggbbaa hex value"
        )));
    }

    let channel = |index: usize| {
        u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16)
            .map_err(|err| ConfigError::Invalid(format!("color '{raw}': {err}")))
    };
    let alpha = if digits.len() == 8 { channel(3)? } else { 0xff };
    Ok([channel(0)?, channel(1)?, channel(2)?, alpha])
}

impl MeshConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: MeshConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Colors decoded to RGBA bytes, in declaration order.
    pub fn parsed_colors(&self) -> Result<Vec<[u8; 4]>, ConfigError> {
        self.colors.iter().map(|raw| parse_hex_color(raw)).collect()
    }

    /// Frame interval implied by `fps`, if one is configured.
    ///
    /// `None` as well when `fps` is too small for its interval to fit in a
    /// [`Duration`]; [`validate`](Self::validate) rejects such values.
    pub fn frame_interval(&self) -> Option<Duration> {
        self.fps.and_then(interval_for_fps)
    }

    /// Checks everything except the color count, which the host owns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        self.parsed_colors()?;

        if let Some(seed) = self.seed {
            if !seed.is_finite() {
                return Err(ConfigError::Invalid("seed must be a finite number".into()));
            }
        }

        if !self.phase_step.is_finite() || self.phase_step < 0.0 {
            return Err(ConfigError::Invalid(
                "phase_step must be a finite number >= 0".into(),
            ));
        }

        if let Some(fps) = self.fps {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(ConfigError::Invalid("fps must be > 0".into()));
            }
            if interval_for_fps(fps).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "fps {fps} is too low; its frame interval does not fit in a duration"
                )));
            }
        }

        if let Some(duration) = self.duration {
            if duration.is_zero() {
                return Err(ConfigError::Invalid("duration must be > 0".into()));
            }
        }

        if let Some(shader) = &self.shader {
            if shader.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("shader path may not be empty".into()));
            }
        }

        let options = &self.options;
        for (name, value) in [
            ("frequency", options.frequency),
            ("amplitude", options.amplitude),
            ("speed", options.speed),
            ("grain", options.grain),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "options.{name} must be a finite number"
                )));
            }
        }

        Ok(())
    }
}
