use anyhow::{Context, Result};
use meshconfig::{GradientOptions, MeshConfig};
use renderer::{Color, MeshGradientOptions};

/// Palette used when neither the config nor the command line names colors.
pub const DEFAULT_PALETTE: [&str; 4] = ["#1e3a8a", "#7c3aed", "#db2777", "#f59e0b"];

pub fn map_colors(config: &MeshConfig) -> Result<Vec<Color>> {
    let parsed = if config.colors.is_empty() {
        DEFAULT_PALETTE
            .iter()
            .map(|raw| meshconfig::parse_hex_color(raw))
            .collect::<Result<Vec<_>, _>>()
            .context("default palette is malformed")?
    } else {
        config.parsed_colors().context("failed to decode colors")?
    };
    Ok(parsed.into_iter().map(Color::from_rgba8).collect())
}

pub fn map_options(options: &GradientOptions) -> MeshGradientOptions {
    MeshGradientOptions {
        frequency: options.frequency,
        amplitude: options.amplitude,
        speed: options.speed,
        grain: options.grain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_palette() {
        let colors = map_colors(&MeshConfig::default()).unwrap();
        assert_eq!(colors.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn keeps_configured_colors_in_order() {
        let config = MeshConfig {
            colors: vec!["#ff0000".into(), "#0000ff80".into()],
            ..MeshConfig::default()
        };
        let colors = map_colors(&config).unwrap();
        assert_eq!(
            colors,
            vec![
                Color::from_rgba8([0xff, 0, 0, 0xff]),
                Color::from_rgba8([0, 0, 0xff, 0x80]),
            ]
        );
    }

    #[test]
    fn copies_options_field_by_field() {
        let options = GradientOptions {
            frequency: 2.0,
            amplitude: 8.0,
            speed: 0.25,
            grain: 0.5,
        };
        let mapped = map_options(&options);
        assert_eq!(mapped.frequency, 2.0);
        assert_eq!(mapped.amplitude, 8.0);
        assert_eq!(mapped.speed, 0.25);
        assert_eq!(mapped.grain, 0.5);
    }
}
