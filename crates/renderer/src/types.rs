/// The mesh gradient blends exactly four corner colors.
pub const COLOR_COUNT: usize = 4;

/// Straight-alpha RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba.map(|channel| f32::from(channel) / 255.0);
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Tunables consumed by the gradient effect.
///
/// The host never interprets these values; they reach the surface unchanged
/// with every redraw request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshGradientOptions {
    /// Spatial frequency of the warp applied to the blend field.
    pub frequency: f32,
    /// Strength of the warp, in effect-defined units.
    pub amplitude: f32,
    /// Multiplier the effect applies to the time input.
    pub speed: f32,
    /// Film grain intensity; 0 disables grain.
    pub grain: f32,
}

impl Default for MeshGradientOptions {
    fn default() -> Self {
        Self {
            frequency: 5.0,
            amplitude: 30.0,
            speed: 1.0,
            grain: 0.0,
        }
    }
}

/// Inputs for one redraw of the gradient surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Phase scalar fed to the effect's time uniform.
    pub time: f32,
    pub colors: [Color; COLOR_COUNT],
    pub options: MeshGradientOptions,
}

/// Surface that paints the gradient effect, usually beneath child content.
///
/// Implementations schedule a repaint with the supplied inputs; the core
/// never looks past this call.
pub trait RedrawSurface {
    fn request_redraw(&self, request: &RenderRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_8bit_channels() {
        let color = Color::from_rgba8([255, 0, 51, 255]);
        assert_eq!(color.to_array(), [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn default_options_are_stable() {
        let options = MeshGradientOptions::default();
        assert_eq!(options.frequency, 5.0);
        assert_eq!(options.amplitude, 30.0);
        assert_eq!(options.speed, 1.0);
        assert_eq!(options.grain, 0.0);
    }
}
