use bytemuck::{Pod, Zeroable};

use crate::types::{RenderRequest, COLOR_COUNT};

/// CPU mirror of the gradient effect's std140 uniform block.
///
/// ```glsl
/// layout(std140) uniform MeshGradient {
///     vec4 u_colors[4];
///     float u_time;
///     float u_frequency;
///     float u_amplitude;
///     float u_speed;
///     float u_grain;
/// };
/// ```
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientUniforms {
    pub u_colors: [[f32; 4]; COLOR_COUNT],
    pub u_time: f32,
    pub u_frequency: f32,
    pub u_amplitude: f32,
    pub u_speed: f32,
    pub u_grain: f32,
    pub _padding: [f32; 3],
}

unsafe impl Zeroable for GradientUniforms {}
unsafe impl Pod for GradientUniforms {}

impl GradientUniforms {
    pub fn from_request(request: &RenderRequest) -> Self {
        Self {
            u_colors: request.colors.map(|color| color.to_array()),
            u_time: request.time,
            u_frequency: request.options.frequency,
            u_amplitude: request.options.amplitude,
            u_speed: request.options.speed,
            u_grain: request.options.grain,
            _padding: [0.0; 3],
        }
    }

    /// Bytes ready for a uniform buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
