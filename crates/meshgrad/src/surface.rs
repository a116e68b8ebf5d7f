use std::cell::Cell;

use renderer::{GradientUniforms, RedrawSurface, RenderRequest};
use tracing::trace;

/// Headless surface: packs every request into the uniform block the effect
/// would receive and logs it.
#[derive(Debug, Default)]
pub struct LoggingSurface {
    requests: Cell<u64>,
    last: Cell<Option<GradientUniforms>>,
}

impl LoggingSurface {
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }

    pub fn last_uniforms(&self) -> Option<GradientUniforms> {
        self.last.get()
    }
}

impl RedrawSurface for LoggingSurface {
    fn request_redraw(&self, request: &RenderRequest) {
        let uniforms = GradientUniforms::from_request(request);
        let count = self.requests.get().saturating_add(1);
        self.requests.set(count);
        trace!(
            request = count,
            time = uniforms.u_time,
            bytes = uniforms.as_bytes().len(),
            "gradient redraw requested"
        );
        self.last.set(Some(uniforms));
    }
}

#[cfg(test)]
mod tests {
    use renderer::{Color, MeshGradientOptions};

    use super::*;

    #[test]
    fn records_latest_uniforms() {
        let surface = LoggingSurface::default();
        assert_eq!(surface.last_uniforms(), None);

        for time in [0.0, 0.25] {
            surface.request_redraw(&RenderRequest {
                time,
                colors: [Color::new(0.5, 0.5, 0.5, 1.0); 4],
                options: MeshGradientOptions::default(),
            });
        }

        assert_eq!(surface.request_count(), 2);
        let uniforms = surface.last_uniforms().unwrap();
        assert_eq!(uniforms.u_time, 0.25);
        assert_eq!(uniforms.u_frequency, 5.0);
        assert_eq!(uniforms.u_colors[0], [0.5, 0.5, 0.5, 1.0]);
    }
}
