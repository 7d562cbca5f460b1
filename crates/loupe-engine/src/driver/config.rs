use crate::coords::ColorRgba;
use crate::render::ShaderSet;

/// Lens driver configuration.
#[derive(Debug, Clone)]
pub struct LensConfig {
    /// Fixed render scale. `None` uses the device pixel ratio reported at construction.
    pub render_scale: Option<f64>,

    /// Opaque fill behind the images in the lens texture.
    pub background: ColorRgba,

    /// Pointer smoothing factor in `(0, 1]`; `1.0` disables smoothing.
    pub pointer_smoothing: f32,

    pub shaders: ShaderSet,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            render_scale: None,
            background: ColorRgba::white(),
            pointer_smoothing: 0.2,
            shaders: ShaderSet::magnifying_glass(),
        }
    }
}
