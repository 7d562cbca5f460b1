/// Multiplier converting logical pixels to physical raster pixels.
///
/// Invariant: the wrapped value is finite and strictly positive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderScale(f32);

impl RenderScale {
    /// Scale used when the host cannot report a usable device pixel ratio.
    pub const FALLBACK: RenderScale = RenderScale(2.0);

    /// Builds a scale from a reported device pixel ratio.
    ///
    /// Missing, zero, negative or non-finite ratios fall back to [`Self::FALLBACK`].
    #[inline]
    pub fn from_device_ratio(ratio: Option<f64>) -> Self {
        match ratio {
            Some(r) if r.is_finite() && r > 0.0 => RenderScale(r as f32),
            _ => Self::FALLBACK,
        }
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    /// Scales a logical length and floors it to whole raster pixels (min 1).
    #[inline]
    pub fn to_raster_px(self, logical: f32) -> u32 {
        let v = (logical * self.0).floor();
        if v.is_finite() && v >= 1.0 { v as u32 } else { 1 }
    }
}

impl Default for RenderScale {
    fn default() -> Self {
        Self::FALLBACK
    }
}
