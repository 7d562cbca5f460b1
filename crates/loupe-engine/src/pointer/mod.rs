//! Pointer sampling for the lens.
//!
//! The driver samples once per tick through [`PointerSampler`]; the host feeds
//! raw positions into a [`SmoothedPointer`] as they arrive.

use crate::time::REFERENCE_DT;

/// Pointer position in output-surface logical pixels, top-left origin.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Source of the per-frame pointer sample.
pub trait PointerSampler {
    /// Advances the sampler by `dt` seconds and returns the current position.
    fn update(&mut self, dt: f32) -> PointerState;

    /// Informs the sampler of the current surface size in logical pixels.
    fn resize(&mut self, width: f32, height: f32) {
        let _ = (width, height);
    }
}

/// Exponentially smoothed pointer.
///
/// Every [`REFERENCE_DT`] of elapsed time moves the sample towards the last
/// observed position by `factor` (`1.0` tracks exactly), so the lens trails the
/// pointer at the same speed whatever the refresh rate. Before the first
/// observation the sample sits at the surface centre.
#[derive(Debug, Clone)]
pub struct SmoothedPointer {
    factor: f32,
    surface: (f32, f32),
    target: Option<PointerState>,
    current: Option<PointerState>,
}

impl SmoothedPointer {
    /// Out-of-range factors are clamped into `(0, 1]`.
    pub fn new(factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.clamp(f32::EPSILON, 1.0) } else { 1.0 };
        Self { factor, surface: (0.0, 0.0), target: None, current: None }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Records the latest raw pointer position.
    pub fn observe(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.target = Some(PointerState::new(x, y));
        }
    }

    /// Sets the surface size used for the centre fallback.
    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        self.surface = (width, height);
    }

    /// Fraction of the remaining distance covered in `dt` seconds.
    fn step(&self, dt: f32) -> f32 {
        if dt.is_nan() || dt <= 0.0 {
            return 0.0;
        }
        if self.factor >= 1.0 {
            return 1.0;
        }
        1.0 - (1.0 - self.factor).powf(dt / REFERENCE_DT)
    }

    fn centre(&self) -> PointerState {
        PointerState::new(self.surface.0 * 0.5, self.surface.1 * 0.5)
    }
}

impl Default for SmoothedPointer {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl PointerSampler for SmoothedPointer {
    fn resize(&mut self, width: f32, height: f32) {
        self.set_surface_size(width, height);
    }

    fn update(&mut self, dt: f32) -> PointerState {
        let Some(target) = self.target else {
            return self.centre();
        };
        let next = match self.current {
            // First observation: jump there instead of sweeping in from the centre.
            None => target,
            Some(cur) => {
                let k = self.step(dt);
                PointerState::new(cur.x + (target.x - cur.x) * k, cur.y + (target.y - cur.y) * k)
            }
        };
        self.current = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = REFERENCE_DT;

    #[test]
    fn reports_centre_before_any_observation() {
        let mut p = SmoothedPointer::new(0.5);
        p.set_surface_size(800.0, 600.0);
        assert_eq!(p.update(DT), PointerState::new(400.0, 300.0));
    }

    #[test]
    fn converges_towards_target() {
        let mut p = SmoothedPointer::new(0.5);
        p.observe(0.0, 0.0);
        p.update(DT);
        p.observe(100.0, 40.0);
        assert_eq!(p.update(DT), PointerState::new(50.0, 20.0));
        assert_eq!(p.update(DT), PointerState::new(75.0, 30.0));
    }

    #[test]
    fn factor_one_tracks_exactly() {
        let mut p = SmoothedPointer::new(1.0);
        p.observe(10.0, 10.0);
        p.update(DT);
        p.observe(33.0, 7.0);
        assert_eq!(p.update(DT), PointerState::new(33.0, 7.0));
    }

    #[test]
    fn two_half_frames_match_one_full_frame() {
        let mut fast = SmoothedPointer::new(0.5);
        let mut slow = SmoothedPointer::new(0.5);
        for p in [&mut fast, &mut slow] {
            p.observe(0.0, 0.0);
            p.update(DT);
            p.observe(100.0, 0.0);
        }
        fast.update(DT * 0.5);
        let a = fast.update(DT * 0.5);
        let b = slow.update(DT);
        assert!((a.x - b.x).abs() < 1e-3, "{a:?} vs {b:?}");
        assert!(a.x > 0.0 && a.x < 100.0);
    }

    #[test]
    fn zero_dt_holds_position() {
        let mut p = SmoothedPointer::new(0.5);
        p.observe(0.0, 0.0);
        p.update(DT);
        p.observe(100.0, 0.0);
        assert_eq!(p.update(0.0), PointerState::new(0.0, 0.0));
    }

    #[test]
    fn invalid_factor_is_clamped() {
        assert_eq!(SmoothedPointer::new(4.0).factor(), 1.0);
        assert!(SmoothedPointer::new(-1.0).factor() > 0.0);
        assert_eq!(SmoothedPointer::new(f32::NAN).factor(), 1.0);
    }
}
