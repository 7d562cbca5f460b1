use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Returns the rect moved by `-origin`, i.e. expressed relative to `origin`.
    #[inline]
    pub fn relative_to(self, origin: Vec2) -> Rect {
        Rect::from_origin_size(self.origin - origin, self.size)
    }

    /// Scales origin and size uniformly.
    #[inline]
    pub fn scaled(self, s: f32) -> Rect {
        Rect::from_origin_size(self.origin * s, self.size * s)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_width() {
        let rect = r(10.0, 0.0, -4.0, 5.0);
        let n = rect.normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    #[test]
    fn normalized_negative_height() {
        let rect = r(0.0, 10.0, 5.0, -3.0);
        let n = rect.normalized();
        assert_eq!(n.origin.y, 7.0);
        assert_eq!(n.size.y, 3.0);
    }

    // ── edges / placement ─────────────────────────────────────────────────

    #[test]
    fn edges_follow_origin_and_size() {
        let rect = r(10.0, 20.0, 100.0, 50.0);
        assert_eq!((rect.left(), rect.top(), rect.right(), rect.bottom()), (10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn relative_then_scaled() {
        let rect = r(15.0, 25.0, 10.0, 4.0).relative_to(Vec2::new(5.0, 5.0)).scaled(2.0);
        assert_eq!(rect, r(20.0, 40.0, 20.0, 8.0));
    }

    #[test]
    fn zero_width_is_empty() {
        assert!(r(0.0, 0.0, 0.0, 3.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 3.0).is_empty());
    }
}
