use super::Rect;

/// Visible region of the container in logical pixels.
///
/// Recomputed every frame from the container's on-screen bounds.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub fn from_rect(r: Rect) -> Self {
        let r = r.normalized();
        Self {
            left: r.left(),
            top: r.top(),
            right: r.right(),
            bottom: r.bottom(),
            width: r.size.x,
            height: r.size.y,
        }
    }

    /// Half-plane visibility test.
    ///
    /// A rect is rejected only when it lies strictly beyond one of the four edges;
    /// rects touching an edge count as visible.
    #[inline]
    pub fn overlaps(self, r: Rect) -> bool {
        !(r.right() < self.left
            || r.left() > self.right
            || r.bottom() < self.top
            || r.top() > self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport::from_rect(Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    #[test]
    fn from_rect_fills_edges() {
        let v = Viewport::from_rect(Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!((v.left, v.top, v.right, v.bottom), (10.0, 20.0, 110.0, 70.0));
        assert_eq!((v.width, v.height), (100.0, 50.0));
    }

    #[test]
    fn rect_right_of_viewport_is_rejected() {
        assert!(!vp().overlaps(Rect::new(900.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn rect_above_viewport_is_rejected() {
        assert!(!vp().overlaps(Rect::new(0.0, -200.0, 100.0, 100.0)));
    }

    #[test]
    fn touching_edge_counts_as_visible() {
        assert!(vp().overlaps(Rect::new(800.0, 0.0, 50.0, 50.0)));
        assert!(vp().overlaps(Rect::new(-50.0, -50.0, 50.0, 50.0)));
    }

    #[test]
    fn partial_overlap_is_visible() {
        assert!(vp().overlaps(Rect::new(750.0, 550.0, 100.0, 100.0)));
    }
}
