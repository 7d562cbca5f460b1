use crate::coords::{Affine, Rect, RenderScale, Vec2};
use crate::document::{DocumentSnapshot, ElementId, ImageElement};
use crate::time::REFERENCE_DT;

/// Host window facts captured once per tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayContext {
    /// Window width in logical pixels.
    pub window_width: f32,
    /// Window height in logical pixels.
    pub window_height: f32,
    pub scale: RenderScale,
    /// Seconds since the previous tick.
    pub frame_dt: f32,
}

impl DisplayContext {
    pub fn new(window_width: f32, window_height: f32, scale: RenderScale) -> Self {
        Self { window_width, window_height, scale, frame_dt: REFERENCE_DT }
    }

    pub fn with_frame_dt(self, frame_dt: f32) -> Self {
        Self { frame_dt, ..self }
    }
}

/// One image scheduled for drawing, in raster pixels relative to the viewport.
#[derive(Debug, Clone)]
pub struct PlannedDraw {
    pub element: ImageElement,
    pub dest: Rect,
}

/// Result of [`plan_frame`]: what to draw and where, with no side effects.
#[derive(Debug, Clone)]
pub struct FramePlan {
    /// Raster transform: the container transform with its translation in raster pixels.
    pub transform: Affine,
    pub draws: Vec<PlannedDraw>,
    /// Entries rejected by the viewport test, in paint order.
    pub culled: Vec<ElementId>,
}

/// Culls and places the snapshot's entries for one raster pass.
///
/// An entry survives unless it lies strictly outside one of the viewport's four
/// edges. Survivors are placed at `(rect - viewport origin) * scale`.
pub fn plan_frame(display: &DisplayContext, snapshot: &DocumentSnapshot) -> FramePlan {
    let scale = display.scale.get();
    let vp = snapshot.viewport;
    let origin = Vec2::new(vp.left, vp.top);

    let mut draws = Vec::new();
    let mut culled = Vec::new();
    for entry in &snapshot.entries {
        if vp.overlaps(entry.bounding_rect) {
            draws.push(PlannedDraw {
                element: entry.element.clone(),
                dest: entry.bounding_rect.relative_to(origin).scaled(scale),
            });
        } else {
            culled.push(entry.element.id());
        }
    }

    FramePlan {
        transform: snapshot.transform.with_scaled_translation(scale),
        draws,
        culled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::document::ImageEntry;

    fn entry(id: u32, rect: Rect) -> ImageEntry {
        ImageEntry { element: ImageElement::loading(ElementId(id)), bounding_rect: rect }
    }

    fn snapshot(viewport: Rect, transform: Affine, entries: Vec<ImageEntry>) -> DocumentSnapshot {
        DocumentSnapshot { viewport: Viewport::from_rect(viewport), transform, entries }
    }

    fn display(scale: f32) -> DisplayContext {
        DisplayContext::new(800.0, 600.0, RenderScale::from_device_ratio(Some(scale as f64)))
    }

    #[test]
    fn places_rect_in_raster_pixels() {
        let snap = snapshot(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Affine::IDENTITY,
            vec![entry(0, Rect::new(10.0, 20.0, 100.0, 50.0))],
        );
        let plan = plan_frame(&display(2.0), &snap);

        assert_eq!(plan.draws.len(), 1);
        assert_eq!(plan.draws[0].dest, Rect::new(20.0, 40.0, 200.0, 100.0));
    }

    #[test]
    fn offsets_by_viewport_origin() {
        let snap = snapshot(
            Rect::new(50.0, 30.0, 400.0, 300.0),
            Affine::IDENTITY,
            vec![entry(0, Rect::new(60.0, 40.0, 10.0, 10.0))],
        );
        let plan = plan_frame(&display(1.0), &snap);
        assert_eq!(plan.draws[0].dest, Rect::new(10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn culls_only_entries_fully_outside() {
        let snap = snapshot(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Affine::IDENTITY,
            vec![
                entry(0, Rect::new(10.0, 10.0, 100.0, 100.0)),
                entry(1, Rect::new(10.0, 900.0, 100.0, 100.0)),
                // Touches the bottom edge.
                entry(2, Rect::new(10.0, 600.0, 100.0, 100.0)),
                entry(3, Rect::new(-200.0, 10.0, 100.0, 100.0)),
            ],
        );
        let plan = plan_frame(&display(1.0), &snap);

        let drawn: Vec<_> = plan.draws.iter().map(|d| d.element.id()).collect();
        assert_eq!(drawn, vec![ElementId(0), ElementId(2)]);
        assert_eq!(plan.culled, vec![ElementId(1), ElementId(3)]);
    }

    #[test]
    fn scales_translation_not_linear_part() {
        let t = Affine::new(2.0, 0.0, 0.0, 2.0, -50.0, -40.0);
        let snap = snapshot(Rect::new(0.0, 0.0, 800.0, 600.0), t, Vec::new());
        let plan = plan_frame(&display(2.0), &snap);

        assert_eq!(plan.transform, Affine::new(2.0, 0.0, 0.0, 2.0, -100.0, -80.0));
    }
}
