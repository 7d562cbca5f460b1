use crate::coords::{Affine, Rect, Viewport};

use super::element::{ImageElement, LoadStatus};

/// A candidate visual source: an image plus its current on-screen rect.
///
/// `bounding_rect` is the rect of the image's layout slot in logical pixels, in
/// the same space as [`Container::bounds`] and before the container transform.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub element: ImageElement,
    pub bounding_rect: Rect,
}

/// Layout and geometry queries the lens needs from a document container.
pub trait Container {
    /// Current on-screen bounds in logical pixels.
    fn bounds(&self) -> Rect;

    /// Current layout transform. Identity when the container has none.
    fn transform(&self) -> Affine {
        Affine::IDENTITY
    }

    /// Image entries in paint order, with freshly computed bounding rects.
    fn images(&self) -> Vec<ImageEntry>;

    /// Load status of the first image, or `None` when the container has no image.
    fn first_image_status(&self) -> Option<LoadStatus>;

    /// Captures bounds, transform and entries for one frame.
    fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            viewport: Viewport::from_rect(self.bounds()),
            transform: self.transform(),
            entries: self.images(),
        }
    }
}

/// Immutable per-frame capture of a container.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub viewport: Viewport,
    pub transform: Affine,
    pub entries: Vec<ImageEntry>,
}
