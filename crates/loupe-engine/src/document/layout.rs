use crate::coords::{Affine, Rect, Vec2};

use super::container::{Container, ImageEntry};
use super::element::{ElementId, ImageElement, LoadStatus};

/// Layout parameters for [`Document`].
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Space around the column, in logical pixels.
    pub padding: f32,

    /// Vertical space between images.
    pub gap: f32,

    /// Upper bound on the column width. The column shrinks with the window.
    pub max_column_width: f32,

    /// Aspect ratio (height / width) used for slots whose image is not decoded yet.
    pub placeholder_aspect: f32,

    /// Zoom range. Zoom never goes below 1 so the viewport stays a superset of
    /// the transformed visible region.
    pub max_zoom: f32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            gap: 16.0,
            max_column_width: 960.0,
            placeholder_aspect: 0.75,
            max_zoom: 8.0,
        }
    }
}

/// Scrollable, zoomable single-column document of images.
///
/// Slots are laid out in document space (origin at the column's top-left
/// padding corner). On-screen rects subtract the scroll offset and add the
/// bounds origin; zoom is exposed as the container transform.
pub struct Document {
    config: DocumentConfig,
    bounds: Rect,
    scroll: f32,
    zoom: f32,
    zoom_origin: Vec2,
    elements: Vec<ImageElement>,
    slots: Vec<Rect>,
    content_height: f32,
    layout_dirty: bool,
    next_id: u32,
}

impl Document {
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            bounds: Rect::default(),
            scroll: 0.0,
            zoom: 1.0,
            zoom_origin: Vec2::zero(),
            elements: Vec::new(),
            slots: Vec::new(),
            content_height: 0.0,
            layout_dirty: true,
            next_id: 0,
        }
    }

    /// Appends a not-yet-decoded image and returns its handle.
    pub fn push_loading(&mut self) -> ImageElement {
        let el = ImageElement::loading(self.alloc_id());
        self.push(el.clone());
        el
    }

    /// Appends an existing element.
    pub fn push(&mut self, element: ImageElement) {
        self.elements.push(element);
        self.layout_dirty = true;
    }

    /// Allocates the next element id.
    pub fn alloc_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&ImageElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Requests a relayout, e.g. after an element finished decoding.
    pub fn invalidate_layout(&mut self) {
        self.layout_dirty = true;
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.layout_dirty = true;
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn content_height(&mut self) -> f32 {
        self.ensure_layout();
        self.content_height
    }

    /// Scrolls by `dy` logical pixels, clamped to the content.
    pub fn scroll_by(&mut self, dy: f32) {
        self.ensure_layout();
        let max = (self.content_height - self.bounds.size.y).max(0.0);
        self.scroll = (self.scroll + dy).clamp(0.0, max);
    }

    /// Multiplies the zoom by `factor`, keeping `anchor` (logical, screen space)
    /// fixed on screen.
    pub fn zoom_at(&mut self, factor: f32, anchor: Vec2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_zoom = (self.zoom * factor).clamp(1.0, self.config.max_zoom.max(1.0));
        if new_zoom == self.zoom {
            return;
        }
        self.zoom_origin = anchor;
        self.zoom = new_zoom;
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.zoom_origin = Vec2::zero();
    }

    fn ensure_layout(&mut self) {
        if !self.layout_dirty {
            return;
        }
        self.layout_dirty = false;

        let pad = self.config.padding;
        let avail = (self.bounds.size.x - 2.0 * pad).max(1.0);
        let column_w = avail.min(self.config.max_column_width.max(1.0));
        let x = pad + (avail - column_w) * 0.5;

        self.slots.clear();
        let mut y = pad;
        for el in &self.elements {
            let aspect = match el.natural_size() {
                Some((w, h)) if w > 0 => h as f32 / w as f32,
                _ => self.config.placeholder_aspect,
            };
            let h = column_w * aspect;
            self.slots.push(Rect::new(x, y, column_w, h));
            y += h + self.config.gap;
        }

        if !self.elements.is_empty() {
            y -= self.config.gap;
        }
        self.content_height = y + pad;

        let max = (self.content_height - self.bounds.size.y).max(0.0);
        self.scroll = self.scroll.clamp(0.0, max);
    }

    fn screen_rect(&self, slot: Rect) -> Rect {
        Rect::new(
            self.bounds.origin.x + slot.origin.x,
            self.bounds.origin.y + slot.origin.y - self.scroll,
            slot.size.x,
            slot.size.y,
        )
    }

    /// Recomputes slot rects if bounds or decoded sizes changed.
    ///
    /// [`Container`] queries read the last computed layout; hosts call this once
    /// per frame before handing the document to the renderer.
    pub fn refresh_layout(&mut self) {
        self.ensure_layout();
    }

    /// Refreshes layout and returns on-screen entries.
    pub fn entries(&mut self) -> Vec<ImageEntry> {
        self.ensure_layout();
        self.images()
    }
}

impl Container for Document {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Zoom about `zoom_origin`, relative to the bounds origin.
    fn transform(&self) -> Affine {
        if self.zoom == 1.0 {
            return Affine::IDENTITY;
        }
        let o = self.zoom_origin - self.bounds.origin;
        Affine::translate(o.x, o.y)
            .then(Affine::scale(self.zoom))
            .then(Affine::translate(-o.x, -o.y))
    }

    fn images(&self) -> Vec<ImageEntry> {
        self.elements
            .iter()
            .zip(self.slots.iter())
            .map(|(el, slot)| ImageEntry {
                element: el.clone(),
                bounding_rect: self.screen_rect(*slot),
            })
            .collect()
    }

    fn first_image_status(&self) -> Option<LoadStatus> {
        self.elements.first().map(ImageElement::status)
    }
}
