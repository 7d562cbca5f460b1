use std::cell::RefCell;
use std::rc::Rc;

use tiny_skia::Pixmap;

/// Stable identifier of an image element within its document.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// Completion state of an image load.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    Failed,
}

impl LoadStatus {
    /// Loaded and failed both count as "done" for first-content gating.
    #[inline]
    pub fn is_settled(self) -> bool {
        !matches!(self, LoadStatus::Loading)
    }
}

enum ImageState {
    Loading,
    Ready(Pixmap),
    Failed(String),
}

struct Inner {
    id: ElementId,
    state: RefCell<ImageState>,
}

/// Shared handle to a raster image source.
///
/// Cloning is cheap and yields a handle to the same element. The decoded pixels
/// are premultiplied RGBA (`tiny_skia` layout). Single-threaded by construction.
#[derive(Clone)]
pub struct ImageElement(Rc<Inner>);

impl ImageElement {
    /// Creates an element whose pixels are not yet available.
    pub fn loading(id: ElementId) -> Self {
        Self(Rc::new(Inner { id, state: RefCell::new(ImageState::Loading) }))
    }

    /// Creates an element that is already decoded.
    pub fn ready(id: ElementId, pixmap: Pixmap) -> Self {
        Self(Rc::new(Inner { id, state: RefCell::new(ImageState::Ready(pixmap)) }))
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.0.id
    }

    pub fn status(&self) -> LoadStatus {
        match &*self.0.state.borrow() {
            ImageState::Loading => LoadStatus::Loading,
            ImageState::Ready(_) => LoadStatus::Loaded,
            ImageState::Failed(_) => LoadStatus::Failed,
        }
    }

    /// Marks the load as complete.
    pub fn set_ready(&self, pixmap: Pixmap) {
        *self.0.state.borrow_mut() = ImageState::Ready(pixmap);
    }

    /// Marks the load as failed. The element stays in the document and draws nothing.
    pub fn set_failed(&self, reason: impl Into<String>) {
        *self.0.state.borrow_mut() = ImageState::Failed(reason.into());
    }

    /// Failure reason, if the load failed.
    pub fn failure(&self) -> Option<String> {
        match &*self.0.state.borrow() {
            ImageState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Decoded size in pixels, if available.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        match &*self.0.state.borrow() {
            ImageState::Ready(p) => Some((p.width(), p.height())),
            _ => None,
        }
    }

    /// Runs `f` with the decoded pixels. Returns `None` when not decodable yet.
    pub fn with_pixmap<R>(&self, f: impl FnOnce(&Pixmap) -> R) -> Option<R> {
        match &*self.0.state.borrow() {
            ImageState::Ready(p) => Some(f(p)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ImageElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageElement")
            .field("id", &self.0.id)
            .field("status", &self.status())
            .finish()
    }
}
