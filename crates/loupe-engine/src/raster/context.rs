use tiny_skia::{FilterQuality, Paint, Pixmap, PixmapPaint, Rect as SkRect};

use crate::coords::{Affine, ColorRgba, Rect};

use super::buffer::PixelBuffer;

/// Image resampling quality used when drawing scaled images.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Smoothing {
    Off,
    #[default]
    Low,
    High,
}

impl Smoothing {
    fn quality(self) -> FilterQuality {
        match self {
            Smoothing::Off => FilterQuality::Nearest,
            Smoothing::Low => FilterQuality::Bilinear,
            Smoothing::High => FilterQuality::Bicubic,
        }
    }
}

/// Mutable drawing state of a raster pass.
///
/// `RasterState::default()` is the baseline every pass must restore.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterState {
    pub transform: Affine,
    pub fill: ColorRgba,
    pub smoothing: Smoothing,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: ColorRgba::black(),
            smoothing: Smoothing::Low,
        }
    }
}

/// Scoped drawing context over a [`PixelBuffer`].
///
/// State changes are written through to the buffer while the context is alive
/// and reset to [`RasterState::default`] when it is finished or dropped, so no
/// transform or fill leaks into the next pass.
pub struct RasterContext<'a> {
    buffer: &'a mut PixelBuffer,
    state: RasterState,
}

impl<'a> RasterContext<'a> {
    pub fn begin(buffer: &'a mut PixelBuffer) -> Self {
        let state = buffer.state();
        Self { buffer, state }
    }

    #[inline]
    pub fn state(&self) -> RasterState {
        self.state
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
        self.buffer.set_state(self.state);
    }

    pub fn set_fill(&mut self, fill: ColorRgba) {
        self.state.fill = fill;
        self.buffer.set_state(self.state);
    }

    pub fn set_smoothing(&mut self, smoothing: Smoothing) {
        self.state.smoothing = smoothing;
        self.buffer.set_state(self.state);
    }

    /// Fills `rect` (raster pixels, current transform applied) with the fill color.
    pub fn fill_rect(&mut self, rect: Rect) {
        let Some(sk_rect) = SkRect::from_xywh(rect.origin.x, rect.origin.y, rect.size.x, rect.size.y)
        else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(self.state.fill.to_skia());
        paint.anti_alias = false;

        let transform = self.state.transform.to_skia();
        self.buffer.pixmap_mut().fill_rect(sk_rect, &paint, transform, None);
    }

    /// Draws `image` scaled into `dest` (raster pixels, current transform applied).
    ///
    /// Returns `false` when nothing could be drawn (empty source or degenerate rect).
    pub fn draw_image(&mut self, image: &Pixmap, dest: Rect) -> bool {
        let (sw, sh) = (image.width() as f32, image.height() as f32);
        if sw <= 0.0 || sh <= 0.0 || dest.is_empty() || !dest.is_finite() {
            return false;
        }

        let placement = Affine::translate(dest.origin.x, dest.origin.y)
            .then(Affine::new(dest.size.x / sw, 0.0, 0.0, dest.size.y / sh, 0.0, 0.0));
        let transform = self.state.transform.then(placement);
        if !transform.is_finite() {
            return false;
        }

        let paint = PixmapPaint {
            quality: self.state.smoothing.quality(),
            ..PixmapPaint::default()
        };

        self.buffer
            .pixmap_mut()
            .draw_pixmap(0, 0, image.as_ref(), &paint, transform.to_skia(), None);
        true
    }

    /// Resets state to the baseline and releases the buffer.
    pub fn finish(self) {}
}

impl Drop for RasterContext<'_> {
    fn drop(&mut self) {
        self.state = RasterState::default();
        self.buffer.set_state(self.state);
    }
}
