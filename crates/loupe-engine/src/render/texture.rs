use crate::coords::{Affine, ColorRgba, Rect};
use crate::document::{Container, ElementId};
use crate::gpu::{GpuContext, TextureId, TextureParams};
use crate::raster::{PixelBuffer, RasterContext, Smoothing, MAX_RASTER_DIM};

use super::plan::{plan_frame, DisplayContext};

/// Per-call overrides of the raster size, in logical pixels.
///
/// Unset dimensions fall back to the window size of the [`DisplayContext`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    pub viewport_width: Option<f32>,
    pub viewport_height: Option<f32>,
}

impl UpdateOptions {
    pub fn sized(width: f32, height: f32) -> Self {
        Self { viewport_width: Some(width), viewport_height: Some(height) }
    }

    /// Raster size in physical pixels: `floor(logical * scale)`, at least 1.
    pub fn raster_size(&self, display: &DisplayContext) -> (u32, u32) {
        let w = self.viewport_width.unwrap_or(display.window_width);
        let h = self.viewport_height.unwrap_or(display.window_height);
        (display.scale.to_raster_px(w), display.scale.to_raster_px(h))
    }
}

/// An entry that reached the pixel buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawnEntry {
    pub id: ElementId,
    /// Destination in raster pixels, before the raster transform.
    pub dest: Rect,
}

/// What one [`TextureRenderer::update_texture`] call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterReport {
    pub width: u32,
    pub height: u32,
    pub drawn: Vec<DrawnEntry>,
    /// Culled by the viewport test.
    pub skipped: Vec<ElementId>,
    /// Visible but not decoded (still loading or failed).
    pub pending: Vec<ElementId>,
}

/// Mirrors the visible part of a container into a GPU texture.
///
/// Owns the offscreen [`PixelBuffer`], which is reused across calls and only
/// reallocated when the requested size changes.
pub struct TextureRenderer {
    buffer: Option<PixelBuffer>,
    background: ColorRgba,
}

impl TextureRenderer {
    pub fn new(background: ColorRgba) -> Self {
        Self { buffer: None, background: background.opaque() }
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    /// Rasterizes the visible images of `container` and uploads them to `texture`.
    ///
    /// Returns `None` without touching the GPU when there is no container.
    pub fn update_texture(
        &mut self,
        gpu: &mut dyn GpuContext,
        container: Option<&dyn Container>,
        texture: TextureId,
        display: &DisplayContext,
        options: UpdateOptions,
    ) -> Option<RasterReport> {
        let container = container?;
        let snapshot = container.snapshot();
        let plan = plan_frame(display, &snapshot);
        let (w, h) = options.raster_size(display);

        let fresh = self.buffer.is_none();
        if fresh {
            match PixelBuffer::new(w, h) {
                Ok(buf) => self.buffer = Some(buf),
                Err(e) => {
                    log::warn!("lens raster skipped: {e:#}");
                    return None;
                }
            }
        }
        let buffer = self.buffer.as_mut()?;
        let reallocated = match buffer.ensure_size(w, h) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("lens raster skipped: {e:#}");
                return None;
            }
        };

        // The plan is in unclamped raster pixels; squeeze it into the clamped buffer
        // so the texture still covers the whole window.
        let fit = fit_to_buffer((w, h), (buffer.width(), buffer.height()));
        if (fresh || reallocated) && !fit.is_identity() {
            log::warn!(
                "lens raster {w}x{h} exceeds {MAX_RASTER_DIM}px; rendering at {}x{}",
                buffer.width(),
                buffer.height()
            );
        }

        let mut report = RasterReport {
            width: buffer.width(),
            height: buffer.height(),
            skipped: plan.culled,
            ..RasterReport::default()
        };

        let mut ctx = RasterContext::begin(buffer);
        ctx.set_transform(Affine::IDENTITY);
        ctx.set_fill(self.background);
        ctx.fill_rect(Rect::new(0.0, 0.0, ctx.width() as f32, ctx.height() as f32));

        ctx.set_smoothing(Smoothing::High);
        ctx.set_transform(fit.then(plan.transform));
        for draw in &plan.draws {
            let drew = draw
                .element
                .with_pixmap(|pixmap| ctx.draw_image(pixmap, draw.dest))
                .unwrap_or(false);
            if drew {
                report.drawn.push(DrawnEntry { id: draw.element.id(), dest: draw.dest });
            } else {
                report.pending.push(draw.element.id());
            }
        }
        ctx.finish();

        gpu.bind_texture(texture);
        gpu.upload_texture(texture, buffer);
        gpu.set_texture_params(texture, TextureParams::LINEAR_CLAMP);

        log::trace!(
            "lens raster {}x{}: {} drawn, {} pending, {} culled",
            report.width,
            report.height,
            report.drawn.len(),
            report.pending.len(),
            report.skipped.len()
        );
        Some(report)
    }
}

fn fit_to_buffer(requested: (u32, u32), actual: (u32, u32)) -> Affine {
    if requested == actual {
        return Affine::IDENTITY;
    }
    let sx = actual.0 as f32 / requested.0 as f32;
    let sy = actual.1 as f32 / requested.1 as f32;
    Affine::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
}

impl Default for TextureRenderer {
    fn default() -> Self {
        Self::new(ColorRgba::white())
    }
}

#[cfg(test)]
mod tests {
    use tiny_skia::Pixmap;

    use super::*;
    use crate::coords::{RenderScale, Vec2};
    use crate::document::{Document, DocumentConfig, ImageElement, ImageEntry, LoadStatus};
    use crate::gpu::recording::{GpuCall, RecordingGpu};
    use crate::raster::RasterState;

    // ── helpers ────────────────────────────────────────────────────────────

    struct Fixed {
        bounds: Rect,
        transform: Affine,
        entries: Vec<ImageEntry>,
    }

    impl Fixed {
        fn new(w: f32, h: f32) -> Self {
            Self { bounds: Rect::new(0.0, 0.0, w, h), transform: Affine::IDENTITY, entries: Vec::new() }
        }

        fn with(mut self, id: u32, rect: Rect, rgba: Option<[u8; 4]>) -> Self {
            let element = match rgba {
                Some(c) => ImageElement::ready(ElementId(id), solid(4, 4, c)),
                None => ImageElement::loading(ElementId(id)),
            };
            self.entries.push(ImageEntry { element, bounding_rect: rect });
            self
        }
    }

    impl Container for Fixed {
        fn bounds(&self) -> Rect {
            self.bounds
        }

        fn transform(&self) -> Affine {
            self.transform
        }

        fn images(&self) -> Vec<ImageEntry> {
            self.entries.clone()
        }

        fn first_image_status(&self) -> Option<LoadStatus> {
            self.entries.first().map(|e| e.element.status())
        }
    }

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Pixmap {
        let mut p = Pixmap::new(w, h).unwrap();
        p.fill(tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        p
    }

    fn display(w: f32, h: f32, scale: f64) -> DisplayContext {
        DisplayContext::new(w, h, RenderScale::from_device_ratio(Some(scale)))
    }

    fn px(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [data[i], data[i + 1], data[i + 2], data[i + 3]]
    }

    const TEX: TextureId = TextureId(7);

    // ── contract ───────────────────────────────────────────────────────────

    #[test]
    fn absent_container_is_a_no_op() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let report = r.update_texture(&mut gpu, None, TEX, &display(800.0, 600.0, 1.0), UpdateOptions::default());

        assert!(report.is_none());
        assert!(gpu.calls.is_empty());
        assert!(r.buffer().is_none());
    }

    #[test]
    fn empty_container_still_fills_and_uploads() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(20.0, 10.0);
        r.update_texture(&mut gpu, Some(&c), TEX, &display(20.0, 10.0, 1.0), UpdateOptions::default())
            .unwrap();

        let uploads = gpu.uploads();
        assert_eq!(uploads.len(), 1);
        let (w, h, pixels) = uploads[0];
        assert_eq!((w, h), (20, 10));
        assert!(pixels.iter().all(|b| *b == 255));
    }

    #[test]
    fn binds_uploads_and_sets_params_in_order() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(4.0, 4.0);
        r.update_texture(&mut gpu, Some(&c), TEX, &display(4.0, 4.0, 1.0), UpdateOptions::default());

        assert!(matches!(gpu.calls[0], GpuCall::BindTexture(TEX)));
        assert!(matches!(gpu.calls[1], GpuCall::Upload { texture: TEX, .. }));
        assert_eq!(gpu.calls[2], GpuCall::SetParams(TEX, TextureParams::LINEAR_CLAMP));
    }

    #[test]
    fn offscreen_image_is_skipped_visible_sibling_drawn() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(100.0, 100.0)
            .with(0, Rect::new(10.0, 10.0, 20.0, 20.0), Some([255, 0, 0, 255]))
            .with(1, Rect::new(10.0, 500.0, 20.0, 20.0), Some([0, 0, 255, 255]));
        let report = r
            .update_texture(&mut gpu, Some(&c), TEX, &display(100.0, 100.0, 1.0), UpdateOptions::default())
            .unwrap();

        assert_eq!(report.drawn.len(), 1);
        assert_eq!(report.drawn[0].id, ElementId(0));
        assert_eq!(report.skipped, vec![ElementId(1)]);

        let (w, _, pixels) = gpu.uploads()[0];
        assert_eq!(px(pixels, w, 20, 20), [255, 0, 0, 255]);
        assert_eq!(px(pixels, w, 50, 50), [255, 255, 255, 255]);
    }

    #[test]
    fn scale_two_places_rect_at_double_coordinates() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(800.0, 600.0).with(0, Rect::new(10.0, 20.0, 100.0, 50.0), Some([0, 255, 0, 255]));
        let report = r
            .update_texture(&mut gpu, Some(&c), TEX, &display(800.0, 600.0, 2.0), UpdateOptions::default())
            .unwrap();

        assert_eq!(report.drawn[0].dest, Rect::new(20.0, 40.0, 200.0, 100.0));
        let (w, h, pixels) = gpu.uploads()[0];
        assert_eq!((w, h), (1600, 1200));
        assert_eq!(px(pixels, w, 21, 41), [0, 255, 0, 255]);
        assert_eq!(px(pixels, w, 218, 138), [0, 255, 0, 255]);
        assert_eq!(px(pixels, w, 230, 150), [255, 255, 255, 255]);
    }

    #[test]
    fn oversized_raster_is_squeezed_into_the_clamped_buffer() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(5000.0, 10.0).with(0, Rect::new(2500.0, 0.0, 2500.0, 10.0), Some([255, 0, 0, 255]));
        r.update_texture(&mut gpu, Some(&c), TEX, &display(5000.0, 10.0, 2.0), UpdateOptions::default())
            .unwrap();

        let (w, h, pixels) = gpu.uploads()[0];
        assert_eq!((w, h), (MAX_RASTER_DIM, 20));
        // The right half of the window lands on the right half of the texture.
        assert_eq!(px(pixels, w, 4000, 10), [255, 255, 255, 255]);
        assert_eq!(px(pixels, w, 4200, 10), [255, 0, 0, 255]);
        assert_eq!(px(pixels, w, MAX_RASTER_DIM - 1, 10), [255, 0, 0, 255]);
    }

    #[test]
    fn shrinking_window_resizes_buffer() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(800.0, 600.0);

        r.update_texture(&mut gpu, Some(&c), TEX, &display(800.0, 600.0, 2.0), UpdateOptions::default());
        r.update_texture(&mut gpu, Some(&c), TEX, &display(400.0, 300.0, 2.0), UpdateOptions::default());

        let sizes: Vec<_> = gpu.uploads().iter().map(|(w, h, _)| (*w, *h)).collect();
        assert_eq!(sizes, vec![(1600, 1200), (800, 600)]);
        assert_eq!(r.buffer().unwrap().reallocations(), 1);
    }

    #[test]
    fn viewport_override_wins_over_window() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(800.0, 600.0);
        let report = r
            .update_texture(&mut gpu, Some(&c), TEX, &display(800.0, 600.0, 1.5), UpdateOptions::sized(101.0, 33.0))
            .unwrap();
        assert_eq!((report.width, report.height), (151, 49));
    }

    #[test]
    fn unchanged_document_uploads_identical_pixels() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(64.0, 64.0)
            .with(0, Rect::new(3.5, 7.25, 30.0, 12.0), Some([10, 200, 30, 255]))
            .with(1, Rect::new(20.0, 30.0, 40.0, 40.0), Some([0, 0, 0, 128]));
        let d = display(64.0, 64.0, 1.25);

        r.update_texture(&mut gpu, Some(&c), TEX, &d, UpdateOptions::default());
        r.update_texture(&mut gpu, Some(&c), TEX, &d, UpdateOptions::default());

        let uploads = gpu.uploads();
        assert_eq!(uploads[0], uploads[1]);
        assert_eq!(r.buffer().unwrap().reallocations(), 0);
    }

    #[test]
    fn undecoded_image_is_planned_not_drawn() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let c = Fixed::new(50.0, 50.0).with(0, Rect::new(0.0, 0.0, 10.0, 10.0), None);
        let report = r
            .update_texture(&mut gpu, Some(&c), TEX, &display(50.0, 50.0, 1.0), UpdateOptions::default())
            .unwrap();

        assert!(report.drawn.is_empty());
        assert_eq!(report.pending, vec![ElementId(0)]);
        assert_eq!(gpu.uploads().len(), 1);
    }

    #[test]
    fn raster_state_is_back_at_baseline() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let mut c = Fixed::new(40.0, 40.0).with(0, Rect::new(0.0, 0.0, 10.0, 10.0), Some([1, 2, 3, 255]));
        c.transform = Affine::new(2.0, 0.0, 0.0, 2.0, 5.0, 5.0);
        r.update_texture(&mut gpu, Some(&c), TEX, &display(40.0, 40.0, 2.0), UpdateOptions::default());

        assert_eq!(r.buffer().unwrap().state(), RasterState::default());
    }

    #[test]
    fn zoom_transform_translation_is_scaled() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        // 2x zoom about (10,10): logical (10,10) stays put, so raster (20,20) does too.
        let mut c = Fixed::new(40.0, 40.0).with(0, Rect::new(10.0, 10.0, 5.0, 5.0), Some([255, 0, 0, 255]));
        c.transform = Affine::new(2.0, 0.0, 0.0, 2.0, -10.0, -10.0);
        r.update_texture(&mut gpu, Some(&c), TEX, &display(40.0, 40.0, 2.0), UpdateOptions::default());

        let (w, _, pixels) = gpu.uploads()[0];
        assert_eq!(px(pixels, w, 21, 21), [255, 0, 0, 255]);
        // Zoomed image spans raster 20..40; unzoomed it would stop at 30.
        assert_eq!(px(pixels, w, 35, 35), [255, 0, 0, 255]);
        assert_eq!(px(pixels, w, 18, 18), [255, 255, 255, 255]);
    }

    #[test]
    fn renders_scrolled_document() {
        let mut gpu = RecordingGpu::new();
        let mut r = TextureRenderer::default();
        let mut doc = Document::new(DocumentConfig {
            padding: 0.0,
            gap: 0.0,
            max_column_width: 100.0,
            placeholder_aspect: 1.0,
            max_zoom: 4.0,
        });
        doc.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        let top = doc.push_loading();
        let bottom = doc.push_loading();
        top.set_ready(solid(1, 1, [255, 0, 0, 255]));
        bottom.set_ready(solid(1, 1, [0, 0, 255, 255]));
        doc.invalidate_layout();
        doc.scroll_by(150.0);
        doc.zoom_at(1.0, Vec2::zero());
        doc.refresh_layout();

        let report = r
            .update_texture(&mut gpu, Some(&doc), TEX, &display(100.0, 100.0, 1.0), UpdateOptions::default())
            .unwrap();

        // Scrolled by 100 (clamped): the first image touches the top edge, the second fills the view.
        assert_eq!(report.drawn.len(), 2);
        let (w, _, pixels) = gpu.uploads()[0];
        assert_eq!(px(pixels, w, 50, 50), [0, 0, 255, 255]);
    }
}
