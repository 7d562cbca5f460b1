use anyhow::{Context, Result};
use tiny_skia::{IntSize, Pixmap};

use super::context::RasterState;

/// Largest raster edge accepted, in pixels. Matches common GPU texture limits.
pub const MAX_RASTER_DIM: u32 = 8192;

/// Reusable offscreen RGBA surface.
///
/// Invariant: once [`ensure_size`](Self::ensure_size) returns, the surface has
/// exactly the requested (clamped) dimensions. Reallocation discards content.
pub struct PixelBuffer {
    pixmap: Pixmap,
    state: RasterState,
    reallocations: u64,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let (w, h) = clamp_dims(width, height);
        let pixmap = Pixmap::new(w, h).with_context(|| format!("failed to allocate {w}x{h} pixel buffer"))?;
        Ok(Self { pixmap, state: RasterState::default(), reallocations: 0 })
    }

    /// Resizes when dimensions differ. Returns `true` if the surface was reallocated.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> Result<bool> {
        let (w, h) = clamp_dims(width, height);
        if self.pixmap.width() == w && self.pixmap.height() == h {
            return Ok(false);
        }

        self.pixmap = Pixmap::new(w, h).with_context(|| format!("failed to allocate {w}x{h} pixel buffer"))?;
        self.reallocations += 1;
        log::debug!("pixel buffer resized to {w}x{h}");
        Ok(true)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// RGBA8 rows, top row first, `width * 4` bytes per row.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Drawing state currently applied to this buffer.
    #[inline]
    pub fn state(&self) -> RasterState {
        self.state
    }

    /// Number of reallocations since creation.
    #[inline]
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    pub(super) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub(super) fn set_state(&mut self, state: RasterState) {
        self.state = state;
    }
}

fn clamp_dims(width: u32, height: u32) -> (u32, u32) {
    (width.clamp(1, MAX_RASTER_DIM), height.clamp(1, MAX_RASTER_DIM))
}

/// Builds a pixmap from straight-alpha RGBA8 pixels (as produced by image decoders).
pub fn pixmap_from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> Result<Pixmap> {
    let expected = width as usize * height as usize * 4;
    anyhow::ensure!(
        rgba.len() == expected,
        "rgba buffer has {} bytes, expected {expected} for {width}x{height}",
        rgba.len()
    );

    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
            px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
            px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
        }
    }

    let size = IntSize::from_wh(width, height).context("image has zero size")?;
    Pixmap::from_vec(rgba, size).context("failed to wrap decoded pixels")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_size_reallocates_only_on_change() {
        let mut buf = PixelBuffer::new(1600, 1200).unwrap();
        assert!(!buf.ensure_size(1600, 1200).unwrap());
        assert!(buf.ensure_size(800, 600).unwrap());
        assert_eq!((buf.width(), buf.height()), (800, 600));
        assert_eq!(buf.data().len(), 800 * 600 * 4);
        assert_eq!(buf.reallocations(), 1);
    }

    #[test]
    fn dims_are_clamped() {
        let buf = PixelBuffer::new(0, MAX_RASTER_DIM + 10).unwrap();
        assert_eq!((buf.width(), buf.height()), (1, MAX_RASTER_DIM));
    }

    #[test]
    fn rgba8_is_premultiplied() {
        let p = pixmap_from_rgba8(1, 1, vec![200, 100, 50, 128]).unwrap();
        let c = p.pixel(0, 0).unwrap();
        assert_eq!((c.red(), c.green(), c.blue(), c.alpha()), (100, 50, 25, 128));
    }

    #[test]
    fn rgba8_rejects_short_buffer() {
        assert!(pixmap_from_rgba8(2, 2, vec![0; 8]).is_err());
    }
}
