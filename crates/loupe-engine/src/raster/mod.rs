//! CPU-side raster staging for the lens texture.
//!
//! [`PixelBuffer`] is the reusable offscreen surface; [`RasterContext`] is the
//! scoped drawing state applied to it for one rasterization pass.

mod buffer;
mod context;

pub use buffer::{pixmap_from_rgba8, PixelBuffer, MAX_RASTER_DIM};
pub use context::{RasterContext, RasterState, Smoothing};
