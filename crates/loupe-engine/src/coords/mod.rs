//! Coordinate and geometry types shared by the document model, the rasterizer
//! and the lens driver.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Raster space is logical space multiplied by a [`RenderScale`].

mod affine;
mod color;
mod rect;
mod scale;
mod vec2;
mod viewport;

pub use affine::Affine;
pub use color::ColorRgba;
pub use rect::Rect;
pub use scale::RenderScale;
pub use vec2::Vec2;
pub use viewport::Viewport;
