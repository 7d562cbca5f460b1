//! Lens rendering: shader sources, per-frame planning and texture upload.
//!
//! Conventions:
//! - document geometry is in logical pixels (top-left origin, +Y down)
//! - the pixel buffer and the GPU texture are in raster pixels (logical * scale)
//! - the fragment shader works in logical pixels with a bottom-left origin

mod plan;
mod shaders;
mod texture;

pub use plan::{plan_frame, DisplayContext, FramePlan, PlannedDraw};
pub use shaders::ShaderSet;
pub use texture::{DrawnEntry, RasterReport, TextureRenderer, UpdateOptions};
