//! Loupe engine crate.
//!
//! A magnifying lens rendered by a GPU shader over a document of images. The
//! visible images are rasterized into an offscreen buffer every frame and
//! uploaded as the shader's input texture.
//!
//! - [`render::TextureRenderer`] rasterizes and uploads one frame
//! - [`driver::CanvasDriver`] owns the lens lifecycle and GPU resources
//! - [`window::Runtime`] hosts it in a winit window backed by wgpu

pub mod coords;
pub mod core;
pub mod device;
pub mod document;
pub mod driver;
pub mod gpu;
pub mod input;
pub mod logging;
pub mod pointer;
pub mod raster;
pub mod render;
pub mod time;
pub mod window;
