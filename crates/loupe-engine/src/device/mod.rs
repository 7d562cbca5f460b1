//! GPU device + surface management.
//!
//! - creates the wgpu Adapter/Device/Queue
//! - creates and configures the Surface (swapchain)
//! - acquires and presents surface textures

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
