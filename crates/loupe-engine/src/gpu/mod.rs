//! GPU context abstraction used by the lens pipeline.
//!
//! [`GpuContext`] is the narrow, handle-based surface the texture renderer and
//! the canvas driver consume. [`WgpuContext`] implements it on top of wgpu;
//! tests substitute a recording fake.

mod context;
mod reflect;
mod wgpu_context;

#[cfg(test)]
pub(crate) mod recording;

pub use context::{
    BlendMode, BufferId, Filter, GpuContext, Primitive, ProgramId, TextureId, TextureParams,
    UniformLocation, Wrap,
};
pub use wgpu_context::WgpuContext;
