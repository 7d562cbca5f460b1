//! Recording [`GpuContext`] used by unit tests in place of a real device.

use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::raster::PixelBuffer;

use super::context::{
    BlendMode, BufferId, GpuContext, Primitive, ProgramId, TextureId, TextureParams,
    UniformLocation,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GpuCall {
    EnableBlending(BlendMode),
    SetViewport(u32, u32),
    ResizeSurface(u32, u32),
    CreateProgram(ProgramId),
    UseProgram(ProgramId),
    BindAttribute(u32, BufferId, u32),
    SetUniformI32(UniformLocation, i32),
    SetUniformVec2(UniformLocation, f32, f32),
    DeleteProgram(ProgramId),
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    CreateTexture(TextureId),
    BindTexture(TextureId),
    Upload { texture: TextureId, width: u32, height: u32, pixels: Vec<u8> },
    SetParams(TextureId, TextureParams),
    DeleteTexture(TextureId),
    Draw(Primitive, u32, u32),
}

impl GpuCall {
    /// Calls that allocate a GPU resource.
    pub(crate) fn is_create(&self) -> bool {
        matches!(
            self,
            GpuCall::CreateProgram(_) | GpuCall::CreateBuffer(_) | GpuCall::CreateTexture(_)
        )
    }
}

/// Uniform names the fake "declares", in location order.
pub(crate) const LENS_UNIFORMS: [&str; 3] = ["iResolution", "iMouse", "iChannel0"];

#[derive(Default)]
pub(crate) struct RecordingGpu {
    pub calls: Vec<GpuCall>,
    pub fail_program: bool,
    pub fail_texture: bool,
    pub fail_texture_delete: bool,
    pub declared_uniforms: Vec<&'static str>,
    next_id: u32,
    textures: HashSet<u32>,
    programs: HashSet<u32>,
    buffers: HashSet<u32>,
}

impl RecordingGpu {
    pub(crate) fn new() -> Self {
        Self { declared_uniforms: LENS_UNIFORMS.to_vec(), ..Self::default() }
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn uploads(&self) -> Vec<(u32, u32, &[u8])> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::Upload { width, height, pixels, .. } => {
                    Some((*width, *height, pixels.as_slice()))
                }
                _ => None,
            })
            .collect()
    }

    pub(crate) fn draw_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, GpuCall::Draw(..))).count()
    }

    pub(crate) fn create_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_create()).count()
    }

    pub(crate) fn delete_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    GpuCall::DeleteProgram(_) | GpuCall::DeleteBuffer(_) | GpuCall::DeleteTexture(_)
                )
            })
            .count()
    }

    /// Resources created and not yet deleted.
    pub(crate) fn live_resources(&self) -> usize {
        self.textures.len() + self.programs.len() + self.buffers.len()
    }

    pub(crate) fn index_of(&self, pred: impl Fn(&GpuCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl GpuContext for RecordingGpu {
    fn enable_blending(&mut self, mode: BlendMode) {
        self.calls.push(GpuCall::EnableBlending(mode));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(GpuCall::SetViewport(width, height));
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.calls.push(GpuCall::ResizeSurface(width, height));
    }

    fn create_program(&mut self, _vertex_src: &str, _fragment_src: &str) -> Result<ProgramId> {
        if self.fail_program {
            bail!("fragment shader: syntax error");
        }
        let id = self.alloc();
        self.programs.insert(id);
        self.calls.push(GpuCall::CreateProgram(ProgramId(id)));
        Ok(ProgramId(id))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn attribute_location(&mut self, _program: ProgramId, name: &str) -> Option<u32> {
        (name == "aPosition").then_some(0)
    }

    fn bind_vertex_attribute(&mut self, location: u32, buffer: BufferId, components: u32) {
        self.calls.push(GpuCall::BindAttribute(location, buffer, components));
    }

    fn uniform_location(&mut self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.declared_uniforms
            .iter()
            .position(|n| *n == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        self.calls.push(GpuCall::SetUniformI32(location, value));
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, x: f32, y: f32) {
        self.calls.push(GpuCall::SetUniformVec2(location, x, y));
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<()> {
        if !self.programs.remove(&program.0) {
            bail!("unknown program {program:?}");
        }
        self.calls.push(GpuCall::DeleteProgram(program));
        Ok(())
    }

    fn create_vertex_buffer(&mut self, _data: &[f32]) -> Result<BufferId> {
        let id = self.alloc();
        self.buffers.insert(id);
        self.calls.push(GpuCall::CreateBuffer(BufferId(id)));
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> Result<()> {
        if !self.buffers.remove(&buffer.0) {
            bail!("unknown buffer {buffer:?}");
        }
        self.calls.push(GpuCall::DeleteBuffer(buffer));
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureId> {
        if self.fail_texture {
            bail!("out of memory allocating texture");
        }
        let id = self.alloc();
        self.textures.insert(id);
        self.calls.push(GpuCall::CreateTexture(TextureId(id)));
        Ok(TextureId(id))
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.calls.push(GpuCall::BindTexture(texture));
    }

    fn upload_texture(&mut self, texture: TextureId, pixels: &PixelBuffer) {
        self.calls.push(GpuCall::Upload {
            texture,
            width: pixels.width(),
            height: pixels.height(),
            pixels: pixels.data().to_vec(),
        });
    }

    fn set_texture_params(&mut self, texture: TextureId, params: TextureParams) {
        self.calls.push(GpuCall::SetParams(texture, params));
    }

    fn delete_texture(&mut self, texture: TextureId) -> Result<()> {
        if self.fail_texture_delete {
            bail!("context lost while deleting {texture:?}");
        }
        if !self.textures.remove(&texture.0) {
            bail!("unknown texture {texture:?}");
        }
        self.calls.push(GpuCall::DeleteTexture(texture));
        Ok(())
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.calls.push(GpuCall::Draw(primitive, first, count));
    }
}
