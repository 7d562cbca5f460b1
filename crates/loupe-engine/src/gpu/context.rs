use anyhow::Result;

use crate::raster::PixelBuffer;

/// Opaque 2D texture handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

/// Opaque linked shader program handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub u32);

/// Opaque vertex buffer handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub u32);

/// Resolved uniform location within a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

/// Sampling parameters of a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureParams {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

impl TextureParams {
    /// Linear filtering, edge clamping on both axes.
    pub const LINEAR_CLAMP: TextureParams = TextureParams {
        min_filter: Filter::Linear,
        mag_filter: Filter::Linear,
        wrap_s: Wrap::ClampToEdge,
        wrap_t: Wrap::ClampToEdge,
    };
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    SourceOver,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    TriangleStrip,
    TriangleList,
}

/// GPU operations the lens pipeline relies on.
///
/// Handles are only meaningful to the context that created them. Deleting an
/// unknown or already-deleted handle is an error.
pub trait GpuContext {
    // ── state ──────────────────────────────────────────────────────────────

    fn enable_blending(&mut self, mode: BlendMode);

    /// Sets the drawable viewport in logical pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Resizes the output surface in logical pixels.
    fn resize_surface(&mut self, width: u32, height: u32);

    // ── programs ───────────────────────────────────────────────────────────

    /// Compiles and links a program. Fails on compile or link errors.
    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId>;

    fn use_program(&mut self, program: ProgramId);

    /// Resolves a vertex attribute by name. `None` when the program has no such attribute.
    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;

    /// Binds `buffer` as tightly packed `components`-wide f32 data for `location`.
    fn bind_vertex_attribute(&mut self, location: u32, buffer: BufferId, components: u32);

    /// Resolves a uniform by name. `None` when the program does not declare it.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32);

    fn set_uniform_vec2(&mut self, location: UniformLocation, x: f32, y: f32);

    fn delete_program(&mut self, program: ProgramId) -> Result<()>;

    // ── buffers ────────────────────────────────────────────────────────────

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId>;

    fn delete_buffer(&mut self, buffer: BufferId) -> Result<()>;

    // ── textures ───────────────────────────────────────────────────────────

    fn create_texture(&mut self) -> Result<TextureId>;

    /// Binds `texture` to texture unit 0.
    fn bind_texture(&mut self, texture: TextureId);

    /// Replaces the full image of `texture` with the buffer's RGBA content.
    fn upload_texture(&mut self, texture: TextureId, pixels: &PixelBuffer);

    fn set_texture_params(&mut self, texture: TextureId, params: TextureParams);

    fn delete_texture(&mut self, texture: TextureId) -> Result<()>;

    // ── draw ───────────────────────────────────────────────────────────────

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);
}
