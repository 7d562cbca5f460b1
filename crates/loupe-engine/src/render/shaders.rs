use std::borrow::Cow;

/// Vertex/fragment source pair handed to [`GpuContext::create_program`].
///
/// The driver treats both strings as opaque.
///
/// [`GpuContext::create_program`]: crate::gpu::GpuContext::create_program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSet {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSet {
    pub fn new(vertex: impl Into<Cow<'static, str>>, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self { vertex: vertex.into(), fragment: fragment.into() }
    }

    /// Built-in lens: full-screen quad plus a radial magnifier around `iMouse`.
    pub fn magnifying_glass() -> Self {
        Self::new(
            include_str!("shaders/lens.vert.wgsl"),
            include_str!("shaders/lens.frag.wgsl"),
        )
    }
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self::magnifying_glass()
    }
}
