use std::collections::HashMap;

use anyhow::{anyhow, Result};
use wgpu::util::DeviceExt;

use crate::raster::PixelBuffer;

use super::context::{
    BlendMode, BufferId, Filter, GpuContext, Primitive, ProgramId, TextureId, TextureParams,
    UniformLocation, Wrap,
};
use super::reflect::{reflect_program, ProgramLayout};

/// Size of each `vec2<f32>` uniform buffer (padded to 16 bytes).
const UNIFORM_SIZE: u64 = 16;

struct Program {
    layout: ProgramLayout,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// binding → (buffer, CPU value)
    uniforms: HashMap<u32, (wgpu::Buffer, [f32; 2])>,
    /// Texture unit selected for each texture binding. Only unit 0 exists.
    bind_group: Option<(TextureId, u64, wgpu::BindGroup)>,
}

struct Storage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct TextureSlot {
    storage: Option<Storage>,
    params: TextureParams,
    sampler: wgpu::Sampler,
    /// Bumped whenever storage or sampler is replaced; bind groups key on it.
    generation: u64,
}

/// Frame target attached by the host for the duration of one frame.
struct Target {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// [`GpuContext`] backed by wgpu.
///
/// - programs are render pipelines built from a WGSL vertex/fragment pair; group 0
///   bindings are reflected from the sources
/// - each `vec2<f32>` uniform gets its own small uniform buffer
/// - texture storage is recreated internally when the uploaded size changes,
///   the [`TextureId`] stays valid
/// - `draw_arrays` records one render pass into the attached frame target and
///   submits it immediately, so uploads queued earlier in the tick land first
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    scale_factor: f32,

    blend: Option<wgpu::BlendState>,
    surface_size: (u32, u32),
    viewport: Option<(u32, u32)>,

    next_id: u32,
    programs: HashMap<u32, Program>,
    buffers: HashMap<u32, wgpu::Buffer>,
    textures: HashMap<u32, TextureSlot>,

    active_program: Option<ProgramId>,
    bound_texture: Option<TextureId>,
    vertex_buffer: Option<BufferId>,

    target: Option<Target>,
    warned_no_target: bool,
}

impl WgpuContext {
    /// `scale_factor` converts the logical sizes passed to [`GpuContext`] into
    /// surface pixels.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        scale_factor: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            scale_factor: if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 },
            blend: None,
            surface_size: (0, 0),
            viewport: None,
            next_id: 0,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            active_program: None,
            bound_texture: None,
            vertex_buffer: None,
            target: None,
            warned_no_target: false,
        }
    }

    /// Attaches the surface view that subsequent draws render into.
    pub fn attach_target(&mut self, view: wgpu::TextureView, width: u32, height: u32) {
        self.target = Some(Target { view, width, height });
    }

    /// Detaches the frame target. Must be called before the surface texture is presented.
    pub fn detach_target(&mut self) {
        self.target = None;
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Logical surface size last requested through [`GpuContext::resize_surface`].
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn texture_format(&self) -> wgpu::TextureFormat {
        // Sampling an sRGB texture and writing to an sRGB surface round-trips the
        // raster bytes unchanged.
        if self.surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        }
    }

    fn create_sampler(&self, params: TextureParams) -> wgpu::Sampler {
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("loupe lens sampler"),
            address_mode_u: map_wrap(params.wrap_s),
            address_mode_v: map_wrap(params.wrap_t),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: map_filter(params.mag_filter),
            min_filter: map_filter(params.min_filter),
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        })
    }

    fn build_pipeline(
        &self,
        layout: &ProgramLayout,
        vertex_src: &str,
        fragment_src: &str,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
        let vs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("loupe lens vertex shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
        });
        let fs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("loupe lens fragment shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
        });

        let visibility = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let mut entries = Vec::new();
        for (_, binding) in &layout.uniforms {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: *binding,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(8),
                },
                count: None,
            });
        }
        for (_, binding) in &layout.textures {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: *binding,
                visibility,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        for binding in &layout.samplers {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: *binding,
                visibility,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        let bgl = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("loupe lens bgl"),
            entries: &entries,
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("loupe lens pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: (2 * std::mem::size_of::<f32>()) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        };
        let buffers: &[wgpu::VertexBufferLayout] =
            if layout.attributes.is_empty() { &[] } else { std::slice::from_ref(&vertex_layout) };

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("loupe lens pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(layout.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(layout.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        (pipeline, bgl)
    }

    fn ensure_bind_group(&mut self, program_id: ProgramId, texture_id: TextureId) -> Option<()> {
        let slot = self.textures.get(&texture_id.0)?;
        let storage = slot.storage.as_ref()?;
        let program = self.programs.get_mut(&program_id.0)?;

        if let Some((tex, generation, _)) = &program.bind_group {
            if *tex == texture_id && *generation == slot.generation {
                return Some(());
            }
        }

        let mut entries = Vec::new();
        for (_, binding) in &program.layout.uniforms {
            let (buffer, _) = program.uniforms.get(binding)?;
            entries.push(wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            });
        }
        for (_, binding) in &program.layout.textures {
            entries.push(wgpu::BindGroupEntry {
                binding: *binding,
                resource: wgpu::BindingResource::TextureView(&storage.view),
            });
        }
        for binding in &program.layout.samplers {
            entries.push(wgpu::BindGroupEntry {
                binding: *binding,
                resource: wgpu::BindingResource::Sampler(&slot.sampler),
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("loupe lens bind group"),
            layout: &program.bind_group_layout,
            entries: &entries,
        });
        program.bind_group = Some((texture_id, slot.generation, bind_group));
        Some(())
    }
}

fn map_filter(f: Filter) -> wgpu::FilterMode {
    match f {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

fn map_wrap(w: Wrap) -> wgpu::AddressMode {
    match w {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

impl GpuContext for WgpuContext {
    fn enable_blending(&mut self, mode: BlendMode) {
        self.blend = Some(match mode {
            BlendMode::SourceOver => wgpu::BlendState::ALPHA_BLENDING,
        });
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        // The swapchain itself is reconfigured by the runtime on window resize.
        self.surface_size = (width, height);
        log::debug!("lens surface resized to {width}x{height} (logical)");
    }

    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId> {
        let layout = reflect_program(vertex_src, fragment_src)?;
        let (pipeline, bind_group_layout) = self.build_pipeline(&layout, vertex_src, fragment_src);

        let uniforms = layout
            .uniforms
            .iter()
            .map(|(name, binding)| {
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("loupe uniform {name}")),
                    contents: &[0u8; UNIFORM_SIZE as usize],
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                (*binding, (buffer, [0.0; 2]))
            })
            .collect();

        let id = self.alloc_id();
        self.programs.insert(
            id,
            Program { layout, pipeline, bind_group_layout, uniforms, bind_group: None },
        );
        log::debug!("created lens program {id}");
        Ok(ProgramId(id))
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.programs.contains_key(&program.0) {
            self.active_program = Some(program);
        } else {
            log::warn!("use_program: unknown {program:?}");
        }
    }

    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs.get(&program.0)?.layout.attribute_location(name)
    }

    fn bind_vertex_attribute(&mut self, location: u32, buffer: BufferId, components: u32) {
        if location != 0 || components != 2 {
            log::warn!("only a vec2 attribute at location 0 is supported (got {location}, {components})");
            return;
        }
        self.vertex_buffer = Some(buffer);
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let layout = &self.programs.get(&program.0)?.layout;
        layout
            .uniform_binding(name)
            .or_else(|| layout.texture_binding(name))
            .map(UniformLocation)
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        // Sampler uniforms select a texture unit; unit 0 is the only one.
        if value != 0 {
            log::warn!("texture unit {value} requested for {location:?}; only unit 0 is available");
        }
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, x: f32, y: f32) {
        let Some(program) = self.active_program.and_then(|p| self.programs.get_mut(&p.0)) else {
            return;
        };
        if let Some((_, value)) = program.uniforms.get_mut(&location.0) {
            *value = [x, y];
        }
    }

    fn delete_program(&mut self, program: ProgramId) -> Result<()> {
        let p = self
            .programs
            .remove(&program.0)
            .ok_or_else(|| anyhow!("unknown program {program:?}"))?;
        for (buffer, _) in p.uniforms.values() {
            buffer.destroy();
        }
        if self.active_program == Some(program) {
            self.active_program = None;
        }
        Ok(())
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId> {
        anyhow::ensure!(!data.is_empty(), "vertex buffer data is empty");
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("loupe quad vbo"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let id = self.alloc_id();
        self.buffers.insert(id, buffer);
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> Result<()> {
        let b = self
            .buffers
            .remove(&buffer.0)
            .ok_or_else(|| anyhow!("unknown buffer {buffer:?}"))?;
        b.destroy();
        if self.vertex_buffer == Some(buffer) {
            self.vertex_buffer = None;
        }
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureId> {
        let params = TextureParams::LINEAR_CLAMP;
        let sampler = self.create_sampler(params);
        let id = self.alloc_id();
        self.textures.insert(id, TextureSlot { storage: None, params, sampler, generation: 0 });
        Ok(TextureId(id))
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.bound_texture = Some(texture);
    }

    fn upload_texture(&mut self, texture: TextureId, pixels: &PixelBuffer) {
        let (w, h) = (pixels.width(), pixels.height());
        let format = self.texture_format();
        let Some(slot) = self.textures.get_mut(&texture.0) else {
            log::warn!("upload_texture: unknown {texture:?}");
            return;
        };

        let stale = slot.storage.as_ref().is_none_or(|s| s.width != w || s.height != h);
        if stale {
            if let Some(old) = slot.storage.take() {
                old.texture.destroy();
            }
            let tex = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("loupe lens texture"),
                size: wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
            slot.storage = Some(Storage { texture: tex, view, width: w, height: h });
            slot.generation += 1;
        }

        let Some(storage) = slot.storage.as_ref() else { return };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &storage.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w * 4),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );
    }

    fn set_texture_params(&mut self, texture: TextureId, params: TextureParams) {
        let needs_sampler = match self.textures.get(&texture.0) {
            Some(slot) => slot.params != params,
            None => return,
        };
        if !needs_sampler {
            return;
        }
        let sampler = self.create_sampler(params);
        if let Some(slot) = self.textures.get_mut(&texture.0) {
            slot.params = params;
            slot.sampler = sampler;
            slot.generation += 1;
        }
    }

    fn delete_texture(&mut self, texture: TextureId) -> Result<()> {
        let slot = self
            .textures
            .remove(&texture.0)
            .ok_or_else(|| anyhow!("unknown texture {texture:?}"))?;
        if let Some(storage) = slot.storage {
            storage.texture.destroy();
        }
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
        for p in self.programs.values_mut() {
            if matches!(p.bind_group, Some((t, _, _)) if t == texture) {
                p.bind_group = None;
            }
        }
        Ok(())
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        if primitive != Primitive::TriangleStrip {
            log::warn!("draw_arrays: {primitive:?} is not supported by the lens pipeline");
            return;
        }
        if self.target.is_none() {
            if !self.warned_no_target {
                log::warn!("draw_arrays called without an attached frame target; skipped");
                self.warned_no_target = true;
            }
            return;
        }
        let (Some(program_id), Some(texture_id)) = (self.active_program, self.bound_texture) else {
            return;
        };
        if self.ensure_bind_group(program_id, texture_id).is_none() {
            log::trace!("draw skipped: texture {texture_id:?} has no content yet");
            return;
        }

        let (Some(program), Some(target)) = (self.programs.get(&program_id.0), self.target.as_ref())
        else {
            return;
        };
        for (buffer, value) in program.uniforms.values() {
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(value));
        }
        let Some((_, _, bind_group)) = program.bind_group.as_ref() else { return };
        let vbo = self.vertex_buffer.and_then(|b| self.buffers.get(&b.0));

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("loupe lens encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("loupe lens pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (vw, vh) = self.viewport.unwrap_or(self.surface_size);
            let pw = ((vw as f32 * self.scale_factor) as u32).clamp(1, target.width.max(1));
            let ph = ((vh as f32 * self.scale_factor) as u32).clamp(1, target.height.max(1));
            rpass.set_viewport(0.0, 0.0, pw as f32, ph as f32, 0.0, 1.0);

            rpass.set_pipeline(&program.pipeline);
            rpass.set_bind_group(0, bind_group, &[]);
            if let Some(vbo) = vbo {
                rpass.set_vertex_buffer(0, vbo.slice(..));
            }
            rpass.draw(first..first + count, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl WgpuContext {
    /// Creates a context from the engine's GPU device.
    pub fn from_gpu(gpu: &crate::device::Gpu<'_>, scale_factor: f32) -> Self {
        Self::new(gpu.device().clone(), gpu.queue().clone(), gpu.surface_format(), scale_factor)
    }

    /// Number of live GPU resources (programs, buffers, textures).
    pub fn live_resources(&self) -> usize {
        self.programs.len() + self.buffers.len() + self.textures.len()
    }
}
