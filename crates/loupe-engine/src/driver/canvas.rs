use anyhow::{Context, Result};

use crate::coords::RenderScale;
use crate::document::{Container, LoadStatus};
use crate::gpu::{BlendMode, BufferId, GpuContext, Primitive, ProgramId, TextureId, TextureParams};
use crate::pointer::{PointerSampler, SmoothedPointer};
use crate::render::{DisplayContext, RasterReport, TextureRenderer, UpdateOptions};
use crate::time::{FrameHandle, FrameScheduler};

use super::config::LensConfig;
use super::state::DriverState;
use super::token::MountToken;
use super::uniforms::{UniformCache, I_CHANNEL0, I_MOUSE, I_RESOLUTION};

/// Full-screen quad as a triangle strip, clip space.
const QUAD: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

const A_POSITION: &str = "aPosition";

/// GPU handles owned by the driver. Each is created at most once and released at most once.
#[derive(Debug, Default)]
struct Resources {
    program: Option<ProgramId>,
    quad: Option<BufferId>,
    texture: Option<TextureId>,
}

/// Drives the lens: waits for content, initializes GPU resources, ticks once per
/// scheduled frame and tears everything down.
///
/// The driver never holds on to the container, the GPU context or the
/// scheduler; the host passes them into each call.
pub struct CanvasDriver<P = SmoothedPointer> {
    config: LensConfig,
    scale: RenderScale,
    pointer: P,
    renderer: TextureRenderer,

    state: DriverState,
    token: Option<MountToken>,
    resize_observer: bool,

    resources: Resources,
    uniforms: UniformCache,
    pending: Option<FrameHandle>,
    surface_size: Option<(u32, u32)>,
}

impl CanvasDriver<SmoothedPointer> {
    /// Driver with a [`SmoothedPointer`] configured from `config`.
    pub fn new(config: LensConfig, device_ratio: Option<f64>) -> Self {
        let pointer = SmoothedPointer::new(config.pointer_smoothing);
        Self::with_pointer(config, device_ratio, pointer)
    }
}

impl<P: PointerSampler> CanvasDriver<P> {
    /// `config.render_scale` takes precedence over `device_ratio`. The resulting
    /// scale is fixed for the lifetime of the driver.
    pub fn with_pointer(config: LensConfig, device_ratio: Option<f64>, pointer: P) -> Self {
        let scale = RenderScale::from_device_ratio(config.render_scale.or(device_ratio));
        let renderer = TextureRenderer::new(config.background);
        Self {
            config,
            scale,
            pointer,
            renderer,
            state: DriverState::Uninitialized,
            token: None,
            resize_observer: false,
            resources: Resources::default(),
            uniforms: UniformCache::default(),
            pending: None,
            surface_size: None,
        }
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[inline]
    pub fn scale(&self) -> RenderScale {
        self.scale
    }

    /// Token of the current mount, if any.
    pub fn token(&self) -> Option<&MountToken> {
        self.token.as_ref()
    }

    pub fn pointer_mut(&mut self) -> &mut P {
        &mut self.pointer
    }

    pub fn renderer(&self) -> &TextureRenderer {
        &self.renderer
    }

    pub fn uniforms(&self) -> &UniformCache {
        &self.uniforms
    }

    /// Whether the resize observer is currently registered.
    pub fn observes_resize(&self) -> bool {
        self.resize_observer
    }

    // ── lifecycle ──────────────────────────────────────────────────────────

    /// Binds the driver to `container` and starts waiting for its first image.
    pub fn mount(&mut self, container: &dyn Container) {
        if self.state != DriverState::Uninitialized {
            log::warn!("lens mount ignored in state {:?}", self.state);
            return;
        }
        self.token = Some(MountToken::new());
        self.resize_observer = true;
        self.state = DriverState::AwaitingFirstContent;
        log::debug!("lens mounted on container with {} image(s)", container.images().len());
    }

    /// Continues a mount once the first image has loaded or failed (or there is none).
    ///
    /// Never blocks: while the first image is still loading it returns and the
    /// host calls again later. Returns `true` once the driver has left the
    /// waiting state.
    pub fn resume(
        &mut self,
        container: &dyn Container,
        gpu: &mut dyn GpuContext,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if self.state != DriverState::AwaitingFirstContent {
            return self.state != DriverState::Uninitialized;
        }
        if self.cancelled() {
            return false;
        }
        if container.first_image_status() == Some(LoadStatus::Loading) {
            return false;
        }

        self.state = DriverState::Initializing;
        match self.initialize(gpu) {
            Ok(()) => {
                self.pending = Some(scheduler.request_frame());
                self.state = DriverState::Running;
                log::info!(
                    "lens running (scale {}, {} uniform(s) resolved)",
                    self.scale.get(),
                    self.uniforms.len()
                );
            }
            Err(e) => {
                log::error!("lens initialization failed: {e:#}");
                self.teardown(gpu, scheduler);
            }
        }
        true
    }

    fn initialize(&mut self, gpu: &mut dyn GpuContext) -> Result<()> {
        gpu.enable_blending(BlendMode::SourceOver);

        let shaders = &self.config.shaders;
        let program = gpu
            .create_program(&shaders.vertex, &shaders.fragment)
            .context("failed to create lens program")?;
        self.resources.program = Some(program);

        let quad = gpu.create_vertex_buffer(&QUAD).context("failed to create quad buffer")?;
        self.resources.quad = Some(quad);

        gpu.use_program(program);
        if let Some(loc) = gpu.attribute_location(program, A_POSITION) {
            gpu.bind_vertex_attribute(loc, quad, 2);
        }

        let texture = gpu.create_texture().context("failed to create lens texture")?;
        self.resources.texture = Some(texture);
        gpu.bind_texture(texture);
        gpu.set_texture_params(texture, TextureParams::LINEAR_CLAMP);

        self.uniforms = UniformCache::resolve(gpu, program);
        if let Some(loc) = self.uniforms.get(I_CHANNEL0) {
            gpu.set_uniform_i32(loc, 0);
        }
        Ok(())
    }

    /// Runs one frame. Call when the frame requested by the driver comes due.
    ///
    /// The driver's own render scale replaces `display.scale`.
    pub fn tick(
        &mut self,
        display: &DisplayContext,
        container: Option<&dyn Container>,
        gpu: &mut dyn GpuContext,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<RasterReport> {
        if self.state != DriverState::Running {
            return None;
        }
        self.pending = None;
        if self.cancelled() {
            return None;
        }

        let display = DisplayContext { scale: self.scale, ..*display };
        let (w, h) = (display.window_width, display.window_height);

        self.pointer.resize(w, h);
        let mouse = self.pointer.update(display.frame_dt);

        let size = (w.round().max(0.0) as u32, h.round().max(0.0) as u32);
        if self.surface_size != Some(size) {
            gpu.resize_surface(size.0, size.1);
            gpu.set_viewport(size.0, size.1);
            self.surface_size = Some(size);
        }

        let report = match self.resources.texture {
            Some(texture) => self.renderer.update_texture(
                gpu,
                container,
                texture,
                &display,
                UpdateOptions::sized(w, h),
            ),
            None => None,
        };

        if let Some(loc) = self.uniforms.get(I_RESOLUTION) {
            gpu.set_uniform_vec2(loc, w, h);
        }
        if let Some(loc) = self.uniforms.get(I_MOUSE) {
            gpu.set_uniform_vec2(loc, mouse.x, h - mouse.y);
        }

        gpu.draw_arrays(Primitive::TriangleStrip, 0, 4);

        self.pending = Some(scheduler.request_frame());
        report
    }

    /// Resize observer callback. Layout is re-read every tick, so there is nothing to do.
    pub fn on_window_resized(&mut self, width: f32, height: f32) {
        if self.resize_observer {
            log::trace!("lens observed resize to {width}x{height}");
        }
    }

    /// Tears the driver down. Calling it again is a no-op.
    pub fn dispose(&mut self, gpu: &mut dyn GpuContext, scheduler: &mut dyn FrameScheduler) {
        if self.state == DriverState::Disposed {
            return;
        }
        self.teardown(gpu, scheduler);
        log::debug!("lens disposed");
    }

    fn teardown(&mut self, gpu: &mut dyn GpuContext, scheduler: &mut dyn FrameScheduler) {
        if let Some(token) = &self.token {
            token.cancel();
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.resize_observer = false;

        if let Some(texture) = self.resources.texture.take() {
            if let Err(e) = gpu.delete_texture(texture) {
                log::warn!("failed to release lens texture: {e:#}");
            }
        }
        if let Some(program) = self.resources.program.take() {
            if let Err(e) = gpu.delete_program(program) {
                log::warn!("failed to release lens program: {e:#}");
            }
        }
        if let Some(quad) = self.resources.quad.take() {
            if let Err(e) = gpu.delete_buffer(quad) {
                log::warn!("failed to release quad buffer: {e:#}");
            }
        }

        self.uniforms = UniformCache::default();
        self.state = DriverState::Disposed;
    }

    fn cancelled(&self) -> bool {
        self.token.as_ref().is_none_or(MountToken::is_cancelled)
    }
}
