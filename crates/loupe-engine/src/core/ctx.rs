use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::time::{FrameQueue, FrameTime};

use super::app::AppControl;

/// Window handle plus derived metrics.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)`.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(self.window.scale_factor());
        (logi.width as f32, logi.height as f32)
    }

    /// Device pixel ratio of the monitor the window is on.
    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    /// Frame requests for this window. The runtime does not drain it; the app
    /// takes the due request when it handles the frame.
    pub frames: &'a mut FrameQueue,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the surface texture, calls `draw` with its view, its physical
    /// size and the frame queue, then presents it.
    ///
    /// Everything `draw` renders must be submitted before it returns.
    pub fn present<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&wgpu::TextureView, PhysicalSize<u32>, &mut FrameQueue),
    {
        let frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface texture unavailable: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        let size = frame.surface_texture.texture.size();
        draw(&frame.view, PhysicalSize::new(size.width, size.height), &mut *self.frames);

        self.window.window.pre_present_notify();
        self.gpu.present(frame);
        AppControl::Continue
    }
}
