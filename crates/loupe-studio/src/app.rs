use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

use anyhow::Result;
use loupe_engine::coords::{Rect, Vec2};
use loupe_engine::core::{App, AppControl, FrameCtx};
use loupe_engine::document::{Document, DocumentConfig, ImageElement};
use loupe_engine::driver::{CanvasDriver, DriverState, LensConfig};
use loupe_engine::gpu::WgpuContext;
use loupe_engine::input::{InputEvent, Key, MouseWheelDelta};
use loupe_engine::raster::pixmap_from_rgba8;
use loupe_engine::render::DisplayContext;
use loupe_engine::time::FrameQueue;
use winit::event::WindowEvent;

use crate::decode::{self, Decoded};

const LINE_HEIGHT: f32 = 48.0;
const KEY_SCROLL: f32 = 80.0;
const ZOOM_STEP: f32 = 1.25;

/// Lens instance bound to the window's GPU device.
struct Lens {
    gpu: WgpuContext,
    driver: CanvasDriver,
}

/// Scrollable image column with the lens over it.
pub struct LensApp {
    doc: Document,
    elements: Vec<ImageElement>,
    paths: Vec<PathBuf>,
    decoder: Option<Receiver<Decoded>>,
    config: LensConfig,
    lens: Option<Lens>,
}

impl LensApp {
    pub fn new(paths: Vec<PathBuf>, config: LensConfig) -> Result<Self> {
        let mut doc = Document::new(DocumentConfig::default());
        let elements = paths.iter().map(|_| doc.push_loading()).collect();
        let decoder = if paths.is_empty() { None } else { Some(decode::spawn(paths.clone())?) };

        Ok(Self { doc, elements, paths, decoder, config, lens: None })
    }

    fn drain_decoder(&mut self) {
        let Some(rx) = &self.decoder else { return };
        let mut changed = false;
        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(Decoded { index, result }) => {
                    let Some(element) = self.elements.get(index) else { continue };
                    let pixmap = result.and_then(|(w, h, rgba)| pixmap_from_rgba8(w, h, rgba));
                    match pixmap {
                        Ok(p) => {
                            log::debug!("decoded {} ({}x{})", self.paths[index].display(), p.width(), p.height());
                            element.set_ready(p);
                        }
                        Err(e) => {
                            log::warn!("{e:#}");
                            element.set_failed(format!("{e:#}"));
                        }
                    }
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }
        if finished {
            self.decoder = None;
            log::info!("all {} image(s) processed", self.elements.len());
        }
        if changed {
            self.doc.invalidate_layout();
        }
    }

    fn handle_input(&mut self, ctx: &FrameCtx<'_, '_>, size: (f32, f32)) -> AppControl {
        let pointer = ctx.input.pointer_pos.map(|(x, y)| Vec2::new(x, y));
        let centre = Vec2::new(size.0 * 0.5, size.1 * 0.5);

        for ev in &ctx.input_frame.events {
            if let InputEvent::MouseWheel { delta, modifiers } = ev {
                if modifiers.command() {
                    let notches = match *delta {
                        MouseWheelDelta::Line { y, .. } => y,
                        MouseWheelDelta::Pixel { y, .. } => y / LINE_HEIGHT,
                    };
                    self.doc.zoom_at(1.1f32.powf(notches), pointer.unwrap_or(centre));
                } else {
                    self.doc.scroll_by(-delta.y_pixels(LINE_HEIGHT));
                }
            }
        }

        let keys = ctx.input_frame;
        if keys.pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if keys.pressed(Key::ArrowDown) {
            self.doc.scroll_by(KEY_SCROLL);
        }
        if keys.pressed(Key::ArrowUp) {
            self.doc.scroll_by(-KEY_SCROLL);
        }
        if keys.pressed(Key::PageDown) || keys.pressed(Key::Space) {
            self.doc.scroll_by(size.1 * 0.9);
        }
        if keys.pressed(Key::PageUp) {
            self.doc.scroll_by(-size.1 * 0.9);
        }
        if keys.pressed(Key::Home) {
            let h = self.doc.content_height();
            self.doc.scroll_by(-h);
        }
        if keys.pressed(Key::End) {
            let h = self.doc.content_height();
            self.doc.scroll_by(h);
        }
        if keys.pressed(Key::Plus) {
            self.doc.zoom_at(ZOOM_STEP, pointer.unwrap_or(centre));
        }
        if keys.pressed(Key::Minus) {
            self.doc.zoom_at(1.0 / ZOOM_STEP, pointer.unwrap_or(centre));
        }
        if keys.pressed(Key::Digit0) {
            self.doc.reset_zoom();
        }
        AppControl::Continue
    }
}

impl App for LensApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let (WindowEvent::Resized(size), Some(lens)) = (event, self.lens.as_mut()) {
            let logical = size.to_logical::<f32>(lens.gpu.scale_factor() as f64);
            lens.driver.on_window_resized(logical.width, logical.height);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.drain_decoder();

        let (w, h) = ctx.window.logical_size();
        if self.handle_input(ctx, (w, h)) == AppControl::Exit {
            return AppControl::Exit;
        }
        self.doc.set_bounds(Rect::new(0.0, 0.0, w, h));
        self.doc.refresh_layout();

        let scale_factor = ctx.window.scale_factor();
        let lens = self.lens.get_or_insert_with(|| {
            let gpu = WgpuContext::from_gpu(&*ctx.gpu, scale_factor as f32);
            let mut driver = CanvasDriver::new(self.config.clone(), Some(scale_factor));
            driver.mount(&self.doc);
            Lens { gpu, driver }
        });
        lens.gpu.set_scale_factor(scale_factor as f32);

        if let Some((x, y)) = ctx.input.pointer_pos {
            lens.driver.pointer_mut().observe(x, y);
        }

        if lens.driver.state() == DriverState::AwaitingFirstContent {
            lens.driver.resume(&self.doc, &mut lens.gpu, &mut *ctx.frames);
        }
        if lens.driver.state() == DriverState::Disposed {
            log::error!("lens stopped; closing");
            return AppControl::Exit;
        }

        if ctx.frames.take_due().is_none() {
            return AppControl::Continue;
        }

        let display = DisplayContext::new(w, h, lens.driver.scale()).with_frame_dt(ctx.time.dt);
        let doc = &self.doc;
        ctx.present(|view, size, frames| {
            lens.gpu.attach_target(view.clone(), size.width, size.height);
            lens.driver.tick(&display, Some(doc), &mut lens.gpu, frames);
            lens.gpu.detach_target();
        })
    }

    fn on_close(&mut self, frames: &mut FrameQueue) {
        if let Some(mut lens) = self.lens.take() {
            lens.driver.dispose(&mut lens.gpu, frames);
            log::debug!("{} lens resource(s) still live after dispose", lens.gpu.live_resources());
        }
    }
}
