//! Lens driver: owns the GPU resources of one lens instance and runs it frame by frame.
//!
//! The host is expected to:
//! - call [`CanvasDriver::mount`] once with the container
//! - call [`CanvasDriver::resume`] each host frame until it returns `true`
//! - call [`CanvasDriver::tick`] whenever the driver's frame request comes due
//! - call [`CanvasDriver::dispose`] on teardown

mod canvas;
mod config;
mod state;
mod token;
mod uniforms;

pub use canvas::CanvasDriver;
pub use config::LensConfig;
pub use state::DriverState;
pub use token::MountToken;
pub use uniforms::{UniformCache, I_CHANNEL0, I_MOUSE, I_RESOLUTION};
