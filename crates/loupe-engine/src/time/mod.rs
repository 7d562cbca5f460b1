//! Time subsystem.
//!
//! - `FrameClock`: per-window delta time, ticked once per redraw
//! - `FrameQueue`: single-slot "next display refresh" request queue driven by the runtime

mod frame_clock;
mod scheduler;

pub use frame_clock::{FrameClock, FrameTime, REFERENCE_DT};
pub use scheduler::{FrameHandle, FrameQueue, FrameScheduler};
