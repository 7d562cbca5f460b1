use std::time::{Duration, Instant};

/// Frame interval that per-frame rates (like pointer smoothing) are tuned for.
pub const REFERENCE_DT: f32 = 1.0 / 60.0;

/// Timing of one redraw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, in `(0, max_dt]`.
    pub dt: f32,
    pub frame_index: u64,
}

/// Per-window redraw clock, ticked by the runtime before each frame callback.
///
/// The first tick reports [`REFERENCE_DT`]: there is no previous frame to
/// measure against. Gaps longer than `max_dt` are capped.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    max_dt: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_dt(Duration::from_millis(250))
    }

    pub fn with_max_dt(max_dt: Duration) -> Self {
        Self { last: None, frame_index: 0, max_dt }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last.replace(now) {
            None => REFERENCE_DT,
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev).min(self.max_dt);
                if elapsed.is_zero() { REFERENCE_DT } else { elapsed.as_secs_f32() }
            }
        };
        let frame_index = self.frame_index;
        self.frame_index = self.frame_index.wrapping_add(1);
        FrameTime { dt, frame_index }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
