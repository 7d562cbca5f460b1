/// Identifies one frame request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameHandle(pub u64);

/// Per-display-refresh callback scheduling, as seen by a frame consumer.
pub trait FrameScheduler {
    /// Requests one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancels a pending request. Stale or unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Single-slot frame queue.
///
/// At most one request is pending at a time: requesting again replaces the
/// pending handle. The runtime (or a test) calls [`take_due`](Self::take_due)
/// once per display refresh, so callbacks never overlap.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next: u64,
    pending: Option<FrameHandle>,
    requested: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending request, if any. Call once per display refresh.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Total number of requests made over the queue's lifetime.
    pub fn requested(&self) -> u64 {
        self.requested
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
