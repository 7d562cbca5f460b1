/// Lifecycle of a [`CanvasDriver`](super::CanvasDriver).
///
/// Transitions only move forward:
/// `Uninitialized → AwaitingFirstContent → Initializing → Running → Disposed`.
/// Any state may jump to `Disposed`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DriverState {
    /// No container bound.
    #[default]
    Uninitialized,
    /// Mounted, waiting for the first image to load or fail.
    AwaitingFirstContent,
    /// Creating GPU resources.
    Initializing,
    /// Ticking once per scheduled frame.
    Running,
    /// Torn down. Terminal.
    Disposed,
}

impl DriverState {
    pub fn is_mounted(self) -> bool {
        matches!(
            self,
            DriverState::AwaitingFirstContent | DriverState::Initializing | DriverState::Running
        )
    }
}
