/// Shutter gesture state.
///
/// ```text
/// video: idle → recording → idle
/// photo: idle → capturing → idle
/// ```
///
/// Both paths leave the shutter disarmed; `ShutterControl::reset` re-arms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutterState {
    #[default]
    Idle,
    Recording,
    Capturing,
}

/// Why a recording ended. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingEndReason {
    /// The long press was released.
    Released,
    /// The timer reached zero.
    Expired,
    /// Orientation change, camera switch or teardown.
    Forced,
}

/// Capture screen lifecycle, tracked by the controller.
///
/// ```text
/// inactive → awaiting-permission → configuring → live
///                 ↓                                ↓
///               inert            live → recording → finishing → reviewing → live
///                                live → capturing → reviewing → live
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Inactive,
    AwaitingPermission,
    Configuring,
    Live,
    Recording,
    Finishing,
    Capturing,
    Reviewing,
    /// Permission denied or no usable device; only closing is possible.
    Inert,
    Closed,
}

impl CapturePhase {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Inert | Self::Closed)
    }
}
