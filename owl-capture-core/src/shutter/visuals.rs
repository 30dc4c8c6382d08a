use std::time::{Duration, Instant};

/// Outer ring scale reached while recording.
pub const RECORDING_CONTAINER_SCALE: f32 = 1.37;

/// Inner circle scale reached while recording.
pub const RECORDING_CIRCLE_SCALE: f32 = 0.82;

/// Length of the "begin recording" grow animation.
pub const RECORDING_ANIMATION: Duration = Duration::from_millis(1400);

/// Animation the shutter button is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutterAnimation {
    /// Freshly built button, armed.
    #[default]
    Pristine,
    /// Grow animation plus progress ring.
    Recording { started_at: Instant },
    /// Transforms reset and ring cleared; stays until `reset`.
    Ended,
}

/// Snapshot of the shutter's animated properties for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShutterVisuals {
    pub container_scale: f32,
    pub circle_scale: f32,
    /// Stroke end of the progress ring, `[0, 1]`.
    pub ring_progress: f32,
}

impl ShutterVisuals {
    pub const PRISTINE: Self = Self {
        container_scale: 1.0,
        circle_scale: 1.0,
        ring_progress: 0.0,
    };
}

impl ShutterAnimation {
    pub fn visuals(&self, now: Instant, ring_progress: f32) -> ShutterVisuals {
        match self {
            Self::Pristine | Self::Ended => ShutterVisuals::PRISTINE,
            Self::Recording { started_at } => {
                let t = now.saturating_duration_since(*started_at).as_secs_f32()
                    / RECORDING_ANIMATION.as_secs_f32();
                let eased = ease_in_out(t);
                ShutterVisuals {
                    container_scale: 1.0 + (RECORDING_CONTAINER_SCALE - 1.0) * eased,
                    circle_scale: 1.0 + (RECORDING_CIRCLE_SCALE - 1.0) * eased,
                    ring_progress: ring_progress.clamp(0.0, 1.0),
                }
            }
        }
    }
}

fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
