use std::time::Instant;

use crate::models::mode::CaptureMode;
use crate::models::state::{RecordingEndReason, ShutterState};

use super::timer::{RecordingTimer, TimerEvent};
use super::visuals::{ShutterAnimation, ShutterVisuals};

/// Lifecycle events emitted by the shutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutterEvent {
    RecordingBegan { duration_secs: u32 },
    Tick { remaining_secs: u32 },
    Expired,
    RecordingEnded { reason: RecordingEndReason },
    PhotoRequested,
}

/// Gesture-driven shutter state machine.
///
/// Long presses are only honored in video mode and taps only in photo
/// mode; the other gesture is dropped without emitting anything. Once a
/// capture completes the shutter stays disarmed until `reset`.
#[derive(Debug, Clone)]
pub struct ShutterControl {
    mode: CaptureMode,
    state: ShutterState,
    armed: bool,
    timer: RecordingTimer,
    animation: ShutterAnimation,
}

impl ShutterControl {
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            state: ShutterState::Idle,
            armed: true,
            timer: RecordingTimer::new(),
            animation: ShutterAnimation::Pristine,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn state(&self) -> ShutterState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn timer(&self) -> &RecordingTimer {
        &self.timer
    }

    pub fn animation(&self) -> ShutterAnimation {
        self.animation
    }

    pub fn visuals(&self, now: Instant) -> ShutterVisuals {
        self.animation.visuals(now, self.timer.progress(now))
    }

    pub fn long_press_began(&mut self, now: Instant) -> Vec<ShutterEvent> {
        let CaptureMode::Video { max_duration_secs } = self.mode else {
            log::trace!("long press ignored in photo mode");
            return Vec::new();
        };
        if !self.armed || self.state != ShutterState::Idle {
            log::debug!("long press ignored: shutter {:?}, armed {}", self.state, self.armed);
            return Vec::new();
        }

        let duration_secs = max_duration_secs.get();
        self.state = ShutterState::Recording;
        self.timer.start(duration_secs, now);
        self.animation = ShutterAnimation::Recording { started_at: now };
        vec![ShutterEvent::RecordingBegan { duration_secs }]
    }

    pub fn long_press_ended(&mut self) -> Vec<ShutterEvent> {
        if !self.mode.is_video() {
            return Vec::new();
        }
        self.end_recording(RecordingEndReason::Released)
    }

    pub fn tap(&mut self) -> Vec<ShutterEvent> {
        if !self.mode.is_photo() {
            log::trace!("tap ignored in video mode");
            return Vec::new();
        }
        if !self.armed || self.state != ShutterState::Idle {
            log::debug!("tap ignored: shutter {:?}, armed {}", self.state, self.armed);
            return Vec::new();
        }

        self.state = ShutterState::Capturing;
        vec![ShutterEvent::PhotoRequested]
    }

    /// Advance the recording timer.
    pub fn poll(&mut self, now: Instant) -> Vec<ShutterEvent> {
        if self.state != ShutterState::Recording {
            return Vec::new();
        }

        let mut events = Vec::new();
        for event in self.timer.poll(now) {
            match event {
                TimerEvent::Tick(remaining_secs) => events.push(ShutterEvent::Tick { remaining_secs }),
                TimerEvent::Expired => {
                    events.push(ShutterEvent::Expired);
                    events.extend(self.end_recording(RecordingEndReason::Expired));
                }
            }
        }
        events
    }

    /// End an active recording from outside the gesture path.
    pub fn force_stop(&mut self) -> Vec<ShutterEvent> {
        self.end_recording(RecordingEndReason::Forced)
    }

    /// The still requested by a tap has been delivered (or failed).
    pub fn capture_finished(&mut self) {
        if self.state == ShutterState::Capturing {
            self.state = ShutterState::Idle;
            self.armed = false;
        }
    }

    /// Restore the pristine button and re-arm. Refused while recording.
    pub fn reset(&mut self) -> bool {
        if self.state == ShutterState::Recording {
            log::warn!("shutter reset refused while recording");
            return false;
        }
        self.timer.stop();
        self.state = ShutterState::Idle;
        self.armed = true;
        self.animation = ShutterAnimation::Pristine;
        true
    }

    fn end_recording(&mut self, reason: RecordingEndReason) -> Vec<ShutterEvent> {
        if self.state != ShutterState::Recording {
            return Vec::new();
        }
        self.timer.stop();
        self.animation = ShutterAnimation::Ended;
        self.state = ShutterState::Idle;
        self.armed = false;
        vec![ShutterEvent::RecordingEnded { reason }]
    }
}
