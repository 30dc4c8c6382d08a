use std::time::Instant;

/// Events emitted while the countdown runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; seconds left.
    Tick(u32),
    /// Reached zero. Emitted once, after `Tick(0)`.
    Expired,
}

/// One-second resolution countdown bound to a recording.
///
/// The timer owns no thread. The UI loop advances it with `poll`; every
/// whole second elapsed since `start` yields exactly one tick, so a late
/// poll catches up without skipping or repeating.
#[derive(Debug, Clone, Default)]
pub struct RecordingTimer {
    duration_secs: u32,
    remaining_secs: u32,
    started_at: Option<Instant>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown from `duration_secs`.
    pub fn start(&mut self, duration_secs: u32, now: Instant) {
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.started_at = Some(now);
    }

    /// Cancel the countdown. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        self.started_at.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Remaining time as `MM:SS`.
    pub fn label(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Advance to `now`, returning the ticks (and expiry) that fell due.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerEvent> {
        let Some(started_at) = self.started_at else {
            return Vec::new();
        };

        let elapsed = now.saturating_duration_since(started_at).as_secs();
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        let target = self.duration_secs.saturating_sub(elapsed);

        let mut events = Vec::new();
        while self.remaining_secs > target {
            self.remaining_secs -= 1;
            events.push(TimerEvent::Tick(self.remaining_secs));
        }

        if self.remaining_secs == 0 {
            self.started_at = None;
            events.push(TimerEvent::Expired);
        }
        events
    }

    /// Fraction of the duration elapsed, in `[0, 1]`. Drives the ring.
    pub fn progress(&self, now: Instant) -> f32 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };
        if self.duration_secs == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started_at).as_secs_f32();
        (elapsed / self.duration_secs as f32).clamp(0.0, 1.0)
    }
}

/// Format seconds as `MM:SS`, minutes taken modulo the hour.
pub fn format_clock(secs: u32) -> String {
    let minutes = (secs % 3600) / 60;
    let seconds = (secs % 3600) % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
