//! Timer transition table. Pure state manipulation; the keeper owns the
//! tick cadence and all side effects (persistence, notifications).

use crate::models::{Settings, TimerMode, TimerState};

impl TimerState {
    pub fn with_settings(settings: &Settings) -> Self {
        let mut state = TimerState::default();
        state.apply_settings(settings.work_seconds(), settings.break_seconds());
        state
    }

    fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_duration,
            TimerMode::Break => self.break_duration,
        }
    }

    /// Begin (or re-begin) counting down the current cycle. Valid from
    /// Idle and from Paused; a no-op while already running. A finished
    /// cycle (zero remaining) cannot be restarted — the user moves on
    /// with `toggle_mode` or `stop`.
    pub fn start(&mut self) {
        if self.remaining_seconds == 0 {
            return;
        }
        self.running = true;
        self.active = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue a paused cycle. Without an active session, or with the
    /// cycle already finished, there is nothing to continue.
    pub fn resume(&mut self) {
        if self.active && self.remaining_seconds > 0 {
            self.running = true;
        }
    }

    /// Back to Idle: work mode, full work duration, nothing active.
    pub fn stop(&mut self) {
        self.mode = TimerMode::Work;
        self.cycle_duration = self.work_duration;
        self.remaining_seconds = self.work_duration;
        self.running = false;
        self.active = false;
    }

    /// Swap work/break, reset the countdown to the other duration, and
    /// force Paused so the user decides when the next cycle starts.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.other();
        self.cycle_duration = self.duration_for(self.mode);
        self.remaining_seconds = self.cycle_duration;
        self.running = false;
    }

    /// Advance the countdown by one second. Returns the mode whose cycle
    /// just finished, if this tick drove the countdown to zero. The mode
    /// itself does not advance; moving on to the next cycle is an
    /// explicit `toggle_mode` from the user.
    pub fn tick(&mut self) -> Option<TimerMode> {
        if !self.running || self.remaining_seconds == 0 {
            return None;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.running = false;
            return Some(self.mode);
        }
        None
    }

    /// Install new durations (seconds). The current cycle's total is
    /// rewritten immediately and the remaining time clamped to it; an
    /// idle timer follows the new duration exactly.
    pub fn apply_settings(&mut self, work_seconds: u32, break_seconds: u32) {
        self.work_duration = work_seconds;
        self.break_duration = break_seconds;
        self.cycle_duration = self.duration_for(self.mode);
        if self.active {
            self.remaining_seconds = self.remaining_seconds.min(self.cycle_duration);
        } else {
            self.remaining_seconds = self.cycle_duration;
        }
    }

    /// Re-establish invariants on a snapshot read back from disk. The
    /// countdown cannot have been ticking while the process was down, so
    /// a restored timer never starts out running.
    pub fn restored(mut self) -> Self {
        self.running = false;
        self.cycle_duration = self.duration_for(self.mode);
        self.remaining_seconds = self.remaining_seconds.min(self.cycle_duration);
        self
    }
}

/// Formats a second count as `MM:SS` ("25:00", "61:01").
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
