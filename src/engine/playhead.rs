//! Playhead: the mutable timing state of the engine.
//!
//! A [`Playhead`] is `Copy`. Operations that may fail work on a copy and
//! write it back only on success, so no caller ever sees a half-applied
//! update.

use crate::model::StateDefinition;
use std::time::Duration;

/// Position within the state machine and the current state's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playhead {
    /// Registry position of the current state.
    pub state: usize,
    /// Index into the current state's frames.
    pub frame_index: usize,
    /// When the current state was entered.
    pub state_started_at: Duration,
    /// When the current frame started showing.
    pub frame_started_at: Duration,
    /// Full passes through the current state's frames.
    pub loop_count: u64,
}

impl Playhead {
    /// A playhead at the first frame of `state`, started at `now`.
    pub const fn new(state: usize, now: Duration) -> Self {
        Self {
            state,
            frame_index: 0,
            state_started_at: now,
            frame_started_at: now,
            loop_count: 0,
        }
    }

    /// Enter `state`: first frame, both timers restarted, loop count cleared.
    pub fn enter(&mut self, state: usize, now: Duration) {
        *self = Self::new(state, now);
    }

    /// Restart both timers without leaving the current frame.
    pub const fn restart_timers(&mut self, now: Duration) {
        self.state_started_at = now;
        self.frame_started_at = now;
    }

    /// Move to the next frame if the current one has been shown for its full
    /// duration. At most one frame per call, however late the call is.
    ///
    /// Returns `true` if the frame changed.
    pub fn advance_frame(&mut self, definition: &StateDefinition, now: Duration) -> bool {
        let Some(frame) = definition.frames.get(self.frame_index) else {
            return false;
        };
        if self.frame_elapsed(now) < Duration::from_millis(frame.duration_ms) {
            return false;
        }

        let next = (self.frame_index + 1) % definition.frame_count();
        if next == 0 {
            self.loop_count += 1;
        }
        self.frame_index = next;
        self.frame_started_at = now;
        true
    }

    /// Dwell time in the current state.
    #[inline]
    pub fn state_elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.state_started_at)
    }

    /// Time the current frame has been showing.
    #[inline]
    pub fn frame_elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.frame_started_at)
    }
}
