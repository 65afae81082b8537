//! Engine configuration.

use std::time::Duration;

/// When transition targets are checked against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionValidation {
    /// Reject unknown targets when the engine is built.
    #[default]
    Eager,
    /// Accept unknown targets; the failure surfaces when such a transition
    /// is selected.
    Lazy,
}

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time between ticks (16ms for ~60 Hz).
    pub tick_interval: Duration,
    /// Transition target checking policy.
    pub transition_validation: TransitionValidation,
}

impl EngineConfig {
    /// Set the tick interval.
    #[must_use]
    pub const fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the transition validation policy.
    #[must_use]
    pub const fn with_transition_validation(mut self, validation: TransitionValidation) -> Self {
        self.transition_validation = validation;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            transition_validation: TransitionValidation::Eager,
        }
    }
}
