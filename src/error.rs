//! Error types for engine construction and operation.

use crate::model::PetState;

/// The configuration violates a structural rule. Construction does not
/// complete; fix the configuration and build again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No states were provided.
    #[error("pet config must provide at least one state")]
    EmptyStates,

    /// A state has no frames.
    #[error("state \"{state}\" must define at least one frame")]
    EmptyFrames {
        /// The offending state.
        state: PetState,
    },

    /// Two states share a name.
    #[error("duplicate state definition for \"{state}\"")]
    DuplicateState {
        /// The repeated name.
        state: PetState,
    },

    /// The initial state is not defined.
    #[error("initial state \"{state}\" is not part of the provided configuration")]
    UnknownInitialState {
        /// The missing initial state.
        state: PetState,
    },

    /// A transition targets an undefined state. Only reported when
    /// transitions are validated eagerly.
    #[error("state \"{from}\" has a transition to unknown state \"{to}\"")]
    UnknownTransitionTarget {
        /// State owning the transition.
        from: PetState,
        /// Missing target.
        to: PetState,
    },
}

/// A transition was requested to a state that is not registered.
///
/// Nothing was mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("attempted to transition to unknown state \"{0}\"")]
pub struct UnknownStateError(pub PetState);

/// Errors from the threaded [`PetEngine`](crate::actor::PetEngine) handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The target state is not registered.
    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),

    /// The engine was disposed; the handle is no longer usable.
    #[error("engine has been disposed")]
    Disposed,
}
