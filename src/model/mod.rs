//! Configuration model: the declarative description of a pet.
//!
//! A [`PetConfig`] is a list of [`StateDefinition`]s, each a looping
//! sequence of [`AnimationFrame`]s plus the [`StateTransition`]s leading out
//! of it. The engine consumes these values; it never mutates them.
//!
//! All types deserialize from the JSON shape used by host applications:
//!
//! ```json
//! {
//!   "states": [
//!     {
//!       "name": "idle",
//!       "frames": [{ "texturePath": "sprites/idle-0.svg", "durationMs": 450 }],
//!       "transitions": [{ "type": "auto", "to": "sleeping", "minDurationMs": 20000 }]
//!     }
//!   ],
//!   "initialState": "idle"
//! }
//! ```

pub mod sample;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifier of a pet state, drawn from a closed set of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetState {
    /// Resting, looking around.
    Idle,
    /// Running after something.
    Chasing,
    /// Asleep.
    Sleeping,
    /// Nibbling on food.
    Eating,
    /// Playing with a toy.
    Playing,
    /// Content and affectionate.
    Purring,
}

impl PetState {
    /// Every state name, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::Chasing,
        Self::Sleeping,
        Self::Eating,
        Self::Playing,
        Self::Purring,
    ];

    /// The lowercase name used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Chasing => "chasing",
            Self::Sleeping => "sleeping",
            Self::Eating => "eating",
            Self::Playing => "playing",
            Self::Purring => "purring",
        }
    }
}

impl fmt::Display for PetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`PetState`] from an unrecognised name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised pet state name \"{0}\"")]
pub struct ParsePetStateError(pub String);

impl FromStr for PetState {
    type Err = ParsePetStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParsePetStateError(s.to_string()))
    }
}

/// One visual sample within a state's animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationFrame {
    /// Opaque reference to the rendered texture (path or data URI).
    pub texture_path: Arc<str>,
    /// How long the frame stays on screen, in milliseconds.
    pub duration_ms: u64,
}

impl AnimationFrame {
    /// Create a frame.
    pub fn new(texture_path: impl Into<Arc<str>>, duration_ms: u64) -> Self {
        Self {
            texture_path: texture_path.into(),
            duration_ms,
        }
    }
}

/// Whether a transition is taken by the engine or only on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Taken automatically once the dwell time has elapsed.
    Auto,
    /// Documentational only; forced transitions never need an edge.
    Manual,
}

/// An edge out of a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    /// Auto or manual.
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    /// Target state.
    pub to: PetState,
    /// Minimum time the source state must have run, in milliseconds.
    #[serde(default)]
    pub min_duration_ms: u64,
}

impl StateTransition {
    /// An automatic transition gated on `min_duration_ms` of dwell time.
    pub const fn auto(to: PetState, min_duration_ms: u64) -> Self {
        Self {
            kind: TransitionKind::Auto,
            to,
            min_duration_ms,
        }
    }

    /// A manual transition.
    pub const fn manual(to: PetState) -> Self {
        Self {
            kind: TransitionKind::Manual,
            to,
            min_duration_ms: 0,
        }
    }

    /// Whether the engine evaluates this edge on its own.
    #[inline]
    pub fn is_auto(&self) -> bool {
        self.kind == TransitionKind::Auto
    }
}

/// A named state: its frames and outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    /// Unique name across the configuration.
    pub name: PetState,
    /// Frames played in order, looping. Must not be empty.
    pub frames: Vec<AnimationFrame>,
    /// Outgoing edges in priority order.
    #[serde(default)]
    pub transitions: Vec<StateTransition>,
}

impl StateDefinition {
    /// Create a state with no transitions.
    pub fn new(name: PetState, frames: Vec<AnimationFrame>) -> Self {
        Self {
            name,
            frames,
            transitions: Vec::new(),
        }
    }

    /// Append a transition.
    #[must_use]
    pub fn with_transition(mut self, transition: StateTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Iterate the automatic transitions in declaration order.
    pub fn auto_transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter().filter(|t| t.is_auto())
    }

    /// Number of frames in one loop.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Full description of a pet, supplied once when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetConfig {
    /// States in insertion order.
    pub states: Vec<StateDefinition>,
    /// Starting state. Defaults to the first state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<PetState>,
}

impl PetConfig {
    /// Create a configuration starting in the first state.
    pub fn new(states: Vec<StateDefinition>) -> Self {
        Self {
            states,
            initial_state: None,
        }
    }

    /// Override the initial state.
    #[must_use]
    pub fn with_initial_state(mut self, state: PetState) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Parse a configuration from JSON.
    ///
    /// Only the shape is checked here; structural rules are enforced when the
    /// engine is built.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The explicit initial state, or the first state's name.
    pub fn resolved_initial_state(&self) -> Option<PetState> {
        self.initial_state
            .or_else(|| self.states.first().map(|state| state.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_name_roundtrip() {
        for state in PetState::ALL {
            assert_eq!(state.as_str().parse::<PetState>(), Ok(state));
        }
        assert!("napping".parse::<PetState>().is_err());
    }

    #[test]
    fn test_parse_host_json() {
        let json = r#"{
            "states": [
                {
                    "name": "idle",
                    "frames": [
                        { "texturePath": "a.svg", "durationMs": 450 },
                        { "texturePath": "b.svg", "durationMs": 450 }
                    ],
                    "transitions": [{ "type": "auto", "to": "sleeping", "minDurationMs": 20000 }]
                },
                {
                    "name": "sleeping",
                    "frames": [{ "texturePath": "c.svg", "durationMs": 850 }],
                    "transitions": [{ "type": "manual", "to": "idle" }]
                }
            ]
        }"#;

        let config = PetConfig::from_json(json).unwrap();
        assert_eq!(config.states.len(), 2);
        assert_eq!(config.initial_state, None);
        assert_eq!(config.resolved_initial_state(), Some(PetState::Idle));

        let idle = &config.states[0];
        assert_eq!(idle.frames[1].texture_path.as_ref(), "b.svg");
        assert_eq!(idle.transitions[0], StateTransition::auto(PetState::Sleeping, 20_000));

        let sleeping = &config.states[1];
        assert_eq!(sleeping.transitions[0].min_duration_ms, 0);
        assert_eq!(sleeping.auto_transitions().count(), 0);
    }

    #[test]
    fn test_missing_transitions_default_empty() {
        let json = r#"{ "states": [{ "name": "eating", "frames": [] }], "initialState": "eating" }"#;
        let config = PetConfig::from_json(json).unwrap();
        assert!(config.states[0].transitions.is_empty());
        assert_eq!(config.initial_state, Some(PetState::Eating));
    }

    #[test]
    fn test_unknown_state_name_rejected() {
        let json = r#"{ "states": [{ "name": "napping", "frames": [] }] }"#;
        assert!(PetConfig::from_json(json).is_err());
    }
}
