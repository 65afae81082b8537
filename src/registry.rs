//! State registry: validated, indexed view of a [`PetConfig`].
//!
//! The registry is built once and never changes. Building it is the only
//! place where configuration rules are enforced; a registry that exists is
//! always valid.

use crate::config::TransitionValidation;
use crate::error::ConfigError;
use crate::model::{PetConfig, PetState, StateDefinition};
use std::collections::HashMap;

/// Immutable lookup table from [`PetState`] to [`StateDefinition`].
#[derive(Debug, Clone)]
pub struct StateRegistry {
    /// Definitions in insertion order.
    states: Vec<StateDefinition>,
    /// Name -> position in `states`.
    index: HashMap<PetState, usize>,
    /// Position of the starting state.
    initial: usize,
}

impl StateRegistry {
    /// Validate `config` and index its states.
    ///
    /// Rules are checked in order and the first violation is returned:
    /// non-empty state list, non-empty frames per state, unique names, known
    /// initial state, then (for [`TransitionValidation::Eager`]) known
    /// transition targets.
    pub fn new(config: PetConfig, validation: TransitionValidation) -> Result<Self, ConfigError> {
        if config.states.is_empty() {
            return Err(ConfigError::EmptyStates);
        }

        let mut index = HashMap::with_capacity(config.states.len());
        for (position, state) in config.states.iter().enumerate() {
            if state.frames.is_empty() {
                return Err(ConfigError::EmptyFrames { state: state.name });
            }
            if index.insert(state.name, position).is_some() {
                return Err(ConfigError::DuplicateState { state: state.name });
            }
        }

        let initial_name = config.initial_state.unwrap_or(config.states[0].name);
        let Some(&initial) = index.get(&initial_name) else {
            return Err(ConfigError::UnknownInitialState { state: initial_name });
        };

        if validation == TransitionValidation::Eager {
            for state in &config.states {
                if let Some(dangling) = state.transitions.iter().find(|t| !index.contains_key(&t.to)) {
                    return Err(ConfigError::UnknownTransitionTarget {
                        from: state.name,
                        to: dangling.to,
                    });
                }
            }
        }

        Ok(Self {
            states: config.states,
            index,
            initial,
        })
    }

    /// Look up a state definition.
    #[inline]
    pub fn resolve(&self, name: PetState) -> Option<&StateDefinition> {
        self.index.get(&name).map(|&i| &self.states[i])
    }

    /// Position of `name` in insertion order.
    #[inline]
    pub fn index_of(&self, name: PetState) -> Option<usize> {
        self.index.get(&name).copied()
    }

    /// Definition at a position returned by [`index_of`](Self::index_of).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn state_at(&self, index: usize) -> &StateDefinition {
        &self.states[index]
    }

    /// Whether `name` is registered.
    #[inline]
    pub fn contains(&self, name: PetState) -> bool {
        self.index.contains_key(&name)
    }

    /// State names in insertion order.
    pub fn all_names(&self) -> Vec<PetState> {
        self.states.iter().map(|s| s.name).collect()
    }

    /// The state the engine starts in.
    pub fn initial_state(&self) -> PetState {
        self.states[self.initial].name
    }

    /// Position of the starting state.
    pub const fn initial_index(&self) -> usize {
        self.initial
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`; a registry holds at least one state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
