//! Built-in sample pet: a hamster with six states.
//!
//! Texture paths are placeholders of the form `sprites/<state>-<n>.svg`;
//! hosts map them to real assets.

use super::{AnimationFrame, PetConfig, PetState, StateDefinition, StateTransition};

/// Build a state with `count` frames of equal duration and a single auto
/// transition.
fn looping_state(
    name: PetState,
    count: usize,
    frame_ms: u64,
    next: PetState,
    dwell_ms: u64,
) -> StateDefinition {
    let frames = (0..count)
        .map(|n| AnimationFrame::new(format!("sprites/{name}-{n}.svg"), frame_ms))
        .collect();
    StateDefinition::new(name, frames).with_transition(StateTransition::auto(next, dwell_ms))
}

/// The six-state sample configuration, starting in [`PetState::Idle`].
///
/// Idle falls asleep after 20 s; every other state returns to idle after a
/// few seconds.
pub fn sample_config() -> PetConfig {
    PetConfig::new(vec![
        looping_state(PetState::Idle, 2, 450, PetState::Sleeping, 20_000),
        looping_state(PetState::Chasing, 3, 140, PetState::Idle, 2_000),
        looping_state(PetState::Sleeping, 2, 850, PetState::Idle, 10_000),
        looping_state(PetState::Eating, 2, 320, PetState::Idle, 4_000),
        looping_state(PetState::Playing, 3, 220, PetState::Idle, 3_500),
        looping_state(PetState::Purring, 2, 260, PetState::Idle, 3_000),
    ])
    .with_initial_state(PetState::Idle)
}
