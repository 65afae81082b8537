//! Automatic transition selection.

use crate::model::{PetState, StateDefinition};
use std::time::Duration;

/// Pick the automatic transition to take after `dwell` in `definition`.
///
/// Only `auto` edges are considered, in declaration order; the first one
/// whose minimum dwell time has elapsed wins.
pub fn select_auto(definition: &StateDefinition, dwell: Duration) -> Option<PetState> {
    definition
        .auto_transitions()
        .find(|t| dwell >= Duration::from_millis(t.min_duration_ms))
        .map(|t| t.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnimationFrame, StateTransition};

    fn idle() -> StateDefinition {
        StateDefinition::new(PetState::Idle, vec![AnimationFrame::new("f.svg", 100)])
    }

    #[test]
    fn test_no_transitions() {
        assert_eq!(select_auto(&idle(), Duration::from_secs(3600)), None);
    }

    #[test]
    fn test_gated_on_dwell() {
        let def = idle().with_transition(StateTransition::auto(PetState::Sleeping, 1_000));
        assert_eq!(select_auto(&def, Duration::from_millis(999)), None);
        assert_eq!(select_auto(&def, Duration::from_millis(1_000)), Some(PetState::Sleeping));
    }

    #[test]
    fn test_first_match_wins() {
        let def = idle()
            .with_transition(StateTransition::auto(PetState::Eating, 500))
            .with_transition(StateTransition::auto(PetState::Playing, 100));

        assert_eq!(select_auto(&def, Duration::from_millis(200)), Some(PetState::Playing));
        assert_eq!(select_auto(&def, Duration::from_millis(600)), Some(PetState::Eating));
    }

    #[test]
    fn test_manual_edges_ignored() {
        let def = idle()
            .with_transition(StateTransition::manual(PetState::Chasing))
            .with_transition(StateTransition::auto(PetState::Sleeping, 0));
        assert_eq!(select_auto(&def, Duration::ZERO), Some(PetState::Sleeping));
    }
}
