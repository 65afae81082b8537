//! Snapshots and their distribution to subscribers.

use super::playhead::Playhead;
use crate::model::{AnimationFrame, PetState, StateDefinition};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What should be displayed right now.
///
/// Built fresh for every query and broadcast; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    /// Current state.
    pub state: PetState,
    /// Frame to display.
    pub frame: AnimationFrame,
    /// Zero-based index of `frame` within the state.
    pub frame_index: usize,
    /// How long the frame has been displayed, in milliseconds.
    pub frame_elapsed_ms: u64,
    /// How long the pet has been in this state, in milliseconds.
    pub state_elapsed_ms: u64,
    /// Completed passes through the state's frames.
    pub loop_count: u64,
}

impl EngineSnapshot {
    /// Capture `playhead` positioned in `definition` at time `now`.
    pub(crate) fn capture(definition: &StateDefinition, playhead: &Playhead, now: Duration) -> Self {
        Self {
            state: definition.name,
            frame: definition.frames[playhead.frame_index].clone(),
            frame_index: playhead.frame_index,
            frame_elapsed_ms: millis(playhead.frame_elapsed(now)),
            state_elapsed_ms: millis(playhead.state_elapsed(now)),
            loop_count: playhead.loop_count,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Callback receiving snapshots.
pub type Listener = Box<dyn FnMut(&EngineSnapshot) + Send>;

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered set of listeners.
#[derive(Default)]
pub struct SnapshotPublisher {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl SnapshotPublisher {
    /// An empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener after all existing ones.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver one snapshot to every listener in registration order.
    ///
    /// `build` is not called when nobody is listening.
    pub fn publish(&mut self, build: impl FnOnce() -> EngineSnapshot) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = build();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for SnapshotPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotPublisher")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
