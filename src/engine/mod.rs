//! Engine: the single-threaded animation state machine.
//!
//! [`Engine`] owns the validated registry, the mutable playhead, and the
//! subscriber list. It does not spawn threads or read the wall clock; time
//! comes from an injected [`Clock`] and advancement happens only when
//! [`Engine::tick`] is called. [`PetEngine`](crate::actor::PetEngine) wraps
//! it in a dedicated thread driven by a ticker.
//!
//! Each tick runs, in order:
//! 1. frame advance (at most one frame),
//! 2. automatic transition evaluation (first eligible `auto` edge wins),
//! 3. snapshot broadcast.

mod playhead;
mod snapshot;
mod transition;

pub use playhead::Playhead;
pub use snapshot::{EngineSnapshot, Listener, SnapshotPublisher, SubscriptionId};
pub use transition::select_auto;

use crate::clock::{Clock, MonotonicClock};
use crate::config::TransitionValidation;
use crate::error::{ConfigError, UnknownStateError};
use crate::model::{PetConfig, PetState, StateDefinition};
use crate::registry::StateRegistry;
use std::time::Duration;
use tracing::{debug, info, trace};

/// What a single tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The displayed frame moved on.
    pub frame_advanced: bool,
    /// An automatic transition entered this state.
    pub transitioned_to: Option<PetState>,
}

/// The animation state machine.
#[derive(Debug)]
pub struct Engine<C: Clock = MonotonicClock> {
    /// Validated configuration.
    registry: StateRegistry,
    /// Time source.
    clock: C,
    /// Current state, frame, and timers.
    playhead: Playhead,
    /// Subscribers.
    publisher: SnapshotPublisher,
    /// Time is frozen here while stopped.
    frozen_at: Option<Duration>,
}

impl Engine<MonotonicClock> {
    /// Build an engine on the real monotonic clock, validating transition
    /// targets eagerly.
    pub fn new(config: PetConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, TransitionValidation::Eager, MonotonicClock::new())
    }
}

impl<C: Clock> Engine<C> {
    /// Build an engine on a custom clock.
    ///
    /// The engine starts stopped, positioned at the first frame of the
    /// initial state.
    pub fn with_clock(
        config: PetConfig,
        validation: TransitionValidation,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let registry = StateRegistry::new(config, validation)?;
        let now = clock.now();
        let playhead = Playhead::new(registry.initial_index(), now);

        Ok(Self {
            registry,
            clock,
            playhead,
            publisher: SnapshotPublisher::new(),
            frozen_at: Some(now),
        })
    }

    /// The effective current time: live while running, frozen while stopped.
    fn now(&self) -> Duration {
        self.frozen_at.unwrap_or_else(|| self.clock.now())
    }

    fn current(&self) -> &StateDefinition {
        self.registry.state_at(self.playhead.state)
    }

    /// Start advancing time.
    ///
    /// Starting a stopped engine restarts the state and frame timers. Starting
    /// a running engine changes nothing. Either way, subscribers receive the
    /// current snapshot.
    pub fn start(&mut self) {
        if self.frozen_at.is_some() {
            let now = self.clock.now();
            self.playhead.restart_timers(now);
            self.frozen_at = None;
            info!(state = %self.current().name, "engine started");
        }
        self.emit();
    }

    /// Stop advancing time. Snapshots stay frozen at the moment of stopping.
    pub fn stop(&mut self) {
        if self.frozen_at.is_none() {
            self.frozen_at = Some(self.clock.now());
            info!(state = %self.current().name, "engine stopped");
        }
    }

    /// Whether ticks currently advance the engine.
    pub const fn is_running(&self) -> bool {
        self.frozen_at.is_none()
    }

    /// Advance the engine by one tick.
    ///
    /// Does nothing while stopped. Fails only when lazily validated
    /// configuration selects an auto transition to an unknown state; the
    /// whole tick is then discarded.
    pub fn tick(&mut self) -> Result<TickOutcome, UnknownStateError> {
        if !self.is_running() {
            return Ok(TickOutcome::default());
        }

        let now = self.clock.now();
        let mut next = self.playhead;
        let definition = self.current();
        let frame_advanced = next.advance_frame(definition, now);

        let mut transitioned_to = None;
        if let Some(target) = select_auto(definition, next.state_elapsed(now)) {
            let index = self
                .registry
                .index_of(target)
                .ok_or(UnknownStateError(target))?;
            if index != next.state {
                debug!(from = %definition.name, to = %target, "auto transition");
                next.enter(index, now);
                transitioned_to = Some(target);
            }
        }

        self.playhead = next;
        trace!(frame = next.frame_index, loops = next.loop_count, "tick");
        self.emit_at(now);

        Ok(TickOutcome {
            frame_advanced,
            transitioned_to,
        })
    }

    /// Force a transition to `target`, ignoring dwell times.
    ///
    /// Requesting the current state leaves the playhead alone. Any successful
    /// call is followed by a broadcast.
    pub fn set_state(&mut self, target: PetState) -> Result<(), UnknownStateError> {
        let index = self
            .registry
            .index_of(target)
            .ok_or(UnknownStateError(target))?;

        let now = self.now();
        if index != self.playhead.state {
            debug!(from = %self.current().name, to = %target, "forced transition");
            self.playhead.enter(index, now);
        }
        self.emit_at(now);
        Ok(())
    }

    /// State names in configuration order.
    pub fn state_names(&self) -> Vec<PetState> {
        self.registry.all_names()
    }

    /// The current state.
    pub fn state(&self) -> PetState {
        self.current().name
    }

    /// The validated configuration.
    pub const fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// Capture what should be displayed now. No side effects.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::capture(self.current(), &self.playhead, self.now())
    }

    /// Register a listener and hand it the current snapshot before
    /// returning.
    pub fn subscribe(&mut self, mut listener: Listener) -> SubscriptionId {
        listener(&self.snapshot());
        self.publisher.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.publisher.unsubscribe(id)
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.publisher.len()
    }

    /// Stop the engine and drop every listener.
    pub fn dispose(mut self) {
        self.stop();
        self.publisher.clear();
        info!("engine disposed");
    }

    fn emit(&mut self) {
        let now = self.now();
        self.emit_at(now);
    }

    fn emit_at(&mut self, now: Duration) {
        let definition = self.registry.state_at(self.playhead.state);
        let playhead = &self.playhead;
        self.publisher
            .publish(|| EngineSnapshot::capture(definition, playhead, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::{AnimationFrame, StateTransition};
    use std::sync::{Arc, Mutex};

    fn frames(name: PetState, count: usize, ms: u64) -> Vec<AnimationFrame> {
        (0..count)
            .map(|n| AnimationFrame::new(format!("{name}-{n}.svg"), ms))
            .collect()
    }

    /// idle (2 x 450ms, auto -> sleeping at 20s), sleeping (2 x 850ms, auto -> idle at 10s).
    fn idle_sleeping() -> PetConfig {
        PetConfig::new(vec![
            StateDefinition::new(PetState::Idle, frames(PetState::Idle, 2, 450))
                .with_transition(StateTransition::auto(PetState::Sleeping, 20_000)),
            StateDefinition::new(PetState::Sleeping, frames(PetState::Sleeping, 2, 850))
                .with_transition(StateTransition::auto(PetState::Idle, 10_000)),
        ])
    }

    fn engine(config: PetConfig) -> (Engine<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let engine = Engine::with_clock(config, TransitionValidation::Eager, clock.clone()).unwrap();
        (engine, clock)
    }

    fn started(config: PetConfig) -> (Engine<ManualClock>, ManualClock) {
        let (mut engine, clock) = engine(config);
        engine.start();
        (engine, clock)
    }

    /// Advance the clock in `step` increments up to `total`, ticking each time.
    fn run_for(engine: &mut Engine<ManualClock>, clock: &ManualClock, total: u64, step: u64) {
        let mut elapsed = 0;
        while elapsed < total {
            let delta = step.min(total - elapsed);
            clock.advance_ms(delta);
            engine.tick().unwrap();
            elapsed += delta;
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<EngineSnapshot>>>, Listener) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let listener: Listener = Box::new(move |s: &EngineSnapshot| sink.lock().unwrap().push(s.clone()));
        (log, listener)
    }

    #[test]
    fn test_construction_errors() {
        let clock = ManualClock::new();
        let err = Engine::with_clock(PetConfig::default(), TransitionValidation::Eager, clock).unwrap_err();
        assert_eq!(err, ConfigError::EmptyStates);

        let config = idle_sleeping().with_initial_state(PetState::Purring);
        assert_eq!(
            Engine::new(config).unwrap_err(),
            ConfigError::UnknownInitialState { state: PetState::Purring }
        );
    }

    #[test]
    fn test_fresh_start_snapshot() {
        let (engine, clock) = engine(idle_sleeping());
        clock.advance_ms(5_000);
        let mut engine = engine;
        engine.start();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, PetState::Idle);
        assert_eq!(snapshot.frame_index, 0);
        assert_eq!(snapshot.loop_count, 0);
        assert_eq!(snapshot.frame_elapsed_ms, 0);
        assert_eq!(snapshot.state_elapsed_ms, 0);
        assert_eq!(snapshot.frame.texture_path.as_ref(), "idle-0.svg");
    }

    #[test]
    fn test_frame_advances_at_duration() {
        let (mut engine, clock) = started(idle_sleeping());

        clock.advance_ms(449);
        assert!(!engine.tick().unwrap().frame_advanced);
        assert_eq!(engine.snapshot().frame_index, 0);

        clock.advance_ms(1);
        assert!(engine.tick().unwrap().frame_advanced);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.frame_index, 1);
        assert_eq!(snapshot.frame_elapsed_ms, 0);
        assert_eq!(snapshot.state_elapsed_ms, 450);
    }

    #[test]
    fn test_loop_count_per_full_pass() {
        let (mut engine, clock) = started(idle_sleeping());

        run_for(&mut engine, &clock, 900, 450);
        assert_eq!(engine.snapshot().loop_count, 1);

        run_for(&mut engine, &clock, 900, 450);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.loop_count, 2);
        assert_eq!(snapshot.frame_index, 0);
    }

    #[test]
    fn test_idle_example_then_forced_sleep() {
        let (mut engine, clock) = started(idle_sleeping());
        run_for(&mut engine, &clock, 900, 450);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, PetState::Idle);
        assert_eq!(snapshot.frame_index, 0);
        assert_eq!(snapshot.loop_count, 1);

        engine.set_state(PetState::Sleeping).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, PetState::Sleeping);
        assert_eq!(snapshot.frame_index, 0);
        assert_eq!(snapshot.loop_count, 0);
        assert_eq!(snapshot.state_elapsed_ms, 0);
        assert_eq!(snapshot.frame_elapsed_ms, 0);
    }

    #[test]
    fn test_auto_transition_on_first_eligible_tick() {
        let (mut engine, clock) = started(idle_sleeping());

        run_for(&mut engine, &clock, 19_984, 16);
        assert_eq!(engine.state(), PetState::Idle);
        assert!(engine.snapshot().state_elapsed_ms < 20_000);

        clock.advance_ms(16);
        let outcome = engine.tick().unwrap();
        assert_eq!(outcome.transitioned_to, Some(PetState::Sleeping));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, PetState::Sleeping);
        assert_eq!(snapshot.state_elapsed_ms, 0);
        assert_eq!(snapshot.loop_count, 0);
    }

    #[test]
    fn test_auto_transition_to_self_keeps_timers() {
        let config = PetConfig::new(vec![
            StateDefinition::new(PetState::Idle, frames(PetState::Idle, 1, 1_000))
                .with_transition(StateTransition::auto(PetState::Idle, 0)),
        ]);
        let (mut engine, clock) = started(config);

        clock.advance_ms(300);
        assert_eq!(engine.tick().unwrap().transitioned_to, None);
        assert_eq!(engine.snapshot().state_elapsed_ms, 300);
    }

    #[test]
    fn test_forced_transition_ignores_dwell() {
        let (mut engine, clock) = started(idle_sleeping());
        clock.advance_ms(10);
        engine.tick().unwrap();

        engine.set_state(PetState::Sleeping).unwrap();
        assert_eq!(engine.state(), PetState::Sleeping);

        // Sleeping's own dwell gate still applies afterwards.
        run_for(&mut engine, &clock, 9_000, 100);
        assert_eq!(engine.state(), PetState::Sleeping);
    }

    #[test]
    fn test_self_transition_is_noop() {
        let (mut engine, clock) = started(idle_sleeping());
        run_for(&mut engine, &clock, 500, 50);
        let before = engine.snapshot();

        engine.set_state(PetState::Idle).unwrap();
        assert_eq!(engine.snapshot(), before);
        assert_eq!(before.frame_index, 1);
        assert_eq!(before.state_elapsed_ms, 500);
    }

    #[test]
    fn test_unknown_target_leaves_state_untouched() {
        let (mut engine, clock) = started(idle_sleeping());
        run_for(&mut engine, &clock, 700, 35);
        let before = engine.snapshot();

        let err = engine.set_state(PetState::Playing).unwrap_err();
        assert_eq!(err, UnknownStateError(PetState::Playing));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_subscribe_delivers_immediately_then_per_tick() {
        let (mut engine, clock) = started(idle_sleeping());
        let (log, listener) = recorder();

        let id = engine.subscribe(listener);
        assert_eq!(log.lock().unwrap().len(), 1);

        clock.advance_ms(16);
        engine.tick().unwrap();
        engine.set_state(PetState::Sleeping).unwrap();
        assert_eq!(log.lock().unwrap().len(), 3);
        assert_eq!(log.lock().unwrap()[2].state, PetState::Sleeping);

        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        clock.advance_ms(16);
        engine.tick().unwrap();
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_set_state_does_not_emit() {
        let (mut engine, _clock) = started(idle_sleeping());
        let (log, listener) = recorder();
        engine.subscribe(listener);

        assert!(engine.set_state(PetState::Eating).is_err());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_start_is_idempotent_but_reemits() {
        let (mut engine, clock) = started(idle_sleeping());
        let (log, listener) = recorder();
        engine.subscribe(listener);

        clock.advance_ms(200);
        engine.tick().unwrap();
        engine.start();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].state_elapsed_ms, 200);
    }

    #[test]
    fn test_stop_freezes_time() {
        let (mut engine, clock) = started(idle_sleeping());
        run_for(&mut engine, &clock, 300, 30);
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
        let frozen = engine.snapshot();

        clock.advance_ms(60_000);
        assert_eq!(engine.tick().unwrap(), TickOutcome::default());
        assert_eq!(engine.snapshot(), frozen);
        assert_eq!(frozen.state_elapsed_ms, 300);
    }

    #[test]
    fn test_restart_resets_timers() {
        let (mut engine, clock) = started(idle_sleeping());
        run_for(&mut engine, &clock, 500, 50);
        engine.stop();
        clock.advance_ms(1_000);
        engine.start();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.frame_index, 1);
        assert_eq!(snapshot.state_elapsed_ms, 0);
        assert_eq!(snapshot.frame_elapsed_ms, 0);
    }

    #[test]
    fn test_no_ticks_before_start() {
        let (mut engine, clock) = engine(idle_sleeping());
        clock.advance_ms(30_000);
        engine.tick().unwrap();
        assert_eq!(engine.state(), PetState::Idle);
        assert_eq!(engine.snapshot().state_elapsed_ms, 0);
    }

    #[test]
    fn test_lazy_dangling_transition_fails_tick_atomically() {
        let config = PetConfig::new(vec![
            StateDefinition::new(PetState::Idle, frames(PetState::Idle, 2, 100))
                .with_transition(StateTransition::auto(PetState::Chasing, 150)),
        ]);
        let clock = ManualClock::new();
        let mut engine = Engine::with_clock(config, TransitionValidation::Lazy, clock.clone()).unwrap();
        engine.start();

        clock.advance_ms(100);
        assert!(engine.tick().unwrap().frame_advanced);

        clock.advance_ms(100);
        let before = engine.snapshot();
        assert_eq!(engine.tick().unwrap_err(), UnknownStateError(PetState::Chasing));
        assert_eq!(engine.snapshot().frame_index, before.frame_index);
        assert_eq!(engine.snapshot().loop_count, 0);
    }

    #[test]
    fn test_state_names_in_config_order() {
        let (engine, _clock) = engine(idle_sleeping());
        assert_eq!(engine.state_names(), vec![PetState::Idle, PetState::Sleeping]);
    }

    #[test]
    fn test_dispose_releases_listeners() {
        let (mut engine, _clock) = started(idle_sleeping());
        let (log, listener) = recorder();
        engine.subscribe(listener);
        assert_eq!(engine.subscriber_count(), 1);
        engine.dispose();
        assert_eq!(Arc::strong_count(&log), 1);
    }
}
