//! PetEngine: thread-confined engine driven by a ticker.
//!
//! The [`Engine`] lives on its own thread and is only touched there. The
//! [`PetEngine`] handle turns each call into a [`Command`] and waits for the
//! reply, so calls behave synchronously while ticks, forced transitions, and
//! subscriptions are applied strictly one after another.

use super::messages::Command;
use super::ticker::{Tick, TickerActor};
use crate::clock::{Clock, MonotonicClock};
use crate::config::EngineConfig;
use crate::engine::{Engine, EngineSnapshot, Listener, SubscriptionId};
use crate::error::{ConfigError, EngineError, UnknownStateError};
use crate::model::{PetConfig, PetState};
use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handle to a running pet engine.
///
/// Methods block until the engine thread has applied them. They must not be
/// called from inside a listener, which runs on the engine thread; use
/// [`Subscription::dispose`] there instead.
pub struct PetEngine {
    /// Command sender.
    commands: Sender<Command>,
    /// Registry names, fixed at construction.
    state_names: Arc<[PetState]>,
    /// Engine thread handle.
    handle: Option<JoinHandle<()>>,
}

impl PetEngine {
    /// Validate `config` and spawn the engine thread on the monotonic clock.
    ///
    /// The engine starts stopped.
    pub fn spawn(config: PetConfig, engine_config: &EngineConfig) -> Result<Self, ConfigError> {
        Self::spawn_with_clock(config, engine_config, MonotonicClock::new())
    }

    /// Validate `config` and spawn the engine thread on a custom clock.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the engine thread.
    pub fn spawn_with_clock<C>(
        config: PetConfig,
        engine_config: &EngineConfig,
        clock: C,
    ) -> Result<Self, ConfigError>
    where
        C: Clock + Send + 'static,
    {
        let engine = Engine::with_clock(config, engine_config.transition_validation, clock)?;
        let state_names: Arc<[PetState]> = engine.state_names().into();
        let tick_interval = engine_config.tick_interval;

        let (command_tx, command_rx) = bounded::<Command>(64);

        let handle = thread::Builder::new()
            .name("petwheel-engine".to_string())
            .spawn(move || {
                EngineActor::new(engine, tick_interval).run_loop(&command_rx);
            })
            .expect("Failed to spawn engine thread");

        Ok(Self {
            commands: command_tx,
            state_names,
            handle: Some(handle),
        })
    }

    /// Send a command and wait for its reply.
    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(make(reply_tx))
            .map_err(|_| EngineError::Disposed)?;
        reply_rx.recv().map_err(|_| EngineError::Disposed)
    }

    /// Start ticking. Idempotent; subscribers get the current snapshot.
    pub fn start(&self) -> Result<(), EngineError> {
        self.request(|done| Command::Start { done })
    }

    /// Stop ticking. Idempotent.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.request(|done| Command::Stop { done })
    }

    /// Force a transition to `target`.
    pub fn set_state(&self, target: PetState) -> Result<(), EngineError> {
        self.request(|reply| Command::SetState { target, reply })?
            .map_err(EngineError::from)
    }

    /// State names in configuration order.
    pub fn state_names(&self) -> &[PetState] {
        &self.state_names
    }

    /// Capture what should be displayed now.
    pub fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        self.request(|reply| Command::Snapshot { reply })
    }

    /// Register `listener`.
    ///
    /// The current snapshot has been delivered to it by the time this
    /// returns; afterwards it receives one snapshot per tick and per forced
    /// transition, on the engine thread.
    pub fn subscribe<F>(&self, mut listener: F) -> Result<Subscription, EngineError>
    where
        F: FnMut(&EngineSnapshot) + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let gate = Arc::clone(&active);
        let listener: Listener = Box::new(move |snapshot: &EngineSnapshot| {
            if gate.load(Ordering::Acquire) {
                listener(snapshot);
            }
        });

        let id = self.request(|reply| Command::Subscribe { listener, reply })?;
        Ok(Subscription {
            id,
            active,
            commands: self.commands.clone(),
        })
    }

    /// Stop the engine, drop every listener, and end the engine thread.
    ///
    /// Idempotent. Every later call on this handle fails with
    /// [`EngineError::Disposed`].
    pub fn dispose(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.request(|done| Command::Dispose { done });
        let _ = handle.join();
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub const fn is_disposed(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for PetEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Disposer returned by [`PetEngine::subscribe`].
///
/// Dropping a `Subscription` does not unsubscribe; call
/// [`dispose`](Self::dispose).
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    active: Arc<AtomicBool>,
    commands: Sender<Command>,
}

impl Subscription {
    /// Stop delivering snapshots to this listener.
    ///
    /// Takes effect immediately, even for a broadcast already in progress
    /// on the engine thread. Later calls do nothing. Safe to call from
    /// inside the listener itself.
    pub fn dispose(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            // Never block: this may run on the engine thread. If the queue
            // is full the closed gate already silences the listener.
            let _ = self.commands.try_send(Command::Unsubscribe { id: self.id });
        }
    }

    /// Whether the listener still receives snapshots.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The engine-side id.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// What woke the engine thread.
enum Event {
    Command(Command),
    Tick(Tick),
    /// The ticker went away between `stop` and the next select.
    Idle,
    /// Every command sender is gone.
    Closed,
}

/// State owned by the engine thread.
struct EngineActor<C: Clock> {
    engine: Engine<C>,
    tick_interval: Duration,
    /// Present while running.
    ticker: Option<TickerActor>,
    /// The ticker's receiver, or `never()` while stopped.
    ticks: Receiver<Tick>,
    /// Last dangling target reported, to log it once.
    dangling: Option<UnknownStateError>,
}

impl<C: Clock> EngineActor<C> {
    fn new(engine: Engine<C>, tick_interval: Duration) -> Self {
        Self {
            engine,
            tick_interval,
            ticker: None,
            ticks: never(),
            dangling: None,
        }
    }

    /// Main engine loop. Exits on dispose or when every handle is gone.
    fn run_loop(mut self, commands: &Receiver<Command>) {
        let done = loop {
            let ticks = self.ticks.clone();
            let event = select! {
                recv(commands) -> command => command.map_or(Event::Closed, Event::Command),
                recv(ticks) -> tick => tick.map_or(Event::Idle, Event::Tick),
            };

            match event {
                Event::Command(command) => {
                    if let ControlFlow::Break(done) = self.handle(command) {
                        break Some(done);
                    }
                }
                Event::Tick(tick) => self.on_tick(tick),
                Event::Idle => {}
                Event::Closed => break None,
            }
        };

        self.halt_ticker();
        self.engine.dispose();
        if let Some(done) = done {
            let _ = done.send(());
        }
    }

    /// Apply one command. Breaks with the acknowledgement sender on dispose.
    fn handle(&mut self, command: Command) -> ControlFlow<Sender<()>> {
        match command {
            Command::Start { done } => {
                if self.ticker.is_none() {
                    let ticker = TickerActor::spawn(self.tick_interval);
                    self.ticks = ticker.receiver().clone();
                    self.ticker = Some(ticker);
                }
                self.engine.start();
                let _ = done.send(());
            }
            Command::Stop { done } => {
                self.engine.stop();
                self.halt_ticker();
                let _ = done.send(());
            }
            Command::SetState { target, reply } => {
                let result = self.engine.set_state(target);
                if result.is_ok() {
                    self.dangling = None;
                }
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Subscribe { listener, reply } => {
                let id = self.engine.subscribe(listener);
                debug!(?id, subscribers = self.engine.subscriber_count(), "listener subscribed");
                let _ = reply.send(id);
            }
            Command::Unsubscribe { id } => {
                self.engine.unsubscribe(id);
            }
            Command::Dispose { done } => return ControlFlow::Break(done),
        }
        ControlFlow::Continue(())
    }

    fn on_tick(&mut self, tick: Tick) {
        match self.engine.tick() {
            Ok(outcome) => {
                if let Some(state) = outcome.transitioned_to {
                    info!(%state, sequence = tick.sequence, "state changed");
                    self.dangling = None;
                }
            }
            Err(err) => {
                if self.dangling != Some(err) {
                    warn!(state = %self.engine.state(), error = %err, "auto transition skipped");
                    self.dangling = Some(err);
                }
            }
        }
    }

    fn halt_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
        }
        self.ticks = never();
    }
}
