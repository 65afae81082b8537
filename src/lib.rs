//! # Petwheel
//!
//! A host-agnostic animation and state engine for desktop pets.
//!
//! Given a declarative set of named states (each a looping sequence of timed
//! frames) and the transitions between them, Petwheel advances frames over
//! time, applies automatic transitions once their dwell time has elapsed,
//! and publishes immutable snapshots of what should be on screen.
//!
//! ## Core Concepts
//!
//! - **Validated configuration**: a [`PetConfig`] is checked once, up front
//! - **Injected clock**: time comes from a monotonic [`Clock`], never the wall clock
//! - **Atomic ticks**: frame advance, then transition, then broadcast
//! - **Actor model**: [`PetEngine`] confines the engine to one thread
//!
//! ## Example
//!
//! ```rust,ignore
//! use petwheel::{sample_config, EngineConfig, PetEngine, PetState};
//!
//! let engine = PetEngine::spawn(sample_config(), &EngineConfig::default())?;
//! let subscription = engine.subscribe(|snapshot| {
//!     println!("{} frame {}", snapshot.state, snapshot.frame_index);
//! })?;
//! engine.start()?;
//! engine.set_state(PetState::Playing)?;
//! subscription.dispose();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod registry;

// Re-exports for convenience
pub use actor::{PetEngine, Subscription};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{EngineConfig, TransitionValidation};
pub use engine::{Engine, EngineSnapshot, SubscriptionId, TickOutcome};
pub use error::{ConfigError, EngineError, UnknownStateError};
pub use model::sample::sample_config;
pub use model::{AnimationFrame, PetConfig, PetState, StateDefinition, StateTransition, TransitionKind};
pub use registry::StateRegistry;
