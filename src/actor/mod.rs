//! Actor Model: the engine confined to its own thread.
//!
//! - **Ticker Actor**: fires ticks at a fixed cadence while the engine runs
//! - **Engine Actor**: owns the [`Engine`](crate::engine::Engine), applies
//!   ticks and commands one at a time, and calls listeners
//! - **`PetEngine`**: the handle the host holds; each call is a command with
//!   a synchronous reply
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐       Tick        ┌──────────────┐
//! │ Ticker Thread│ ────────────────▶ │              │
//! └──────────────┘                   │ Engine Thread│ ──▶ listeners
//!                                    │              │    (EngineSnapshot)
//! ┌──────────────┐     Command       │              │
//! │  PetEngine   │ ────────────────▶ │              │
//! │   (host)     │ ◀──────────────── │              │
//! └──────────────┘      reply        └──────────────┘
//! ```

mod engine;
mod messages;
mod ticker;

pub use engine::{PetEngine, Subscription};
pub use ticker::{Tick, TickerActor};
