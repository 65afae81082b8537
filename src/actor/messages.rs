//! Message types for actor communication.
//!
//! Every public operation on [`PetEngine`](super::PetEngine) becomes one
//! [`Command`] processed on the engine thread. Commands that report back
//! carry a single-use reply channel.

use crate::engine::{EngineSnapshot, Listener, SubscriptionId};
use crate::error::UnknownStateError;
use crate::model::PetState;
use crossbeam_channel::Sender;

/// Commands sent to the engine thread.
pub enum Command {
    /// Start ticking (or re-emit if already running).
    Start {
        /// Acknowledged once the engine is running.
        done: Sender<()>,
    },

    /// Stop ticking.
    Stop {
        /// Acknowledged once no further tick will be applied.
        done: Sender<()>,
    },

    /// Force a transition.
    SetState {
        /// Requested state.
        target: PetState,
        /// Outcome of the request.
        reply: Sender<Result<(), UnknownStateError>>,
    },

    /// Capture the current snapshot.
    Snapshot {
        /// The snapshot.
        reply: Sender<EngineSnapshot>,
    },

    /// Register a listener.
    Subscribe {
        /// Callback, run on the engine thread.
        listener: Listener,
        /// Assigned subscription.
        reply: Sender<SubscriptionId>,
    },

    /// Remove a listener. Fire-and-forget, so it is safe to send from
    /// inside a listener.
    Unsubscribe {
        /// Subscription to drop.
        id: SubscriptionId,
    },

    /// Stop, drop all listeners, and exit the engine thread.
    Dispose {
        /// Acknowledged just before the thread exits.
        done: Sender<()>,
    },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start { .. } => f.write_str("Start"),
            Self::Stop { .. } => f.write_str("Stop"),
            Self::SetState { target, .. } => write!(f, "SetState({target})"),
            Self::Snapshot { .. } => f.write_str("Snapshot"),
            Self::Subscribe { .. } => f.write_str("Subscribe"),
            Self::Unsubscribe { id } => write!(f, "Unsubscribe({id:?})"),
            Self::Dispose { .. } => f.write_str("Dispose"),
        }
    }
}
