//! Orchestration loop state machine
//!
//! Pure state transitions in the Elm style: `transition` maps the current
//! state and an event to the next state plus the effects the executor must
//! perform. All I/O (model requests, function dispatch, the clock) lives in
//! the executor.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{LoopContext, LoopState, PendingCall};
pub use transition::{transition, TransitionError, TransitionResult};
