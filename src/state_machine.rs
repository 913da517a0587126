//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern: a pure transition function over
//! per-session state, with all I/O described as effects for the runtime.

pub mod effect;
pub mod event;
pub mod state;
pub mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, MenuView, Prompt};
pub use event::{Button, Event};
pub use state::{ChatId, Session, SessionState};
pub use transition::{transition, ProtocolViolation, TransitionResult};
