//! Effectful state machine operations.
//!
//! This module is the imperative shell around the core types: it stores the
//! user's guards, mapping functions and lifecycle handlers, and runs them in a
//! fixed order when the machine is activated or transitions.
//!
//! # Key Concepts
//!
//! - **Callbacks**: handlers, guards and mappings erased behind one contract,
//!   synchronous or suspending, cancellable through a `CancellationToken`
//! - **Mappings**: compute the next state's parameters from the current ones
//! - **State Machine**: registry of state definitions plus runtime state
//!
//! # Transition pipeline
//!
//! 1. exit handlers of the current state
//! 2. mapping, committed as the new current parameters
//! 3. current state updated to the target
//! 4. machine-level state-change handlers
//! 5. target state-change handlers
//! 6. target entry handlers
//! 7. target action handlers

mod callback;
mod definition;
mod error;
mod machine;
mod mapping;
mod transition;

pub use callback::{Outcome, Verdict};
pub use definition::StateDefinition;
pub use error::{HandlerError, MachineError};
pub use machine::{CurrentState, StateMachine};
pub use transition::{Target, TransitionDefinition};

pub(crate) use callback::{Callback, Change};
pub(crate) use definition::find;
pub(crate) use mapping::Mapping;
