//! Core state machine types.
//!
//! This module contains the data the transition engine is built on:
//! - State and trigger keys via the `State` and `Trigger` traits
//! - Boxed, type-checked parameter storage
//! - Guard predicates over typed parameters
//! - Bounded history of committed state changes
//!
//! Nothing in this module performs I/O or runs user callbacks; the
//! effectful side of the machine lives in [`crate::effects`].

mod guard;
mod history;
mod params;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use params::{
    AnyValue, Concat, ParamType, Parameter, ParameterError, ParameterStore, Params, Signature,
    Value, MAX_ARITY,
};
pub use state::{State, Trigger};
