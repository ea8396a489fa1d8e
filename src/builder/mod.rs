//! Builder API for declaring state machines.
//!
//! States are declared with [`StateBuilder`], transitions inside a state with
//! [`TransitionBuilder`], and the whole model is assembled and validated by
//! [`StateMachineBuilder::build`]. The `state_enum!` and `trigger_enum!`
//! macros generate identifier enums with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;
pub mod transition;

pub use error::{BuildError, ModelViolation};
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
pub use transition::{MappedTransitionBuilder, TransitionBuilder};
