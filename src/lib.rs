//! Parastate: a typed, parameterized state machine library
//!
//! Each state of a parastate machine carries an ordered tuple of typed
//! parameters. Transitions compute the next state's parameters from the
//! current ones (and from any arguments supplied with the trigger), and every
//! lifecycle handler receives them as a typed tuple.
//!
//! # Core Concepts
//!
//! - **State / Trigger**: identifier types via the [`State`] and [`Trigger`] traits
//! - **Parameters**: tuples of up to [`MAX_ARITY`](crate::core::MAX_ARITY) values, stored type-erased
//! - **Guards and mappings**: typed callables evaluated before a transition commits
//! - **Handlers**: exit, state change, entry and actions, synchronous or suspending
//! - **History**: a bounded record of committed state changes
//!
//! The model is validated when the machine is built, so handler, guard and
//! mapping signatures are checked once rather than on every transition.
//!
//! # Example
//!
//! ```rust
//! use parastate::{StateBuilder, StateMachineBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut machine = StateMachineBuilder::new()
//!     .initial_with("Counting", (0_u32,))
//!     .state(
//!         StateBuilder::new("Counting")
//!             .params::<(u32,)>()
//!             .on("tick", |t| t.map(|(n,)| (n + 1,)).to_self())
//!             .on("stop", |t| t.map(|(n,)| (n, format!("stopped at {n}"))).to("Stopped")),
//!     )
//!     .state(StateBuilder::new("Stopped").params::<(u32, String)>())
//!     .build()
//!     .unwrap();
//!
//! let cancel = CancellationToken::new();
//! machine.activate(&cancel).await.unwrap();
//! machine.transition("tick", (), &cancel).await.unwrap();
//! machine.transition("stop", (), &cancel).await.unwrap();
//!
//! let current = machine.current_state().unwrap();
//! assert_eq!(*current.state(), "Stopped");
//! assert_eq!(
//!     current.parameters().read::<(u32, String)>().unwrap(),
//!     (1, "stopped at 1".to_string())
//! );
//! # });
//! ```

pub mod builder;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use builder::{BuildError, StateBuilder, StateMachineBuilder};
pub use crate::core::{AnyValue, Guard, Params, State, StateHistory, StateTransition, Trigger};
pub use effects::{MachineError, StateMachine};
