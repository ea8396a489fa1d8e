//! Keys identifying states and triggers.
//!
//! A state machine is keyed by caller-supplied values: any equality-comparable
//! type can name a state or a trigger. Strings work out of the box, and the
//! [`state_enum!`](crate::state_enum) / [`trigger_enum!`](crate::trigger_enum)
//! macros generate enum keys.

use std::fmt::Debug;

/// Trait for state values.
///
/// A state value is an opaque key. The engine only compares state values for
/// equality and uses [`State::name`] for diagnostics.
///
/// # Example
///
/// ```rust
/// use parastate::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "Open");
/// assert_eq!("Locked".name(), "Locked");
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

/// Trait for trigger values.
///
/// Triggers label the edges leaving a state. Like states they are opaque,
/// equality-comparable keys.
pub trait Trigger: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Get the trigger's name for display/logging.
    fn name(&self) -> &str;
}

impl State for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl Trigger for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl Trigger for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    enum TestState {
        Idle,
        Running,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Running => "Running",
            }
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Running.name(), "Running");
    }

    #[test]
    fn string_keys_name_themselves() {
        assert_eq!(State::name(&"A"), "A");
        assert_eq!(State::name(&"B".to_string()), "B");
        assert_eq!(Trigger::name(&"To B"), "To B");
        assert_eq!(Trigger::name(&"Loop".to_string()), "Loop");
    }

    #[test]
    fn state_equality_distinguishes_values() {
        assert_eq!(TestState::Idle, TestState::Idle);
        assert_ne!(TestState::Idle, TestState::Running);
    }
}
