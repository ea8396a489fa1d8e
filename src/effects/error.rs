//! Errors raised by the transition engine.

use crate::core::ParameterError;
use thiserror::Error;

/// Error type for faults raised by user-supplied guards, mappings and
/// lifecycle handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while activating or transitioning a machine.
///
/// `NotActivated`, `NoTransition` and `GuardRejected` are soft failures:
/// [`can_transition`](crate::effects::StateMachine::can_transition) and
/// [`try_transition`](crate::effects::StateMachine::try_transition) report
/// them as `Ok(false)`, while
/// [`transition`](crate::effects::StateMachine::transition) returns them as
/// invalid-operation errors. Every other variant is a fault and always
/// propagates.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("State machine has not been activated")]
    NotActivated,

    #[error("No transition for trigger '{trigger}' from state '{state}'")]
    NoTransition { state: String, trigger: String },

    #[error("Guard rejected trigger '{trigger}' from state '{state}'")]
    GuardRejected { state: String, trigger: String },

    #[error("State '{state}' is not registered")]
    UnknownState { state: String },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("Handler failed: {0}")]
    Handler(#[source] HandlerError),

    #[error("Operation was cancelled")]
    Cancelled,
}

impl MachineError {
    /// Whether this is one of the soft-fail conditions.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            Self::NotActivated | Self::NoTransition { .. } | Self::GuardRejected { .. }
        )
    }

    /// The user error behind a handler fault, if any.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(error) => Some(&**error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_failures_are_invalid_operations() {
        assert!(MachineError::NotActivated.is_invalid_operation());
        assert!(MachineError::NoTransition {
            state: "A".to_string(),
            trigger: "go".to_string(),
        }
        .is_invalid_operation());
        assert!(MachineError::GuardRejected {
            state: "A".to_string(),
            trigger: "go".to_string(),
        }
        .is_invalid_operation());
    }

    #[test]
    fn faults_are_not_invalid_operations() {
        assert!(!MachineError::Cancelled.is_invalid_operation());
        assert!(!MachineError::Handler("boom".into()).is_invalid_operation());
    }

    #[test]
    fn handler_error_is_passed_through() {
        let error = MachineError::Handler("disk full".into());

        assert_eq!(
            error.handler_error().map(|e| e.to_string()),
            Some("disk full".to_string())
        );
        assert_eq!(error.to_string(), "Handler failed: disk full");
    }
}
