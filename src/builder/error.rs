//! Build errors for state machine construction.

use thiserror::Error;

/// A single problem found while validating a state machine model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelViolation {
    #[error("Initial state '{state}' is not registered")]
    UnknownInitialState { state: String },

    #[error("Initial parameters {found} do not fit state '{state}' declared as {expected}")]
    InitialParameters {
        state: String,
        expected: String,
        found: String,
    },

    #[error("Transition '{trigger}' from '{state}' targets unregistered state '{target}'")]
    UnknownTarget {
        state: String,
        trigger: String,
        target: String,
    },

    #[error(
        "Transition '{trigger}' from '{state}' produces {found}, but '{target}' is declared as {expected}"
    )]
    MappingOutput {
        state: String,
        trigger: String,
        target: String,
        expected: String,
        found: String,
    },

    #[error("Transition '{trigger}' was declared for '{state}' as {found}, but the state is declared as {expected}")]
    TransitionSource {
        state: String,
        trigger: String,
        expected: String,
        found: String,
    },

    #[error("Handler {handler} of '{state}' takes {found}, but the state is declared as {expected}")]
    HandlerSignature {
        state: String,
        handler: &'static str,
        expected: String,
        found: String,
    },
}

/// Errors that can occur when building state machines.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("State machine model is invalid ({} violation(s))", .violations.len())]
    InvalidModel { violations: Vec<ModelViolation> },
}

impl BuildError {
    /// Every violation behind an `InvalidModel` error.
    pub fn violations(&self) -> &[ModelViolation] {
        match self {
            Self::InvalidModel { violations } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_model_counts_violations() {
        let error = BuildError::InvalidModel {
            violations: vec![
                ModelViolation::UnknownInitialState {
                    state: "Start".to_string(),
                },
                ModelViolation::UnknownTarget {
                    state: "Start".to_string(),
                    trigger: "go".to_string(),
                    target: "Nowhere".to_string(),
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "State machine model is invalid (2 violation(s))"
        );
        assert_eq!(error.violations().len(), 2);
    }

    #[test]
    fn other_errors_carry_no_violations() {
        assert!(BuildError::MissingInitialState.violations().is_empty());
        assert!(BuildError::NoStates.violations().is_empty());
    }

    #[test]
    fn violation_messages_name_the_offender() {
        let violation = ModelViolation::HandlerSignature {
            state: "Counting".to_string(),
            handler: "on_entry",
            expected: "(u32)".to_string(),
            found: "()".to_string(),
        };

        assert_eq!(
            violation.to_string(),
            "Handler on_entry of 'Counting' takes (), but the state is declared as (u32)"
        );
    }
}
