//! Builder for constructing state machines.

use super::error::{BuildError, ModelViolation};
use super::state::StateBuilder;
use crate::core::{Params, Signature, State, Trigger, Value, DEFAULT_HISTORY_LIMIT};
use crate::effects::{find, Callback, Change, Outcome, StateDefinition, StateMachine, TransitionDefinition};
use std::future::Future;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

type Check = Validation<(), NonEmptyVec<ModelViolation>>;

/// Builder for constructing state machines with a fluent API.
///
/// Registering the same state value twice merges the registrations: handlers
/// accumulate, a later transition for the same trigger replaces the earlier
/// one, and the later parameter declaration wins.
pub struct StateMachineBuilder<S: State, T: Trigger> {
    initial: Option<(S, Vec<Value>)>,
    states: Vec<StateDefinition<S, T>>,
    on_state_change: Vec<Callback<Change<S, T>, ()>>,
    history_limit: usize,
}

impl<S: State, T: Trigger> StateMachineBuilder<S, T> {
    pub fn new() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            on_state_change: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Set the initial state (required). The state must take no parameters.
    pub fn initial(self, state: S) -> Self {
        self.initial_with(state, ())
    }

    /// Set the initial state together with its initial parameters.
    pub fn initial_with<P: Params>(mut self, state: S, params: P) -> Self {
        self.initial = Some((state, params.into_values()));
        self
    }

    pub fn state<P: Params>(mut self, builder: StateBuilder<S, T, P>) -> Self {
        let definition = builder.into_definition();
        match self
            .states
            .iter_mut()
            .find(|existing| existing.state == definition.state)
        {
            Some(existing) => {
                debug!(state = definition.state.name(), "merging repeated state registration");
                existing.merge(definition);
            }
            None => self.states.push(definition),
        }
        self
    }

    /// Machine-level handler, run on every state change before the target
    /// state's own handlers.
    pub fn on_state_change<R, F>(mut self, handler: F) -> Self
    where
        R: Outcome,
        F: Fn(&S, &T, &S) -> R + Send + Sync + 'static,
    {
        self.on_state_change
            .push(Callback::change_handler(move |from: &S, trigger: &T, to: &S, (): ()| {
                handler(from, trigger, to)
            }));
        self
    }

    pub fn on_state_change_async<Fut, F>(mut self, handler: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(S, T, S) -> Fut + Send + Sync + 'static,
    {
        self.on_state_change
            .push(Callback::change_handler_async(move |from: S, trigger: T, to: S, (): ()| {
                handler(from, trigger, to)
            }));
        self
    }

    /// Number of transitions kept in history. `0` disables recording.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the state machine.
    ///
    /// Every model violation is reported at once in
    /// [`BuildError::InvalidModel`].
    pub fn build(self) -> Result<StateMachine<S, T>, BuildError> {
        let (initial, initial_params) = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        match validate_model(&self.states, &initial, &initial_params) {
            Validation::Success(_) => {}
            Validation::Failure(errors) => {
                return Err(BuildError::InvalidModel {
                    violations: errors.iter().cloned().collect(),
                });
            }
        }

        debug!(
            initial = initial.name(),
            states = self.states.len(),
            "state machine built"
        );
        Ok(StateMachine::new(
            self.states,
            initial,
            initial_params,
            self.on_state_change,
            self.history_limit,
        ))
    }
}

impl<S: State, T: Trigger> Default for StateMachineBuilder<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the whole model, accumulating every violation.
fn validate_model<S: State, T: Trigger>(
    states: &[StateDefinition<S, T>],
    initial: &S,
    initial_params: &[Value],
) -> Check {
    let mut checks = vec![check_initial(states, initial, initial_params)];

    for definition in states {
        checks.extend(check_handlers(definition));
        for transition in definition.transitions() {
            checks.push(check_source(definition, transition));
            checks.push(check_target(states, definition, transition));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

fn check_initial<S: State, T: Trigger>(
    states: &[StateDefinition<S, T>],
    initial: &S,
    initial_params: &[Value],
) -> Check {
    let found = Signature::of_values(initial_params);
    match find(states, initial) {
        None => Validation::fail(ModelViolation::UnknownInitialState {
            state: initial.name().to_string(),
        }),
        Some(definition) if !definition.signature().accepts(&found) => {
            Validation::fail(ModelViolation::InitialParameters {
                state: initial.name().to_string(),
                expected: definition.signature().to_string(),
                found: found.to_string(),
            })
        }
        Some(_) => Validation::success(()),
    }
}

fn check_handlers<S: State, T: Trigger>(definition: &StateDefinition<S, T>) -> Vec<Check> {
    definition
        .handler_signatures()
        .map(|(handler, signature)| {
            if signature == definition.signature() {
                Validation::success(())
            } else {
                Validation::fail(ModelViolation::HandlerSignature {
                    state: definition.state().name().to_string(),
                    handler,
                    expected: definition.signature().to_string(),
                    found: signature.to_string(),
                })
            }
        })
        .collect()
}

/// A transition declared against an earlier registration of its state must
/// still read the parameters the state now carries.
fn check_source<S: State, T: Trigger>(
    definition: &StateDefinition<S, T>,
    transition: &TransitionDefinition<S, T>,
) -> Check {
    if transition.source_signature() == definition.signature() {
        Validation::success(())
    } else {
        Validation::fail(ModelViolation::TransitionSource {
            state: definition.state().name().to_string(),
            trigger: transition.trigger().name().to_string(),
            expected: definition.signature().to_string(),
            found: transition.source_signature().to_string(),
        })
    }
}

fn check_target<S: State, T: Trigger>(
    states: &[StateDefinition<S, T>],
    definition: &StateDefinition<S, T>,
    transition: &TransitionDefinition<S, T>,
) -> Check {
    let next = transition.target().resolve(definition.state());
    let Some(target) = find(states, &next) else {
        return Validation::fail(ModelViolation::UnknownTarget {
            state: definition.state().name().to_string(),
            trigger: transition.trigger().name().to_string(),
            target: next.name().to_string(),
        });
    };

    let produced = transition.output_signature();
    if target.signature().accepts(&produced) {
        Validation::success(())
    } else {
        Validation::fail(ModelViolation::MappingOutput {
            state: definition.state().name().to_string(),
            trigger: transition.trigger().name().to_string(),
            target: next.name().to_string(),
            expected: target.signature().to_string(),
            found: produced.to_string(),
        })
    }
}
