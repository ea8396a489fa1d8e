//! State machine that activates and drives transitions.

use super::callback::{Callback, Change};
use super::definition::{find, StateDefinition};
use super::error::MachineError;
use super::transition::TransitionDefinition;
use crate::core::{
    ParameterError, ParameterStore, Params, Signature, State, StateHistory, StateTransition,
    Trigger, Value,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Runtime state, created by activation.
struct Runtime<S> {
    state: S,
    parameters: ParameterStore,
    active: bool,
}

/// Read-only view of the current state and its parameters.
pub struct CurrentState<'a, S> {
    state: &'a S,
    parameters: &'a ParameterStore,
}

impl<'a, S> CurrentState<'a, S> {
    pub fn state(&self) -> &'a S {
        self.state
    }

    pub fn parameters(&self) -> &'a ParameterStore {
        self.parameters
    }
}

/// A transition that passed lookup and guards and is ready to run.
struct Plan<'a, S, T> {
    source: &'a StateDefinition<S, T>,
    target: &'a StateDefinition<S, T>,
    transition: &'a TransitionDefinition<S, T>,
    input: Vec<Value>,
    mapped: Option<Vec<Value>>,
}

enum Lookup<'a, S, T> {
    Ready(Plan<'a, S, T>),
    Rejected(MachineError),
}

/// A parameterized state machine.
///
/// The registry of states is fixed when the machine is built. Runtime state
/// is seeded by [`activate`](Self::activate) and changed only by successful
/// transitions. Operations take `&mut self`, so calls on one machine are
/// serialized by the borrow checker.
///
/// # Example
///
/// ```rust
/// use parastate::builder::{StateBuilder, StateMachineBuilder};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut machine = StateMachineBuilder::new()
///     .initial("Idle")
///     .state(StateBuilder::new("Idle").on("start", |t| t.to("Running")))
///     .state(StateBuilder::new("Running"))
///     .build()
///     .unwrap();
///
/// let cancel = CancellationToken::new();
/// machine.activate(&cancel).await.unwrap();
/// machine.transition("start", (), &cancel).await.unwrap();
///
/// assert_eq!(machine.current_state().map(|c| *c.state()), Some("Running"));
/// # });
/// ```
pub struct StateMachine<S: State, T: Trigger> {
    states: Vec<StateDefinition<S, T>>,
    initial: S,
    initial_params: Vec<Value>,
    on_state_change: Vec<Callback<Change<S, T>, ()>>,
    runtime: Option<Runtime<S>>,
    history: StateHistory<S, T>,
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    pub(crate) fn new(
        states: Vec<StateDefinition<S, T>>,
        initial: S,
        initial_params: Vec<Value>,
        on_state_change: Vec<Callback<Change<S, T>, ()>>,
        history_limit: usize,
    ) -> Self {
        Self {
            states,
            initial,
            initial_params,
            on_state_change,
            runtime: None,
            history: StateHistory::with_limit(history_limit),
        }
    }

    pub fn is_active(&self) -> bool {
        self.runtime.as_ref().is_some_and(|runtime| runtime.active)
    }

    /// Current state and parameters, or `None` before activation completes.
    pub fn current_state(&self) -> Option<CurrentState<'_, S>> {
        self.runtime
            .as_ref()
            .filter(|runtime| runtime.active)
            .map(|runtime| CurrentState {
                state: &runtime.state,
                parameters: &runtime.parameters,
            })
    }

    pub fn initial_state(&self) -> &S {
        &self.initial
    }

    /// Every registered state value.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.states.iter().map(StateDefinition::state)
    }

    pub fn definition(&self, state: &S) -> Option<&StateDefinition<S, T>> {
        find(&self.states, state)
    }

    /// Triggers declared on the current state, guards not evaluated.
    pub fn permitted_triggers(&self) -> Vec<&T> {
        self.current_state()
            .and_then(|current| find(&self.states, current.state()))
            .map(|definition| definition.triggers().collect())
            .unwrap_or_default()
    }

    pub fn history(&self) -> &StateHistory<S, T> {
        &self.history
    }

    /// Seed the initial state and parameters and run its entry handlers.
    ///
    /// The machine counts as active only once every entry handler has
    /// completed. Calling this on an active machine does nothing; calling it
    /// after a failed activation seeds the machine again.
    pub async fn activate(&mut self, cancel: &CancellationToken) -> Result<(), MachineError> {
        if self.is_active() {
            debug!(state = self.initial.name(), "machine already active, ignoring activation");
            return Ok(());
        }

        let definition =
            find(&self.states, &self.initial).ok_or_else(|| MachineError::UnknownState {
                state: self.initial.name().to_string(),
            })?;

        let runtime = self.runtime.insert(Runtime {
            state: self.initial.clone(),
            parameters: ParameterStore::new(self.initial_params.clone()),
            active: false,
        });

        for handler in &definition.on_entry {
            if let Err(error) = handler.call(&(), runtime.parameters.values(), cancel).await {
                warn!(state = definition.state.name(), %error, "activation aborted");
                return Err(error);
            }
        }

        runtime.active = true;
        debug!(state = definition.state.name(), "machine activated");
        Ok(())
    }

    /// Whether `trigger` could fire now with `args`.
    ///
    /// Returns `Ok(false)` when the machine is inactive, no transition is
    /// declared for the trigger, or a guard rejects it. Nothing is mutated and
    /// no lifecycle handler runs; a post-mapping guard sees the mapped values,
    /// which are then discarded.
    pub async fn can_transition<A: Params>(
        &self,
        trigger: T,
        args: A,
        cancel: &CancellationToken,
    ) -> Result<bool, MachineError> {
        let lookup = evaluate(
            &self.states,
            self.runtime.as_ref(),
            &trigger,
            args.into_values(),
            cancel,
        )
        .await?;

        match lookup {
            Lookup::Ready(_) => Ok(true),
            Lookup::Rejected(reason) => {
                trace!(trigger = trigger.name(), %reason, "probe rejected");
                Ok(false)
            }
        }
    }

    /// Fire `trigger` if possible, reporting soft failures as `Ok(false)`.
    pub async fn try_transition<A: Params>(
        &mut self,
        trigger: T,
        args: A,
        cancel: &CancellationToken,
    ) -> Result<bool, MachineError> {
        Ok(self.attempt(trigger, args.into_values(), cancel).await?.is_ok())
    }

    /// Fire `trigger`, reporting soft failures as invalid-operation errors.
    pub async fn transition<A: Params>(
        &mut self,
        trigger: T,
        args: A,
        cancel: &CancellationToken,
    ) -> Result<(), MachineError> {
        self.attempt(trigger, args.into_values(), cancel).await?
    }

    /// Outer error: a fault. Inner error: a soft-fail rejection.
    async fn attempt(
        &mut self,
        trigger: T,
        args: Vec<Value>,
        cancel: &CancellationToken,
    ) -> Result<Result<(), MachineError>, MachineError> {
        let lookup = evaluate(&self.states, self.runtime.as_ref(), &trigger, args, cancel).await?;

        let plan = match lookup {
            Lookup::Ready(plan) => plan,
            Lookup::Rejected(reason) => {
                debug!(trigger = trigger.name(), %reason, "transition rejected");
                return Ok(Err(reason));
            }
        };

        let Some(runtime) = self.runtime.as_mut() else {
            return Ok(Err(MachineError::NotActivated));
        };

        let from = plan.source.state.name().to_string();
        let name = trigger.name().to_string();
        if let Err(error) = execute(
            plan,
            trigger,
            &self.on_state_change,
            runtime,
            &mut self.history,
            cancel,
        )
        .await
        {
            warn!(state = %from, trigger = %name, %error, "transition aborted");
            return Err(error);
        }

        Ok(Ok(()))
    }
}

/// Look up the transition for `trigger` and evaluate its guards.
async fn evaluate<'a, S: State, T: Trigger>(
    states: &'a [StateDefinition<S, T>],
    runtime: Option<&Runtime<S>>,
    trigger: &T,
    args: Vec<Value>,
    cancel: &CancellationToken,
) -> Result<Lookup<'a, S, T>, MachineError> {
    let Some(runtime) = runtime.filter(|runtime| runtime.active) else {
        return Ok(Lookup::Rejected(MachineError::NotActivated));
    };

    let source = find(states, &runtime.state).ok_or_else(|| MachineError::UnknownState {
        state: runtime.state.name().to_string(),
    })?;

    let Some(transition) = source.transition(trigger) else {
        return Ok(Lookup::Rejected(MachineError::NoTransition {
            state: runtime.state.name().to_string(),
            trigger: trigger.name().to_string(),
        }));
    };

    let supplied = Signature::of_values(&args);
    if !transition.args.accepts(&supplied) {
        return Err(ParameterError::Arguments {
            expected: transition.args.to_string(),
            found: supplied.to_string(),
        }
        .into());
    }

    let next = transition.target.resolve(&runtime.state);
    let target = find(states, &next).ok_or_else(|| MachineError::UnknownState {
        state: next.name().to_string(),
    })?;

    let mut input = runtime.parameters.values().to_vec();
    input.extend(args);

    let rejected = || MachineError::GuardRejected {
        state: runtime.state.name().to_string(),
        trigger: trigger.name().to_string(),
    };

    if let Some(guard) = &transition.pre_guard {
        if !guard.call(&(), &input, cancel).await? {
            return Ok(Lookup::Rejected(rejected()));
        }
    }

    let mapped = match &transition.post_guard {
        Some(guard) => {
            let mapped = transition.mapping.apply(&input, cancel).await?;
            if !guard.call(&(), &mapped, cancel).await? {
                return Ok(Lookup::Rejected(rejected()));
            }
            Some(mapped)
        }
        None => None,
    };

    Ok(Lookup::Ready(Plan {
        source,
        target,
        transition,
        input,
        mapped,
    }))
}

/// Run the lifecycle pipeline for a planned transition.
///
/// Exit, mapping, state update, machine-level change, state-level change,
/// entry, actions. A fault stops the pipeline where it happens; earlier steps
/// are not undone.
async fn execute<S: State, T: Trigger>(
    plan: Plan<'_, S, T>,
    trigger: T,
    machine_handlers: &[Callback<Change<S, T>, ()>],
    runtime: &mut Runtime<S>,
    history: &mut StateHistory<S, T>,
    cancel: &CancellationToken,
) -> Result<(), MachineError> {
    let Plan {
        source,
        target,
        transition,
        input,
        mapped,
    } = plan;

    trace!(state = source.state.name(), "running exit handlers");
    for handler in &source.on_exit {
        handler.call(&(), runtime.parameters.values(), cancel).await?;
    }

    let next = match mapped {
        Some(values) => values,
        None => transition.mapping.apply(&input, cancel).await?,
    };
    runtime.parameters.replace(next);

    let from = runtime.state.clone();
    let to = transition.target.resolve(&from);
    runtime.state = to.clone();
    // Recorded on commit; a later handler fault does not remove the entry.
    history.record(StateTransition::new(
        from.clone(),
        trigger.clone(),
        to.clone(),
    ));
    debug!(
        from = from.name(),
        trigger = trigger.name(),
        to = to.name(),
        "state changed"
    );

    let change = Change { from, trigger, to };
    let params = runtime.parameters.values();

    for handler in machine_handlers {
        handler.call(&change, &[], cancel).await?;
    }

    trace!(state = target.state.name(), "running entry handlers");
    for handler in &target.on_state_change {
        handler.call(&change, params, cancel).await?;
    }
    for handler in &target.on_entry {
        handler.call(&(), params, cancel).await?;
    }
    for handler in &target.actions {
        handler.call(&(), params, cancel).await?;
    }

    Ok(())
}
