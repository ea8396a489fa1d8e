//! Builder for state definitions.

use super::transition::TransitionBuilder;
use crate::core::{Concat, Params, Signature, State, Trigger};
use crate::effects::{Callback, Outcome, StateDefinition, TransitionDefinition};
use std::future::Future;
use std::marker::PhantomData;

/// Declares one state, the parameters it carries, its lifecycle handlers and
/// its outgoing transitions.
///
/// Handlers are typed against the state's parameter tuple `P`; a state with
/// no parameters uses `()`.
///
/// ```rust
/// use parastate::builder::StateBuilder;
///
/// let counting = StateBuilder::<&str, &str, ()>::new("Counting")
///     .params::<(u32,)>()
///     .on_entry(|(count,)| println!("count is {count}"))
///     .on("tick", |t| t.map(|(count,)| (count + 1,)).to_self());
/// # let _ = counting;
/// ```
pub struct StateBuilder<S, T, P> {
    definition: StateDefinition<S, T>,
    _params: PhantomData<fn() -> P>,
}

impl<S: State, T: Trigger> StateBuilder<S, T, ()> {
    pub fn new(state: S) -> Self {
        Self {
            definition: StateDefinition::new(state, Signature::empty()),
            _params: PhantomData,
        }
    }

    /// Declare the parameter tuple this state carries.
    pub fn params<P: Params>(self) -> StateBuilder<S, T, P> {
        let mut definition = self.definition;
        definition.signature = P::signature();
        StateBuilder {
            definition,
            _params: PhantomData,
        }
    }
}

impl<S: State, T: Trigger, P: Params> StateBuilder<S, T, P> {
    pub fn on_entry<R, F>(mut self, handler: F) -> Self
    where
        R: Outcome,
        F: Fn(P) -> R + Send + Sync + 'static,
    {
        self.definition.on_entry.push(Callback::handler(handler));
        self
    }

    pub fn on_entry_async<Fut, F>(mut self, handler: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(P) -> Fut + Send + Sync + 'static,
    {
        self.definition.on_entry.push(Callback::handler_async(handler));
        self
    }

    pub fn on_exit<R, F>(mut self, handler: F) -> Self
    where
        R: Outcome,
        F: Fn(P) -> R + Send + Sync + 'static,
    {
        self.definition.on_exit.push(Callback::handler(handler));
        self
    }

    pub fn on_exit_async<Fut, F>(mut self, handler: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(P) -> Fut + Send + Sync + 'static,
    {
        self.definition.on_exit.push(Callback::handler_async(handler));
        self
    }

    /// Runs when a transition lands in this state, after the machine-level
    /// change handlers and before entry handlers.
    pub fn on_state_change<R, F>(mut self, handler: F) -> Self
    where
        R: Outcome,
        F: Fn(&S, &T, &S, P) -> R + Send + Sync + 'static,
    {
        self.definition
            .on_state_change
            .push(Callback::change_handler(handler));
        self
    }

    pub fn on_state_change_async<Fut, F>(mut self, handler: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(S, T, S, P) -> Fut + Send + Sync + 'static,
    {
        self.definition
            .on_state_change
            .push(Callback::change_handler_async(handler));
        self
    }

    /// Runs after entry handlers whenever a transition lands in this state.
    /// Actions do not run on activation.
    pub fn action<R, F>(mut self, handler: F) -> Self
    where
        R: Outcome,
        F: Fn(P) -> R + Send + Sync + 'static,
    {
        self.definition.actions.push(Callback::handler(handler));
        self
    }

    pub fn action_async<Fut, F>(mut self, handler: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(P) -> Fut + Send + Sync + 'static,
    {
        self.definition.actions.push(Callback::handler_async(handler));
        self
    }

    /// Declare the transition fired by `trigger` without arguments.
    pub fn on<F>(self, trigger: T, build: F) -> Self
    where
        F: FnOnce(TransitionBuilder<S, T, P, P>) -> TransitionDefinition<S, T>,
    {
        let transition = build(TransitionBuilder::new(trigger));
        self.transition(transition)
    }

    /// Declare the transition fired by `trigger` with arguments `A`.
    ///
    /// Guards and mappings read the state's parameters followed by the
    /// arguments, so `(i32,)` fired with `(String,)` reads `(i32, String)`.
    pub fn on_with<A, F>(self, trigger: T, build: F) -> Self
    where
        A: Params,
        P: Concat<A>,
        F: FnOnce(TransitionBuilder<S, T, P, <P as Concat<A>>::Output>) -> TransitionDefinition<S, T>,
    {
        let transition = build(TransitionBuilder::new(trigger));
        self.transition(transition)
    }

    /// Add a transition built elsewhere. A later transition for the same
    /// trigger replaces the earlier one.
    pub fn transition(mut self, transition: TransitionDefinition<S, T>) -> Self {
        self.definition.add_transition(transition);
        self
    }

    pub(crate) fn into_definition(self) -> StateDefinition<S, T> {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Target;

    #[test]
    fn params_sets_signature() {
        let definition = StateBuilder::<&str, &str, ()>::new("A")
            .params::<(i32, String)>()
            .into_definition();

        assert_eq!(definition.signature(), &Signature::of::<(i32, String)>());
    }

    #[test]
    fn handlers_are_typed_against_state_parameters() {
        let definition = StateBuilder::<&str, &str, ()>::new("A")
            .params::<(i32,)>()
            .on_entry(|(_x,)| {})
            .on_exit(|(_x,)| Ok::<(), String>(()))
            .action(|(_x,)| {})
            .on_state_change(|_, _, _, (_x,)| {})
            .into_definition();

        let names: Vec<_> = definition.handler_signatures().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["on_entry", "on_exit", "on_state_change", "action"]);
        assert!(definition
            .handler_signatures()
            .all(|(_, signature)| signature == &Signature::of::<(i32,)>()));
    }

    #[test]
    fn on_with_records_argument_signature() {
        let definition = StateBuilder::<&str, &str, ()>::new("A")
            .params::<(i32,)>()
            .on_with::<(String,), _>("rename", |t| {
                t.map(|(n, name)| (n, name)).to("B")
            })
            .into_definition();

        let transition = definition.transition(&"rename").unwrap();
        assert_eq!(transition.argument_signature(), &Signature::of::<(String,)>());
        assert_eq!(
            transition.output_signature(),
            Signature::of::<(i32, String)>()
        );
    }

    #[test]
    fn redeclared_trigger_replaces_transition() {
        let definition = StateBuilder::<&str, &str, ()>::new("A")
            .on("go", |t| t.to("B"))
            .on("go", |t| t.to_self())
            .into_definition();

        assert_eq!(definition.transitions().len(), 1);
        assert_eq!(
            definition.transition(&"go").map(|t| t.target().clone()),
            Some(Target::Same)
        );
    }
}
