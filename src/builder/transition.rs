//! Builder for transitions leaving a state.
//!
//! A transition is declared in two stages. Before a mapping is chosen,
//! [`TransitionBuilder::when`] adds a guard over the source state's parameters
//! (followed by any trigger arguments). Choosing a mapping yields a
//! [`MappedTransitionBuilder`], whose `when` guards the mapped, next-state
//! parameters instead.

use crate::core::{Guard, Params, Signature, State, Trigger};
use crate::effects::{Callback, HandlerError, Mapping, Target, TransitionDefinition, Verdict};
use std::future::Future;
use std::marker::PhantomData;

struct Draft<T> {
    trigger: T,
    source: Signature,
    args: Signature,
    pre_guard: Option<Callback<(), bool>>,
}

impl<T> Draft<T> {
    fn finish<S>(
        self,
        mapping: Mapping,
        post_guard: Option<Callback<(), bool>>,
        target: Target<S>,
    ) -> TransitionDefinition<S, T> {
        TransitionDefinition {
            trigger: self.trigger,
            source: self.source,
            args: self.args,
            pre_guard: self.pre_guard,
            mapping,
            post_guard,
            target,
        }
    }
}

/// Transition from a state with parameters `P`, whose guards and mapping read
/// the input tuple `I` (`P` followed by the trigger arguments).
pub struct TransitionBuilder<S, T, P, I> {
    draft: Draft<T>,
    _types: PhantomData<fn() -> (S, P, I)>,
}

impl<S: State, T: Trigger, P: Params, I: Params> TransitionBuilder<S, T, P, I> {
    pub(crate) fn new(trigger: T) -> Self {
        Self {
            draft: Draft {
                trigger,
                source: P::signature(),
                args: I::signature().skip(P::ARITY),
                pre_guard: None,
            },
            _types: PhantomData,
        }
    }

    /// Guard evaluated before mapping, over the current parameters.
    pub fn when<V, F>(mut self, predicate: F) -> Self
    where
        V: Verdict,
        F: Fn(&I) -> V + Send + Sync + 'static,
    {
        self.draft.pre_guard = Some(Callback::guard(predicate));
        self
    }

    /// Suspending guard evaluated before mapping.
    pub fn when_async<Fut, F>(mut self, predicate: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Verdict,
        F: Fn(I) -> Fut + Send + Sync + 'static,
    {
        self.draft.pre_guard = Some(Callback::guard_async(predicate));
        self
    }

    pub fn guard(self, guard: Guard<I>) -> Self {
        self.when(move |params: &I| guard.check(params))
    }

    pub fn map<O, F>(self, f: F) -> MappedTransitionBuilder<S, T, O>
    where
        O: Params,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        MappedTransitionBuilder::new(self.draft, Mapping::map(f))
    }

    pub fn try_map<O, E, F>(self, f: F) -> MappedTransitionBuilder<S, T, O>
    where
        O: Params,
        E: Into<HandlerError>,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        MappedTransitionBuilder::new(self.draft, Mapping::try_map(f))
    }

    pub fn map_async<O, Fut, F>(self, f: F) -> MappedTransitionBuilder<S, T, O>
    where
        O: Params,
        Fut: Future<Output = O> + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
    {
        MappedTransitionBuilder::new(self.draft, Mapping::map_async(f))
    }

    pub fn try_map_async<O, E, Fut, F>(self, f: F) -> MappedTransitionBuilder<S, T, O>
    where
        O: Params,
        E: Into<HandlerError>,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
    {
        MappedTransitionBuilder::new(self.draft, Mapping::try_map_async(f))
    }

    /// The next state takes no parameters.
    pub fn without_params(self) -> MappedTransitionBuilder<S, T, ()> {
        MappedTransitionBuilder::new(self.draft, Mapping::Empty)
    }

    /// Move to `target`, carrying the current parameters over unchanged.
    pub fn to(self, target: S) -> TransitionDefinition<S, T> {
        let mapping = Mapping::Same { arity: P::ARITY };
        self.draft.finish(mapping, None, Target::State(target))
    }

    /// Re-enter the current state with unchanged parameters.
    pub fn to_self(self) -> TransitionDefinition<S, T> {
        let mapping = Mapping::Same { arity: P::ARITY };
        self.draft.finish(mapping, None, Target::Same)
    }
}

/// Transition whose mapping produces the next-state parameters `O`.
pub struct MappedTransitionBuilder<S, T, O> {
    draft: Draft<T>,
    mapping: Mapping,
    post_guard: Option<Callback<(), bool>>,
    _types: PhantomData<fn() -> (S, O)>,
}

impl<S: State, T: Trigger, O: Params> MappedTransitionBuilder<S, T, O> {
    fn new(draft: Draft<T>, mapping: Mapping) -> Self {
        Self {
            draft,
            mapping,
            post_guard: None,
            _types: PhantomData,
        }
    }

    /// Guard evaluated after mapping, over the next-state parameters.
    pub fn when<V, F>(mut self, predicate: F) -> Self
    where
        V: Verdict,
        F: Fn(&O) -> V + Send + Sync + 'static,
    {
        self.post_guard = Some(Callback::guard(predicate));
        self
    }

    pub fn when_async<Fut, F>(mut self, predicate: F) -> Self
    where
        Fut: Future + Send + 'static,
        Fut::Output: Verdict,
        F: Fn(O) -> Fut + Send + Sync + 'static,
    {
        self.post_guard = Some(Callback::guard_async(predicate));
        self
    }

    pub fn guard(self, guard: Guard<O>) -> Self {
        self.when(move |params: &O| guard.check(params))
    }

    pub fn to(self, target: S) -> TransitionDefinition<S, T> {
        self.draft
            .finish(self.mapping, self.post_guard, Target::State(target))
    }

    pub fn to_self(self) -> TransitionDefinition<S, T> {
        self.draft.finish(self.mapping, self.post_guard, Target::Same)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Concat;

    type Builder<P, I> = TransitionBuilder<&'static str, &'static str, P, I>;

    #[test]
    fn plain_transition_keeps_source_signature() {
        let definition = Builder::<(i32,), (i32,)>::new("go").to("B");

        assert_eq!(definition.trigger(), &"go");
        assert_eq!(definition.target(), &Target::State("B"));
        assert_eq!(definition.output_signature(), Signature::of::<(i32,)>());
        assert!(definition.argument_signature().is_empty());
        assert!(!definition.is_guarded());
    }

    #[test]
    fn trigger_arguments_follow_source_parameters() {
        type Input = <(i32,) as Concat<(String, bool)>>::Output;
        let definition = Builder::<(i32,), Input>::new("go")
            .when(|(count, _, enabled)| *enabled && *count > 0)
            .to_self();

        assert_eq!(
            definition.argument_signature(),
            &Signature::of::<(String, bool)>()
        );
        assert_eq!(definition.source_signature(), &Signature::of::<(i32,)>());
        assert!(definition.is_loop());
        assert!(definition.is_guarded());
    }

    #[test]
    fn mapping_changes_output_signature() {
        let definition = Builder::<(i32,), (i32,)>::new("go")
            .map(|(x,)| (x, x.to_string()))
            .when(|(_, text)| !text.is_empty())
            .to("B");

        assert_eq!(
            definition.output_signature(),
            Signature::of::<(i32, String)>()
        );
        assert!(definition.is_guarded());
    }

    #[test]
    fn without_params_empties_output() {
        let definition = Builder::<(u8, u8), (u8, u8)>::new("reset")
            .without_params()
            .to("Idle");

        assert!(definition.output_signature().is_empty());
    }

    #[test]
    fn typed_guard_can_be_attached() {
        let definition = Builder::<(u32,), (u32,)>::new("go")
            .guard(Guard::new(|(n,): &(u32,)| *n < 10))
            .to("B");

        assert!(definition.is_guarded());
    }
}
