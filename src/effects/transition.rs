//! Transition definitions.

use super::callback::Callback;
use super::mapping::Mapping;
use crate::core::{Signature, State, Trigger};

/// Where a transition leads.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<S> {
    /// Move to a concrete state.
    State(S),
    /// Re-enter the current state. Exit and entry handlers still run.
    Same,
}

impl<S: State> Target<S> {
    /// The state the machine ends up in when leaving `current`.
    pub fn resolve(&self, current: &S) -> S {
        match self {
            Self::State(state) => state.clone(),
            Self::Same => current.clone(),
        }
    }
}

/// A transition leaving a state: trigger, guards, mapping and target.
///
/// The pre-mapping guard reads the source state's parameters followed by the
/// trigger arguments; the post-mapping guard reads the mapped parameters.
pub struct TransitionDefinition<S, T> {
    pub(crate) trigger: T,
    pub(crate) source: Signature,
    pub(crate) args: Signature,
    pub(crate) pre_guard: Option<Callback<(), bool>>,
    pub(crate) mapping: Mapping,
    pub(crate) post_guard: Option<Callback<(), bool>>,
    pub(crate) target: Target<S>,
}

impl<S: State, T: Trigger> TransitionDefinition<S, T> {
    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn target(&self) -> &Target<S> {
        &self.target
    }

    /// Signature of the source state this transition was declared against.
    pub fn source_signature(&self) -> &Signature {
        &self.source
    }

    /// Types of the arguments the trigger must be fired with.
    pub fn argument_signature(&self) -> &Signature {
        &self.args
    }

    /// Types of the parameters handed to the target state.
    pub fn output_signature(&self) -> Signature {
        self.mapping.output(&self.source)
    }

    pub fn is_guarded(&self) -> bool {
        self.pre_guard.is_some() || self.post_guard.is_some()
    }

    pub fn is_loop(&self) -> bool {
        self.target == Target::Same
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(
        target: Target<&'static str>,
        mapping: Mapping,
    ) -> TransitionDefinition<&'static str, &'static str> {
        TransitionDefinition {
            trigger: "go",
            source: Signature::of::<(i32,)>(),
            args: Signature::empty(),
            pre_guard: None,
            mapping,
            post_guard: None,
            target,
        }
    }

    #[test]
    fn target_resolves_against_current_state() {
        assert_eq!(Target::State("B").resolve(&"A"), "B");
        assert_eq!(Target::<&str>::Same.resolve(&"A"), "A");
    }

    #[test]
    fn output_signature_follows_mapping() {
        let same = definition(Target::State("B"), Mapping::Same { arity: 1 });
        assert_eq!(same.output_signature(), Signature::of::<(i32,)>());

        let mapped = definition(
            Target::State("B"),
            Mapping::map(|(x,): (i32,)| (x, x.to_string())),
        );
        assert_eq!(mapped.output_signature(), Signature::of::<(i32, String)>());
    }

    #[test]
    fn loop_and_guard_flags() {
        let mut looped = definition(Target::Same, Mapping::Empty);
        assert!(looped.is_loop());
        assert!(!looped.is_guarded());

        looped.post_guard = Some(Callback::guard(|_: &()| true));
        assert!(looped.is_guarded());
        assert_eq!(looped.trigger(), &"go");
    }
}
