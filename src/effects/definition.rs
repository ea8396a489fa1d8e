//! State definitions held by the machine's registry.

use super::callback::{Callback, Change};
use super::transition::TransitionDefinition;
use crate::core::{Signature, State, Trigger};

/// A registered state: its value, parameter signature, lifecycle handlers and
/// outgoing transitions.
pub struct StateDefinition<S, T> {
    pub(crate) state: S,
    pub(crate) signature: Signature,
    pub(crate) on_entry: Vec<Callback<(), ()>>,
    pub(crate) on_exit: Vec<Callback<(), ()>>,
    pub(crate) on_state_change: Vec<Callback<Change<S, T>, ()>>,
    pub(crate) actions: Vec<Callback<(), ()>>,
    pub(crate) transitions: Vec<TransitionDefinition<S, T>>,
}

impl<S: State, T: Trigger> StateDefinition<S, T> {
    pub(crate) fn new(state: S, signature: Signature) -> Self {
        Self {
            state,
            signature,
            on_entry: Vec::new(),
            on_exit: Vec::new(),
            on_state_change: Vec::new(),
            actions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The transition fired by `trigger`, if one is declared.
    pub fn transition(&self, trigger: &T) -> Option<&TransitionDefinition<S, T>> {
        self.transitions.iter().find(|t| t.trigger == *trigger)
    }

    pub fn transitions(&self) -> &[TransitionDefinition<S, T>] {
        &self.transitions
    }

    pub fn triggers(&self) -> impl Iterator<Item = &T> {
        self.transitions.iter().map(|t| &t.trigger)
    }

    /// Add a transition, replacing any earlier one for the same trigger.
    pub(crate) fn add_transition(&mut self, transition: TransitionDefinition<S, T>) {
        self.transitions.retain(|t| t.trigger != transition.trigger);
        self.transitions.push(transition);
    }

    /// Fold a later registration of the same state value into this one.
    ///
    /// Handlers accumulate in declaration order, transitions for a trigger
    /// already present replace the earlier ones, and the later signature wins.
    pub(crate) fn merge(&mut self, other: StateDefinition<S, T>) {
        self.signature = other.signature;
        self.on_entry.extend(other.on_entry);
        self.on_exit.extend(other.on_exit);
        self.on_state_change.extend(other.on_state_change);
        self.actions.extend(other.actions);
        for transition in other.transitions {
            self.add_transition(transition);
        }
    }

    /// Every handler paired with the name it was declared under.
    pub(crate) fn handler_signatures(&self) -> impl Iterator<Item = (&'static str, &Signature)> {
        let entry = self.on_entry.iter().map(|h| ("on_entry", h.signature()));
        let exit = self.on_exit.iter().map(|h| ("on_exit", h.signature()));
        let change = self
            .on_state_change
            .iter()
            .map(|h| ("on_state_change", h.signature()));
        let actions = self.actions.iter().map(|h| ("action", h.signature()));
        entry.chain(exit).chain(change).chain(actions)
    }
}

pub(crate) fn find<'a, S: State, T: Trigger>(
    states: &'a [StateDefinition<S, T>],
    state: &S,
) -> Option<&'a StateDefinition<S, T>> {
    states.iter().find(|definition| definition.state == *state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::mapping::Mapping;
    use crate::effects::transition::Target;

    fn transition(
        trigger: &'static str,
        target: &'static str,
    ) -> TransitionDefinition<&'static str, &'static str> {
        TransitionDefinition {
            trigger,
            source: Signature::empty(),
            args: Signature::empty(),
            pre_guard: None,
            mapping: Mapping::Empty,
            post_guard: None,
            target: Target::State(target),
        }
    }

    #[test]
    fn later_transition_replaces_same_trigger() {
        let mut definition = StateDefinition::new("A", Signature::empty());
        definition.add_transition(transition("go", "B"));
        definition.add_transition(transition("go", "C"));

        assert_eq!(definition.transitions().len(), 1);
        assert_eq!(
            definition.transition(&"go").map(|t| t.target().clone()),
            Some(Target::State("C"))
        );
    }

    #[test]
    fn merge_augments_handlers_and_keeps_last_signature() {
        let mut first = StateDefinition::<&str, &str>::new("A", Signature::empty());
        first.on_entry.push(Callback::handler(|(): ()| {}));
        first.add_transition(transition("x", "B"));

        let mut second = StateDefinition::new("A", Signature::of::<(i32,)>());
        second.on_entry.push(Callback::handler(|(_x,): (i32,)| {}));
        second.on_exit.push(Callback::handler(|(_x,): (i32,)| {}));
        second.add_transition(transition("y", "C"));

        first.merge(second);

        assert_eq!(first.signature(), &Signature::of::<(i32,)>());
        assert_eq!(first.on_entry.len(), 2);
        assert_eq!(first.on_exit.len(), 1);
        assert_eq!(first.triggers().copied().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(first.handler_signatures().count(), 3);
    }

    #[test]
    fn find_locates_registered_state() {
        let states = vec![
            StateDefinition::<&str, &str>::new("A", Signature::empty()),
            StateDefinition::new("B", Signature::empty()),
        ];

        assert_eq!(find(&states, &"B").map(|d| *d.state()), Some("B"));
        assert!(find(&states, &"C").is_none());
    }
}
