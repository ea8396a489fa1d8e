//! State transition history tracking.
//!
//! A machine keeps a bounded, in-memory record of the transitions whose
//! state update it has committed. The record is diagnostic only: it lives as long as the machine
//! and is never replayed.

use super::state::{State, Trigger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of transitions a machine remembers.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single transition whose state update was committed.
///
/// Recording happens as soon as the current state changes, so a transition
/// whose entry or action handlers fault afterwards is still recorded.
///
/// # Example
///
/// ```rust
/// use parastate::core::StateTransition;
///
/// let transition = StateTransition::new("Pending", "start", "Running");
///
/// assert_eq!(transition.from, "Pending");
/// assert_eq!(transition.to, "Running");
/// assert!(!transition.is_loop());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateTransition<S, T> {
    /// The state being transitioned from
    pub from: S,
    /// The trigger that fired
    pub trigger: T,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

impl<S: State, T: Trigger> StateTransition<S, T> {
    pub fn new(from: S, trigger: T, to: S) -> Self {
        Self {
            from,
            trigger,
            to,
            timestamp: Utc::now(),
        }
    }

    /// Whether the transition re-entered its source state.
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Ordered, bounded history of state transitions.
///
/// Once `limit` transitions are stored, recording a new one drops the oldest.
/// A limit of zero disables recording.
///
/// # Example
///
/// ```rust
/// use parastate::core::{StateHistory, StateTransition};
///
/// let mut history = StateHistory::with_limit(8);
/// history.record(StateTransition::new("Start", "go", "Middle"));
/// history.record(StateTransition::new("Middle", "go", "End"));
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&"Start", &"Middle", &"End"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory<S, T> {
    transitions: Vec<StateTransition<S, T>>,
    limit: usize,
}

impl<S: State, T: Trigger> Default for StateHistory<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Trigger> StateHistory<S, T> {
    /// Create a new empty history with the default limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a transition whose state update was committed.
    pub fn record(&mut self, transition: StateTransition<S, T>) {
        if self.limit == 0 {
            return;
        }
        if self.transitions.len() == self.limit {
            self.transitions.remove(0);
        }
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the `from` state of the oldest
    /// remembered transition, then the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time elapsed between the oldest and the newest remembered transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition<S, T>] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&StateTransition<S, T>> {
        self.transitions.last()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
