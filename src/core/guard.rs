//! Guard predicates over typed parameters.
//!
//! Guards control whether a transition can proceed. A guard is a pure
//! predicate over a parameter tuple: either the current state's parameters
//! (plus trigger arguments) when declared before the mapping step, or the
//! mapped next-state parameters when declared after it.

use super::params::Params;
use std::marker::PhantomData;

/// A pure guard predicate over the parameter tuple `P`.
///
/// # Example
///
/// ```rust
/// use parastate::core::Guard;
///
/// let positive = Guard::new(|(amount,): &(i64,)| *amount > 0);
///
/// assert!(positive.check(&(10,)));
/// assert!(!positive.check(&(-3,)));
/// ```
pub struct Guard<P: Params> {
    predicate: Box<dyn Fn(&P) -> bool + Send + Sync>,
    _phantom: PhantomData<fn(&P)>,
}

impl<P: Params> Guard<P> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// A guard that never lets a transition through.
    pub fn deny() -> Self {
        Self::new(|_| false)
    }

    /// Check if the guard allows the transition for these parameters.
    pub fn check(&self, params: &P) -> bool {
        (self.predicate)(params)
    }

    /// Guard that passes only when both guards pass.
    pub fn and(self, other: Guard<P>) -> Self {
        Self::new(move |params| self.check(params) && other.check(params))
    }

    /// Guard that passes when the wrapped guard fails.
    pub fn negate(self) -> Self {
        Self::new(move |params| !self.check(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_allows_matching_parameters() {
        let guard = Guard::new(|(name,): &(String,)| name == "admin");

        assert!(guard.check(&("admin".to_string(),)));
        assert!(!guard.check(&("guest".to_string(),)));
    }

    #[test]
    fn guard_over_no_parameters() {
        let open = Guard::new(|_: &()| true);

        assert!(open.check(&()));
        assert!(!Guard::<()>::deny().check(&()));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|(a, b): &(i32, i32)| a < b);

        let result1 = guard.check(&(1, 2));
        let result2 = guard.check(&(1, 2));

        assert_eq!(result1, result2);
    }

    #[test]
    fn guards_compose() {
        let in_range =
            Guard::new(|(x,): &(i32,)| *x >= 0).and(Guard::new(|(x,): &(i32,)| *x < 10));

        assert!(in_range.check(&(5,)));
        assert!(!in_range.check(&(10,)));
        assert!(!in_range.check(&(-1,)));

        let outside = Guard::new(|(x,): &(i32,)| *x < 10).negate();
        assert!(outside.check(&(11,)));
    }
}
