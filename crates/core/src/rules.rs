//! Ordered "first match wins" rule evaluation.

use std::fmt;

/// A named rule mapping a context to an optional outcome.
pub struct Rule<C: ?Sized, T> {
    pub name: &'static str,
    pub apply: fn(&C) -> Option<T>,
}

impl<C: ?Sized, T> Rule<C, T> {
    pub const fn new(name: &'static str, apply: fn(&C) -> Option<T>) -> Self {
        Self { name, apply }
    }
}

impl<C: ?Sized, T> Clone for Rule<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized, T> Copy for Rule<C, T> {}

impl<C: ?Sized, T> fmt::Debug for Rule<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Evaluate `rules` in order and return the first outcome along with the
/// name of the rule that produced it.
pub fn first_match<C: ?Sized, T>(rules: &[Rule<C, T>], context: &C) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| (rule.apply)(context).map(|outcome| (rule.name, outcome)))
}
