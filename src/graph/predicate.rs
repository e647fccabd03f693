use std::fmt;
use std::sync::Arc;

use crate::state::State;

/// A pure function `State -> bool` deciding whether an [`crate::graph::Edge`]
/// is eligible for transition. Wrapped in `Arc<dyn Fn>` rather than a
/// trait object per variant, grounded in the teacher's `EdgePredicate`
/// type alias (`graphs/edges.rs`), with an optional label carried purely
/// for `EdgeEvaluate` diagnostics, never semantics.
#[derive(Clone)]
pub struct Predicate {
    label: &'static str,
    func: Arc<dyn Fn(&State) -> bool + Send + Sync>,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("label", &self.label).finish()
    }
}

impl Predicate {
    pub fn new(label: &'static str, func: impl Fn(&State) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label,
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn evaluate(&self, state: &State) -> bool {
        (self.func)(state)
    }

    /// Always evaluates to true.
    pub fn always() -> Self {
        Self::new("always", |_| true)
    }

    /// True when `key` is present in the state, regardless of value.
    pub fn key_exists(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new("key_exists", move |state| state.contains_key(&key))
    }

    /// True when `key` is present and equal to `value`.
    pub fn key_equals(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        let value = value.into();
        Self::new("key_equals", move |state| {
            matches!(state.get(&key), (Some(v), true) if *v == value)
        })
    }

    /// Negates `predicate`.
    pub fn not(predicate: Predicate) -> Self {
        Self::new("not", move |state| !predicate.evaluate(state))
    }

    /// True iff every predicate in `predicates` evaluates to true.
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Self::new("and", move |state| predicates.iter().all(|p| p.evaluate(state)))
    }

    /// True iff at least one predicate in `predicates` evaluates to true.
    pub fn or(predicates: Vec<Predicate>) -> Self {
        Self::new("or", move |state| predicates.iter().any(|p| p.evaluate(state)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn always_is_true() {
        let state = State::new(None);
        assert!(Predicate::always().evaluate(&state));
    }

    #[test]
    fn key_exists_checks_presence_only() {
        let state = State::new(None).set("ok", json!(false));
        assert!(Predicate::key_exists("ok").evaluate(&state));
        assert!(!Predicate::key_exists("missing").evaluate(&state));
    }

    #[test]
    fn key_equals_checks_value() {
        let state = State::new(None).set("ok", json!(true));
        assert!(Predicate::key_equals("ok", json!(true)).evaluate(&state));
        assert!(!Predicate::key_equals("ok", json!(false)).evaluate(&state));
    }

    #[test]
    fn combinators_compose() {
        let state = State::new(None).set("a", json!(1)).set("b", json!(2));
        let both = Predicate::and(vec![Predicate::key_exists("a"), Predicate::key_exists("b")]);
        assert!(both.evaluate(&state));

        let either = Predicate::or(vec![Predicate::key_exists("missing"), Predicate::key_exists("a")]);
        assert!(either.evaluate(&state));

        let negated = Predicate::not(Predicate::key_exists("a"));
        assert!(!negated.evaluate(&state));
    }
}
