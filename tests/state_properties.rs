//! Property tests for `State`'s universal invariants (spec.md §8).
//!
//! Grounded in the teacher's `tests/graphs_property.rs` use of `proptest`
//! for structural invariants, scoped here to the data-level guarantees
//! `State` itself makes: immutability of `set`, `merge`'s right-biased
//! combination, and `clone_state`'s preservation of identity.

use conductor::state::State;
use proptest::prelude::*;
use serde_json::{json, Value};

fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,8}").unwrap()
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(|b| json!(b)),
        any::<i64>().prop_map(|n| json!(n)),
        ".*".prop_map(|s: String| json!(s)),
    ]
}

proptest! {
    /// `set` never mutates the receiver, and the returned clone observes
    /// exactly the written value at that key.
    #[test]
    fn prop_set_is_immutable_and_readable(key in key_strategy(), value in value_strategy()) {
        let s0 = State::new(None);
        let s1 = s0.set(key.clone(), value.clone());
        prop_assert_eq!(s1.get(&key), (Some(&value), true));
        prop_assert_eq!(s0.get(&key), (None, false));
    }

    /// `clone_state` preserves `run_id` and every key/value pair, and
    /// mutating the clone's data (via `set`) never reaches the original.
    #[test]
    fn prop_clone_preserves_identity_and_data(
        key in key_strategy(),
        value in value_strategy(),
        extra_value in value_strategy(),
    ) {
        let s0 = State::new(None).set(key.clone(), value.clone());
        let s1 = s0.clone_state();
        prop_assert_eq!(s1.run_id(), s0.run_id());
        prop_assert_eq!(s1.get(&key), s0.get(&key));

        let s2 = s1.set(key.clone(), extra_value.clone());
        prop_assert_eq!(s0.get(&key), (Some(&value), true));
        prop_assert_eq!(s2.get(&key), (Some(&extra_value), true));
    }

    /// `merge` is right-biased per key and leaves `run_id` untouched.
    #[test]
    fn prop_merge_prefers_other_per_key(
        key in key_strategy(),
        left_value in value_strategy(),
        right_value in value_strategy(),
    ) {
        let left = State::new(None).set(key.clone(), left_value.clone());
        let right = State::new(None).set(key.clone(), right_value.clone());
        let merged = left.merge(&right);
        prop_assert_eq!(merged.get(&key), (Some(&right_value), true));
        prop_assert_eq!(merged.run_id(), left.run_id());
    }

    /// Self-merge changes nothing observable.
    #[test]
    fn prop_self_merge_is_idempotent(key in key_strategy(), value in value_strategy()) {
        let s = State::new(None).set(key.clone(), value.clone());
        let merged = s.merge(&s);
        prop_assert_eq!(merged.get(&key), s.get(&key));
        prop_assert_eq!(merged.len(), s.len());
    }

    /// A snapshot round-trip through a checkpoint store reproduces the
    /// same `data`, `run_id`, and `checkpoint_node` (spec.md §8,
    /// "Save-then-Load ... byte-equal to the saved value").
    #[test]
    fn prop_snapshot_round_trips(key in key_strategy(), value in value_strategy()) {
        let s0 = State::new(None).set(key.clone(), value.clone()).set_checkpoint_node("n1");
        let snapshot = s0.to_snapshot();
        let s1 = State::from_snapshot(snapshot, None);
        prop_assert_eq!(s1.get(&key), s0.get(&key));
        prop_assert_eq!(s1.run_id(), s0.run_id());
        prop_assert_eq!(s1.checkpoint_node(), s0.checkpoint_node());
        prop_assert_eq!(s1.timestamp(), s0.timestamp());
    }
}
