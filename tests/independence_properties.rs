//! Property-based tests for the independence enumeration
//!
//! The enumerator promises a strict bijection between row indices and
//! (pair, conditioning-set) combinations for any fixed studied ordering.
//! These tests verify the bijection, its disjointness and filtering
//! guarantees, and the guess tracker's structural matching under
//! generated studied sets.

use proptest::prelude::*;

use causalab::independence::{
    Guess, GuessedIndependenceTracker, IndependenceCombination, IndependenceEnumerator,
};
use causalab::setup::ExperimentalSetup;
use causalab::{CausalGraph, GraphNode, LabError};

// ============================================================================
// Strategies
// ============================================================================

/// Distinct studied-variable names of the given size range.
fn arb_studied(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    (min..=max).prop_map(|p| (0..p).map(|i| format!("v{}", i)).collect())
}

/// A studied ordering together with a valid row index.
fn arb_studied_and_row() -> impl Strategy<Value = (Vec<String>, usize)> {
    arb_studied(2, 8).prop_flat_map(|studied| {
        let rows = IndependenceEnumerator::row_count_for(studied.len());
        (Just(studied), 0..rows)
    })
}

// ============================================================================
// Bijection and structure
// ============================================================================

proptest! {
    #[test]
    fn decode_encode_round_trips((studied, row) in arb_studied_and_row()) {
        let e = IndependenceEnumerator::new(studied);
        let (i, j, bits) = e.decode(row).unwrap();
        prop_assert!(i < j);
        prop_assert_eq!(e.encode(i, j, bits), row);
    }

    #[test]
    fn combinations_are_disjoint((studied, row) in arb_studied_and_row()) {
        let e = IndependenceEnumerator::new(studied);
        let combo = e.combination_at(row).unwrap();
        prop_assert_ne!(&combo.first, &combo.second);
        prop_assert!(!combo.conditioning.contains(&combo.first));
        prop_assert!(!combo.conditioning.contains(&combo.second));
    }

    #[test]
    fn conditioning_respects_studied_order((studied, row) in arb_studied_and_row()) {
        let e = IndependenceEnumerator::new(studied.clone());
        let combo = e.combination_at(row).unwrap();
        let position = |name: &String| studied.iter().position(|n| n == name).unwrap();
        let positions: Vec<usize> = combo.conditioning.iter().map(position).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(positions, sorted);
    }

    #[test]
    fn every_combination_appears_exactly_once(studied in arb_studied(2, 6)) {
        let e = IndependenceEnumerator::new(studied);
        let all: Vec<IndependenceCombination> = e.combinations().collect();
        prop_assert_eq!(all.len(), e.row_count());
        for (row, combo) in all.iter().enumerate() {
            for (other_row, other) in all.iter().enumerate() {
                if row != other_row {
                    prop_assert_ne!(combo, other);
                }
            }
        }
    }

    #[test]
    fn rows_past_the_end_are_rejected(studied in arb_studied(2, 8)) {
        let e = IndependenceEnumerator::new(studied);
        let row_count = e.row_count();
        prop_assert_eq!(
            e.combination_at(row_count),
            Err(LabError::RowOutOfRange { row: row_count, row_count })
        );
    }
}

// ============================================================================
// Studied-set filtering through a setup
// ============================================================================

proptest! {
    #[test]
    fn hidden_variables_never_appear(p in 3usize..7, hidden in 0usize..3) {
        let mut graph = CausalGraph::new();
        for i in 0..p {
            graph.add_node(GraphNode::measured(format!("v{}", i))).unwrap();
        }
        let hidden = hidden % p;
        let hidden_name = format!("v{}", hidden);

        let mut setup = ExperimentalSetup::new("exp", &graph);
        setup.set_studied(&hidden_name, false).unwrap();

        let e = IndependenceEnumerator::from_setup(&setup);
        prop_assert_eq!(e.row_count(), IndependenceEnumerator::row_count_for(p - 1));
        for combo in e.combinations() {
            prop_assert_ne!(&combo.first, &hidden_name);
            prop_assert_ne!(&combo.second, &hidden_name);
            prop_assert!(!combo.conditioning.contains(&hidden_name));
        }
    }
}

// ============================================================================
// Guess persistence across re-enumeration
// ============================================================================

proptest! {
    #[test]
    fn guesses_round_trip_by_structure((studied, row) in arb_studied_and_row()) {
        let e = IndependenceEnumerator::new(studied);
        let combo = e.combination_at(row).unwrap();

        let mut tracker = GuessedIndependenceTracker::new(&e);
        tracker.set_independent(true, &combo);
        prop_assert_eq!(tracker.guess(&combo), Guess::Independent);

        // Every other enumerated combination is untouched.
        for (other, guess) in tracker.entries() {
            if other != &combo {
                prop_assert_eq!(guess, Guess::Unset);
            }
        }
    }

    #[test]
    fn surviving_guesses_match_after_restudy(p in 3usize..6) {
        // Guess the single unconditional pair of the first two variables,
        // hide the last variable, and re-enumerate: the guess addressed by
        // structure still matches in the new tracker's key space.
        let studied: Vec<String> = (0..p).map(|i| format!("v{}", i)).collect();
        let full = IndependenceEnumerator::new(studied.clone());
        let mut tracker = GuessedIndependenceTracker::new(&full);

        let combo = IndependenceCombination::new::<String>("v0", "v1", []);
        tracker.set_independent(false, &combo);

        let reduced = IndependenceEnumerator::new(studied[..p - 1].to_vec());
        let mut re_tracker = GuessedIndependenceTracker::new(&reduced);
        re_tracker.set_independent(
            tracker.is_independent(&combo).unwrap(),
            &combo,
        );
        prop_assert_eq!(re_tracker.is_independent(&combo), Some(false));
    }
}
