use std::collections::BTreeMap;

use proptest::prelude::*;

use super::*;
use crate::Progress;
use crate::ReplicationState;

fn arb_state() -> impl Strategy<Value = ReplicationState> {
    prop_oneof![
        Just(ReplicationState::Probe),
        Just(ReplicationState::Replicate),
        Just(ReplicationState::Snapshot),
    ]
}

fn arb_progress() -> impl Strategy<Value = Progress> {
    (0u64..300, 0u64..20, arb_state(), any::<bool>()).prop_map(|(match_index, lead, state, recently_active)| Progress {
        match_index,
        next_index: match_index + lead,
        state,
        recently_active,
        pending_snapshot: 0,
    })
}

fn arb_input() -> impl Strategy<Value = DecisionInput> {
    (
        0u64..300,
        0u64..300,
        0u64..300,
        0u64..4096,
        1u64..4096,
        any::<bool>(),
        prop_oneof![Just(0u64), 0u64..300],
        prop::collection::btree_map(1u32..8, arb_progress(), 0..6),
    )
        .prop_map(|(compacted_index, last_index, committed_index, log_size_bytes, max_log_size_bytes, log_size_trusted, pending_snapshot_index, progress)| DecisionInput {
            group_id: 1,
            committed_index,
            last_index,
            compacted_index,
            log_size_bytes,
            max_log_size_bytes,
            log_size_trusted,
            pending_snapshot_index,
            progress,
        })
}

proptest! {
    #[test]
    fn prop_never_regresses_compacted_index(input in arb_input()) {
        let floor = input.compacted_index;
        let decision = compute_truncation_decision(input);
        prop_assert!(decision.new_compacted_index >= floor);
    }

    #[test]
    fn prop_never_truncates_uncommitted_entries(input in arb_input()) {
        prop_assume!(input.compacted_index < input.committed_index);
        let commit = input.committed_index;
        let decision = compute_truncation_decision(input);
        prop_assert!(decision.new_compacted_index <= commit);
    }

    #[test]
    fn prop_never_truncates_past_last_index(input in arb_input()) {
        prop_assume!(input.compacted_index < input.last_index);
        let last = input.last_index;
        let decision = compute_truncation_decision(input);
        prop_assert!(decision.new_compacted_index <= last);
    }

    #[test]
    fn prop_decision_is_idempotent(input in arb_input()) {
        let first = compute_truncation_decision(input.clone());
        let second = compute_truncation_decision(input);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_decisions_always_pass_invariant_check(input in arb_input()) {
        let decision = compute_truncation_decision(input);
        prop_assert!(check_decision_invariants(&decision).is_ok());
    }

    #[test]
    fn prop_live_probing_followers_deny_truncation(
        compacted in 0u64..100,
        ahead in 1u64..100,
        matches in prop::collection::vec(0u64..300, 1..5),
    ) {
        let progress: BTreeMap<_, _> = matches
            .into_iter()
            .enumerate()
            .map(|(i, m)| (i as u32 + 2, Progress::probing(m).active()))
            .collect();
        let input = DecisionInput {
            group_id: 1,
            committed_index: compacted + ahead,
            last_index: compacted + ahead,
            compacted_index: compacted,
            log_size_bytes: 0,
            max_log_size_bytes: 1,
            log_size_trusted: true,
            pending_snapshot_index: 0,
            progress,
        };

        let decision = compute_truncation_decision(input);

        prop_assert_eq!(decision.new_compacted_index, compacted);
        prop_assert_eq!(decision.chosen_via, ReasonTag::ProbingFollower);
    }
}
