//! Concurrent claim protocol specs
//!
//! Every scenario races real tasks against the WAL-backed ledger; the only
//! fakes are at the delivery boundary.

use crate::prelude::*;
use chrono::Duration;
use ck_core::{ParticipantId, TestKey};
use ck_engine::ClaimOutcome;
use std::collections::{HashMap, HashSet};

async fn race(
    harness: &Harness,
    key: &TestKey,
    participants: impl IntoIterator<Item = u64>,
) -> Vec<(ParticipantId, ClaimOutcome)> {
    let coordinator = harness.coordinator();
    let mut handles = Vec::new();
    for p in participants {
        let coordinator = coordinator.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            let participant = ParticipantId(p);
            let outcome = coordinator.request_code(&key, participant).await.unwrap();
            (participant, outcome)
        }));
    }
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    outcomes
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_participants_race_for_two_codes() {
    let harness = Harness::with_codes(&["A1", "A2"]);
    let test = harness.create_test(start_of_day() + Duration::hours(8));
    let key = TestKey::ById(test.id.clone());

    let outcomes = race(&harness, &key, 1..=3).await;

    let granted: HashMap<ParticipantId, String> = outcomes
        .iter()
        .filter_map(|(p, o)| match o {
            ClaimOutcome::Granted(code) => Some((*p, code.clone())),
            _ => None,
        })
        .collect();
    let exhausted = outcomes
        .iter()
        .filter(|(_, o)| *o == ClaimOutcome::Exhausted)
        .count();

    assert_eq!(granted.len(), 2);
    assert_eq!(exhausted, 1);

    // No code went to two participants
    let codes: HashSet<&String> = granted.values().collect();
    assert_eq!(codes.len(), 2);

    // And the ledger agrees with what was delivered
    for (participant, code) in &granted {
        assert_eq!(
            harness.ledger.find_code_held_by(*participant, &harness.game),
            Some(code.clone())
        );
    }
    assert_eq!(harness.ledger.count_unclaimed(&harness.game), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn grants_are_injective_at_scale() {
    let codes: Vec<String> = (1..=10).map(|n| format!("code-{n}")).collect();
    let code_refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    let harness = Harness::with_codes(&code_refs);
    let test = harness.create_test(start_of_day() + Duration::hours(8));
    let key = TestKey::ById(test.id.clone());

    let outcomes = race(&harness, &key, 1..=25).await;

    let granted: Vec<&String> = outcomes
        .iter()
        .filter_map(|(_, o)| match o {
            ClaimOutcome::Granted(code) => Some(code),
            _ => None,
        })
        .collect();

    // Exactly min(N, M) grants, all distinct
    assert_eq!(granted.len(), 10);
    assert_eq!(granted.iter().collect::<HashSet<_>>().len(), 10);
    assert_eq!(outcomes.len() - granted.len(), 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exhaustion_is_signalled_once_under_contention() {
    let harness = Harness::with_codes(&["A1", "A2", "A3"]);
    let test = harness.create_test(start_of_day() + Duration::hours(8));
    let key = TestKey::ById(test.id.clone());

    race(&harness, &key, 1..=12).await;

    assert_eq!(harness.admin.signals().len(), 1);
    assert!(harness.admin.signals()[0].contains("moss_garden"));
}

#[tokio::test]
async fn rollback_frees_the_code_for_someone_else() {
    let harness = Harness::with_codes(&["A1"]);
    let test = harness.create_test(start_of_day() + Duration::hours(8));
    let key = TestKey::ById(test.id.clone());
    let coordinator = harness.coordinator();

    harness.notify.set_unreachable(ParticipantId(1));
    let err = coordinator.request_code(&key, ParticipantId(1)).await;
    assert!(err.is_err());

    let outcome = coordinator
        .request_code(&key, ParticipantId(2))
        .await
        .unwrap();
    assert_eq!(outcome, ClaimOutcome::Granted("A1".into()));
    assert_eq!(
        harness.ledger.find_code_held_by(ParticipantId(1), &harness.game),
        None
    );
}

#[tokio::test]
async fn repeat_requests_never_consume_a_second_code() {
    let harness = Harness::with_codes(&["A1", "A2", "A3"]);
    let test = harness.create_test(start_of_day() + Duration::hours(8));
    let key = TestKey::ById(test.id.clone());
    let coordinator = harness.coordinator();

    let first = coordinator
        .request_code(&key, ParticipantId(1))
        .await
        .unwrap();
    let ClaimOutcome::Granted(code) = first else {
        panic!("expected a grant");
    };

    for _ in 0..5 {
        let again = coordinator
            .request_code(&key, ParticipantId(1))
            .await
            .unwrap();
        assert_eq!(again, ClaimOutcome::AlreadyHeld(code.clone()));
    }
    assert_eq!(harness.ledger.count_unclaimed(&harness.game), 2);
}
