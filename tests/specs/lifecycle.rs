//! Lifecycle scheduler specs over the full stack

use crate::prelude::*;
use chrono::Duration;
use ck_core::{ParticipantId, TestKey, TestStatus};
use ck_engine::ClaimOutcome;

#[tokio::test]
async fn ending_and_ended_happen_exactly_once_across_overlapping_ticks() {
    let harness = Harness::with_codes(&["A1", "A2"]);
    // Deadline half an hour out, already in the ENDING phase
    let test = harness.create_test(start_of_day() + Duration::minutes(30));
    harness
        .ledger
        .set_test_status(&test.id, TestStatus::Ending)
        .unwrap();

    let scheduler = harness.scheduler();

    // Tick at T-30min schedules the finalize for T
    scheduler.reconcile();
    scheduler.fire_due().await;
    assert!(harness.announce.updates().is_empty());

    // The periodic tick re-runs at T+10min; the de-duplicated timer index
    // must not produce a second transition
    harness.clock.advance(Duration::minutes(40));
    scheduler.reconcile();
    scheduler.reconcile();
    scheduler.fire_due().await;
    scheduler.fire_due().await;

    let stored = harness
        .ledger
        .get_test(&TestKey::ById(test.id.clone()))
        .unwrap();
    assert_eq!(stored.status, TestStatus::Ended);
    assert_eq!(harness.announce.updates().len(), 1);
}

#[tokio::test]
async fn claims_stop_once_the_scheduler_ends_the_test() {
    let harness = Harness::with_codes(&["A1", "A2", "A3"]);
    let test = harness.create_test(start_of_day() + Duration::hours(5));
    let key = TestKey::ById(test.id.clone());
    let coordinator = harness.coordinator();
    let scheduler = harness.scheduler();

    // A participant claims while the test runs
    let outcome = coordinator
        .request_code(&key, ParticipantId(1))
        .await
        .unwrap();
    assert!(matches!(outcome, ClaimOutcome::Granted(_)));

    // Inside the warn window from the start: the reminder fires on the
    // first tick and claims keep working through the ENDING phase
    scheduler.reconcile();
    scheduler.fire_due().await;
    let outcome = coordinator
        .request_code(&key, ParticipantId(2))
        .await
        .unwrap();
    assert!(matches!(outcome, ClaimOutcome::Granted(_)));

    // Past the deadline the scheduler finalizes and claims are refused
    harness.clock.advance(Duration::hours(6));
    scheduler.reconcile();
    scheduler.fire_due().await;

    let outcome = coordinator
        .request_code(&key, ParticipantId(3))
        .await
        .unwrap();
    assert_eq!(outcome, ClaimOutcome::TestEnded);
    assert_eq!(harness.ledger.count_unclaimed(&harness.game), 1);
}

#[tokio::test]
async fn final_report_reflects_claims_and_completions() {
    let harness = Harness::with_codes(&["A1", "A2"]);
    let test = harness.create_test(start_of_day() + Duration::hours(2));
    let key = TestKey::ById(test.id.clone());
    let coordinator = harness.coordinator();
    let scheduler = harness.scheduler();

    coordinator
        .request_code(&key, ParticipantId(1))
        .await
        .unwrap();
    coordinator
        .request_code(&key, ParticipantId(2))
        .await
        .unwrap();
    harness
        .ledger
        .append_completion(&test.id, ParticipantId(2))
        .unwrap();

    scheduler.reconcile();
    scheduler.fire_due().await;
    harness.clock.advance(Duration::hours(3));
    scheduler.reconcile();
    scheduler.fire_due().await;

    // Exhaustion signal from the claims plus the final report
    let signals = harness.admin.signals();
    let report = signals
        .iter()
        .find(|s| s.contains("wrapped up"))
        .expect("final report should reach the admin channel");
    assert!(report.contains("2 codes claimed"));
    assert!(report.contains("1 feedback submissions"));
    // Participant 1 claimed but never submitted feedback
    assert!(report.contains('1'));
}

#[tokio::test]
async fn manual_deadline_change_is_honored_promptly() {
    let harness = Harness::with_codes(&["A1"]);
    // A week out: no timers at all
    let test = harness.create_test(start_of_day() + Duration::days(7));
    let key = TestKey::ById(test.id.clone());
    let scheduler = harness.scheduler();

    scheduler.reconcile();
    scheduler.fire_due().await;
    assert!(harness.announce.published().is_empty());

    // Operator cuts the test short: end it in an hour
    scheduler
        .end_changed(&key, start_of_day() + Duration::hours(1))
        .await
        .unwrap();

    // Reminder already fired as part of the override
    assert_eq!(harness.announce.published().len(), 1);
    let stored = harness.ledger.get_test(&key).unwrap();
    assert_eq!(stored.status, TestStatus::Ending);

    // And the finalize lands at the new deadline
    harness.clock.advance(Duration::hours(1));
    scheduler.reconcile();
    scheduler.fire_due().await;
    let stored = harness.ledger.get_test(&key).unwrap();
    assert_eq!(stored.status, TestStatus::Ended);
}
