mod common;

use std::sync::Arc;
use std::time::Duration;

use addrfill_core::{AddressResult, LookupError};
use addrfill_session::{
    LookupOutcome, PredictionSession, SessionConfig, SessionError, SessionPhase,
};
use common::{prediction, springfield_place, FakeLookup};

fn us_session(fake: &Arc<FakeLookup>) -> PredictionSession {
    let lookup: Arc<dyn addrfill_core::PlaceLookup> = fake.clone();
    PredictionSession::new(lookup, SessionConfig::default().with_country("us"))
}

#[tokio::test]
async fn lookup_then_select_resolves_address() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_predictions(
                "123 Main",
                vec![
                    prediction("p1", "123 Main St"),
                    prediction("p2", "123 Main Ave"),
                ],
            )
            .with_place(springfield_place("p1", "123")),
    );
    let mut session = us_session(&fake);
    let outcome_rx = session.take_outcome().unwrap();

    session.set_query("123 Main");
    let outcome = session.lookup("123 Main").await;
    let LookupOutcome::Success(predictions) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(predictions.len(), 2);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.predictions, predictions);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.phase, SessionPhase::PredictionsShown);

    let committed = session.select_prediction(&predictions[0]).await.unwrap();
    let AddressResult::Resolved { address } = &committed.result else {
        panic!("expected resolved, got {:?}", committed.result);
    };
    assert_eq!(address.line1.as_deref(), Some("123 Main Street"));
    assert_eq!(address.city.as_deref(), Some("Springfield"));
    assert_eq!(address.state.as_deref(), Some("IL"));
    assert_eq!(address.country.as_deref(), Some("US"));
    assert!(committed.failure.is_none());

    assert_eq!(outcome_rx.await.unwrap(), committed);
    assert_eq!(fake.fetches(), ["p1"]);
    assert_eq!(session.snapshot().phase, SessionPhase::Committed);
    assert!(session.is_closed());
}

#[tokio::test]
async fn lookup_passes_country_and_limit() {
    let fake = Arc::new(FakeLookup::new().with_predictions(
        "1 Infinite Loop",
        (0..6).map(|i| prediction(&format!("p{i}"), "1 Infinite Loop")).collect(),
    ));
    let session = us_session(&fake);

    let outcome = session.lookup("1 Infinite Loop").await;
    let LookupOutcome::Success(predictions) = outcome else {
        panic!("expected success");
    };
    assert_eq!(predictions.len(), 4);

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "US");
    assert_eq!(calls[0].2, 4);
}

#[tokio::test]
async fn clear_is_idempotent() {
    let fake = Arc::new(
        FakeLookup::new().with_predictions("123 Main", vec![prediction("p1", "123 Main St")]),
    );
    let session = us_session(&fake);
    let mut states = session.subscribe();

    session.set_query("123 Main");
    assert!(session.lookup("123 Main").await.is_success());
    states.borrow_and_update();

    session.clear();
    assert!(states.has_changed().unwrap());
    let after_first = states.borrow_and_update().clone();
    assert!(after_first.predictions.is_empty());
    assert!(!after_first.loading);
    assert_eq!(after_first.phase, SessionPhase::Idle);
    assert_eq!(session.query(), "");

    session.clear();
    assert!(!states.has_changed().unwrap());
    assert_eq!(session.snapshot(), after_first);
}

#[tokio::test(start_paused = true)]
async fn typing_burst_triggers_one_lookup_for_final_query() {
    let fake = Arc::new(FakeLookup::new().with_predictions(
        "abcd",
        vec![prediction("p1", "abcd Road")],
    ));
    let session = us_session(&fake);
    let mut last_edit = tokio::time::Instant::now();

    for q in ["a", "ab", "abc", "abcd"] {
        session.set_query(q);
        last_edit = tokio::time::Instant::now();
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    tokio::time::sleep(Duration::from_millis(2000)).await;

    let calls = fake.calls();
    assert_eq!(fake.queries(), ["abcd"]);
    assert!(calls[0].3 - last_edit >= Duration::from_millis(1000));
    assert_eq!(session.snapshot().predictions.len(), 1);
    assert_eq!(session.snapshot().phase, SessionPhase::PredictionsShown);
}

#[tokio::test(start_paused = true)]
async fn setting_same_query_does_not_restart_debounce() {
    let fake = Arc::new(FakeLookup::new());
    let session = us_session(&fake);

    session.set_query("123 Main");
    tokio::time::sleep(Duration::from_millis(600)).await;
    session.set_query("123 Main");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(fake.queries(), ["123 Main"]);
}

#[tokio::test(start_paused = true)]
async fn short_query_does_not_abort_dispatched_lookup() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_predictions("123 Main", vec![prediction("p1", "123 Main St")])
            .with_delay("123 Main", Duration::from_millis(500)),
    );
    let session = us_session(&fake);

    session.set_query("123 Main");
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(fake.queries(), ["123 Main"]);
    assert!(session.snapshot().loading);

    session.set_query("12");
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let snapshot = session.snapshot();
    assert_eq!(fake.queries(), ["123 Main"]);
    assert_eq!(snapshot.predictions.len(), 1);
    assert_eq!(snapshot.predictions[0].place_id, "p1");
    assert!(!snapshot.loading);
    assert_eq!(snapshot.phase, SessionPhase::PredictionsShown);
    assert_eq!(session.query(), "12");
}

#[tokio::test(start_paused = true)]
async fn clear_drops_pending_debounced_lookup() {
    let fake = Arc::new(FakeLookup::new());
    let session = us_session(&fake);

    session.set_query("123 Main");
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.clear();
    tokio::time::sleep(Duration::from_millis(3000)).await;

    assert!(fake.queries().is_empty());
}

#[tokio::test]
async fn failed_lookup_keeps_predictions_and_counts_failure() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_predictions("123 Main", vec![prediction("p1", "123 Main St")])
            .with_lookup_error(
                "123 Main St",
                LookupError::Network("connection reset".to_owned()),
            ),
    );
    let session = us_session(&fake);

    assert!(session.lookup("123 Main").await.is_success());
    let outcome = session.lookup("123 Main St").await;
    assert_eq!(
        outcome,
        LookupOutcome::Failure(SessionError::LookupFailure(LookupError::Network(
            "connection reset".to_owned()
        )))
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.predictions.len(), 1);
    assert_eq!(snapshot.predictions[0].place_id, "p1");
    assert_eq!(snapshot.failure_count, 1);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.phase, SessionPhase::Failed);
    assert!(matches!(
        snapshot.last_failure,
        Some(SessionError::LookupFailure(_))
    ));
}

#[tokio::test]
async fn back_with_typed_query_commits_manual_line() {
    let fake = Arc::new(FakeLookup::new());
    let mut session = us_session(&fake);
    let rx = session.take_outcome().unwrap();

    session.set_query("123 Main St");
    let outcome = session.on_back_pressed().unwrap();
    assert_eq!(
        outcome.result,
        AddressResult::Manual {
            line: "123 Main St".to_owned()
        }
    );
    assert_eq!(rx.await.unwrap().result, outcome.result);
}

#[tokio::test]
async fn back_with_blank_query_commits_none() {
    let fake = Arc::new(FakeLookup::new());
    let mut session = us_session(&fake);
    let rx = session.take_outcome().unwrap();

    session.set_query("   ");
    let outcome = session.on_back_pressed().unwrap();
    assert_eq!(outcome.result, AddressResult::None);
    assert!(outcome.failure.is_none());
    assert_eq!(rx.await.unwrap().result, AddressResult::None);
}

#[tokio::test]
async fn enter_manually_commits_even_blank_query() {
    let fake = Arc::new(FakeLookup::new());
    let session = us_session(&fake);

    let outcome = session.on_enter_manually().unwrap();
    assert_eq!(
        outcome.result,
        AddressResult::Manual {
            line: String::new()
        }
    );
}

#[tokio::test]
async fn missing_country_fails_without_calling_lookup() {
    let fake = Arc::new(FakeLookup::new());
    let lookup: Arc<dyn addrfill_core::PlaceLookup> = fake.clone();
    let session = PredictionSession::new(lookup, SessionConfig::default());

    let outcome = session.lookup("123 Main").await;
    let LookupOutcome::Failure(SessionError::Configuration(message)) = outcome else {
        panic!("expected configuration failure, got {outcome:?}");
    };
    assert!(message.contains("country"));
    assert!(fake.calls().is_empty());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.failure_count, 1);
    assert_eq!(snapshot.phase, SessionPhase::Failed);
}

#[tokio::test(start_paused = true)]
async fn stale_lookup_result_is_discarded() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_predictions("123 M", vec![prediction("old", "123 M Old")])
            .with_delay("123 M", Duration::from_millis(500))
            .with_predictions("123 Main", vec![prediction("new", "123 Main St")]),
    );
    let session = us_session(&fake);

    let (older, newer) = tokio::join!(session.lookup("123 M"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.lookup("123 Main").await
    });

    // Both calls report what the capability answered.
    assert!(older.is_success());
    assert!(newer.is_success());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.predictions.len(), 1);
    assert_eq!(snapshot.predictions[0].place_id, "new");
    assert_eq!(snapshot.phase, SessionPhase::PredictionsShown);
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn fetch_failure_commits_none_with_failure() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_fetch_error("p1", LookupError::QuotaExceeded("daily limit".to_owned())),
    );
    let mut session = us_session(&fake);
    let rx = session.take_outcome().unwrap();
    session.set_query("123 Main");

    let outcome = session.fetch_place("p1").await.unwrap();
    assert_eq!(outcome.result, AddressResult::None);
    assert_eq!(
        outcome.failure,
        Some(SessionError::FetchFailure(LookupError::QuotaExceeded(
            "daily limit".to_owned()
        )))
    );
    assert_eq!(rx.await.unwrap(), outcome);
    assert_eq!(session.snapshot().failure_count, 1);
}

#[tokio::test]
async fn calls_after_commit_are_no_ops() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_predictions("123 Main", vec![prediction("p1", "123 Main St")])
            .with_place(springfield_place("p1", "123")),
    );
    let session = us_session(&fake);
    session.set_query("123 Main");

    let first = session.on_enter_manually().unwrap();
    let committed = session.snapshot();

    assert!(session.on_back_pressed().is_none());
    assert!(session.on_enter_manually().is_none());
    assert!(session.fetch_place("p1").await.is_none());
    assert_eq!(
        session.lookup("123 Main").await,
        LookupOutcome::Failure(SessionError::Closed)
    );
    session.set_query("something else");
    session.clear();

    assert_eq!(session.query(), "123 Main");
    assert_eq!(session.snapshot(), committed);
    assert!(fake.calls().is_empty());
    assert!(fake.fetches().is_empty());
    assert_eq!(
        first.result,
        AddressResult::Manual {
            line: "123 Main".to_owned()
        }
    );
}

#[tokio::test]
async fn dispose_closes_outcome_channel() {
    let fake = Arc::new(FakeLookup::new());
    let mut session = us_session(&fake);
    let rx = session.take_outcome().unwrap();

    session.dispose();
    assert!(session.is_closed());
    assert!(rx.await.is_err());
    assert!(session.on_back_pressed().is_none());
}

#[tokio::test(start_paused = true)]
async fn dispose_abandons_in_flight_fetch() {
    let fake = Arc::new(
        FakeLookup::new()
            .with_place(springfield_place("p1", "123"))
            .with_delay("p1", Duration::from_secs(5)),
    );
    let session = Arc::new(us_session(&fake));

    let fetching = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.fetch_place("p1").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.dispose();

    assert!(fetching.await.unwrap().is_none());
    assert_eq!(fake.fetches(), ["p1"]);
}

#[tokio::test]
async fn shutdown_stops_debouncer() {
    let fake = Arc::new(FakeLookup::new());
    let session = us_session(&fake);
    session.set_query("123 Main");
    session.shutdown().await;
    assert!(fake.calls().is_empty());
}
