//! Background rescoring on a Tokio runtime.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{request, scheduler, HOUR};
use ward_admission::core::{OpContext, TriageCategory, WardType};
use ward_admission::runtime::{spawn_rescore_loop, TokioSpawner};
use ward_admission::util::ManualClock;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rescore_loop_tracks_clock() {
    let s = Arc::new(scheduler(0, 0));
    let adm = s
        .submit_admission(OpContext::by(1, 0), request(1, WardType::Emergency, TriageCategory::Standard))
        .unwrap();
    let clock = ManualClock::new(4 * HOUR);

    let handle = spawn_rescore_loop(
        &TokioSpawner::current(),
        Arc::clone(&s),
        clock.clone(),
        Duration::from_millis(10),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(handle.passes() >= 1);
    assert!((s.admission(adm.id()).unwrap().priority_score() - 2.0).abs() < 1e-9);

    clock.advance(2 * HOUR);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let passes = handle.stop().await;
    assert!(passes >= 2);
    assert!((s.admission(adm.id()).unwrap().priority_score() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn stop_is_prompt_with_long_period() {
    let s = Arc::new(scheduler(1, 0));
    let handle = spawn_rescore_loop(
        &TokioSpawner::current(),
        s,
        ManualClock::new(0),
        Duration::from_secs(3_600),
    );
    // The first tick fires immediately.
    let passes = tokio::time::timeout(Duration::from_secs(5), handle.stop())
        .await
        .unwrap();
    assert!(passes <= 1);
}
