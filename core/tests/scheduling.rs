//! Group scheduling: dependency ordering, limiter behavior, and error
//! propagation through await.

mod common;

use std::time::{Duration, Instant};

use common::{scheduler, sh};
use pretty_assertions::assert_eq;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dependent_group_starts_after_dependency_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let s = scheduler(4);

    s.declare_group("b", &["a".to_string()], 0).unwrap();
    s.submit("a", sh("sleep 0.3; echo a >> order.txt").dir(dir.path()))
        .unwrap();
    s.submit("b", sh("echo b >> order.txt").dir(dir.path()))
        .unwrap();

    s.await_groups(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    let order = std::fs::read_to_string(dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "a\nb\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dependency_failure_prevents_dependent_from_running() {
    let dir = tempfile::tempdir().unwrap();
    let s = scheduler(4);

    s.declare_group("b", &["a".to_string()], 0).unwrap();
    s.submit("a", sh("exit 7")).unwrap();
    s.submit("b", sh("touch marker").dir(dir.path())).unwrap();

    let err = s.await_groups(&["a".to_string(), "b".to_string()]).await;
    assert!(err.is_err());
    assert!(!dir.path().join("marker").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn await_latches_and_clears() {
    let s = scheduler(4);
    s.submit("g", sh("exit 1")).unwrap();

    assert!(s.await_groups(&["g".to_string()]).await.is_err());
    assert!(s.await_groups(&["g".to_string()]).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submissions_run_concurrently_without_limits() {
    let s = scheduler(8);
    let start = Instant::now();
    for _ in 0..4 {
        s.submit("par", sh("sleep 0.4")).unwrap();
    }
    s.await_groups(&[]).await.unwrap();
    // Serialized this would take 1.6s.
    assert!(start.elapsed() < Duration::from_millis(1200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn global_limiter_bounds_concurrency() {
    let s = scheduler(2);
    let start = Instant::now();
    for _ in 0..4 {
        s.submit("work", sh("sleep 0.4")).unwrap();
    }
    s.await_groups(&[]).await.unwrap();
    // Four sleeps through two tokens need at least two rounds.
    assert!(start.elapsed() >= Duration::from_millis(750));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_group_limit_applies_on_top_of_global() {
    let s = scheduler(8);
    s.declare_group("serial", &[], 1).unwrap();
    let start = Instant::now();
    s.submit("serial", sh("sleep 0.3")).unwrap();
    s.submit("serial", sh("sleep 0.3")).unwrap();
    s.await_groups(&["serial".to_string()]).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(550));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unlimited_group_bypasses_saturated_global_limiter() {
    let s = scheduler(1);
    s.declare_group("fast", &[], -1).unwrap();

    s.submit("slow", sh("sleep 1.5")).unwrap();
    // Give the slow command time to take the only global token.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let start = Instant::now();
    s.submit("fast", sh("true")).unwrap();
    s.await_groups(&["fast".to_string()]).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(1000));

    s.await_groups(&["slow".to_string()]).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ignored_failure_reports_success() {
    let s = scheduler(4);
    s.submit("g", sh("exit 1").ignore_failure(true)).unwrap();
    s.await_groups(&["g".to_string()]).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn empty_await_covers_all_known_groups() {
    let dir = tempfile::tempdir().unwrap();
    let s = scheduler(4);
    s.submit("one", sh("touch one").dir(dir.path())).unwrap();
    s.submit("two", sh("touch two").dir(dir.path())).unwrap();

    s.await_groups(&[]).await.unwrap();
    assert!(dir.path().join("one").exists());
    assert!(dir.path().join("two").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn declaration_after_implicit_creation_wires_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    let s = scheduler(4);

    // "late" is created implicitly, as a dependency of "final", before its
    // own declaration upgrades it in place.
    s.declare_group("final", &["late".to_string()], 0).unwrap();
    s.submit("early", sh("sleep 0.3; echo early >> order.txt").dir(dir.path()))
        .unwrap();
    s.declare_group("late", &["early".to_string()], 0).unwrap();
    s.submit("late", sh("echo late >> order.txt").dir(dir.path()))
        .unwrap();

    s.await_groups(&[]).await.unwrap();
    let order = std::fs::read_to_string(dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "early\nlate\n");
}
