//! Timing tests for the compiler/bundler watch gate.

use std::cell::Cell;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tsbridge_builder::{Watch, WatchPhase};

#[tokio::test]
async fn ready_immediately_without_a_pending_change() {
    let watch = Watch::new(Duration::from_millis(1000));
    let start = Instant::now();
    watch.await_ready().await;
    assert!(start.elapsed() < Duration::from_millis(100));
    assert_eq!(watch.phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn change_without_compiler_activity_resumes_after_timeout() {
    let watch = Watch::new(Duration::from_millis(500));
    let start = Instant::now();

    watch.change_triggered();
    assert_eq!(watch.phase(), WatchPhase::ChangePending);
    watch.await_ready().await;

    assert!(start.elapsed() >= Duration::from_millis(500));
    assert_eq!(watch.phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn forced_wait_holds_until_compiler_ends() {
    let watch = Watch::new(Duration::from_millis(1000));
    let delay = Duration::from_millis(150);
    let started_at = Cell::new(None);
    let ended_at = Cell::new(None);

    watch.change_triggered();
    let compiler = async {
        sleep(Duration::from_millis(50)).await;
        watch.compiler_started();
        started_at.set(Some(Instant::now()));
        assert_eq!(watch.phase(), WatchPhase::CompilerRunning);
        sleep(delay).await;
        ended_at.set(Some(Instant::now()));
        watch.compiler_ended();
    };
    let caller = async {
        watch.await_ready().await;
        Instant::now()
    };
    let ((), ready_at) = tokio::join!(compiler, caller);

    let started_at = started_at.get().unwrap();
    let ended_at = ended_at.get().unwrap();
    assert!(ready_at >= ended_at);
    assert!(ready_at - started_at >= delay);
    // Released by the compiler, not by the timeout.
    assert!(ready_at - started_at < Duration::from_millis(900));
    assert_eq!(watch.phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn late_load_during_compiler_run_waits_for_end() {
    let watch = Watch::new(Duration::from_millis(1000));
    let ended_at = Cell::new(None);

    watch.change_triggered();
    let compiler = async {
        sleep(Duration::from_millis(20)).await;
        watch.compiler_started();
        sleep(Duration::from_millis(300)).await;
        ended_at.set(Some(Instant::now()));
        watch.compiler_ended();
    };
    let early = async {
        watch.await_ready().await;
        Instant::now()
    };
    let late = async {
        sleep(Duration::from_millis(60)).await;
        assert_eq!(watch.phase(), WatchPhase::CompilerRunning);
        watch.await_ready().await;
        Instant::now()
    };
    let ((), early_at, late_at) = tokio::join!(compiler, early, late);

    let ended_at = ended_at.get().unwrap();
    assert!(early_at >= ended_at);
    assert!(late_at >= ended_at);
    assert_eq!(watch.phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn change_during_compiler_run_keeps_waiters_parked() {
    let watch = Watch::new(Duration::from_millis(1000));
    let ended_at = Cell::new(None);

    watch.change_triggered();
    let compiler = async {
        sleep(Duration::from_millis(20)).await;
        watch.compiler_started();
        sleep(Duration::from_millis(40)).await;
        watch.change_triggered();
        assert_eq!(watch.phase(), WatchPhase::CompilerRunning);
        sleep(Duration::from_millis(300)).await;
        ended_at.set(Some(Instant::now()));
        watch.compiler_ended();
    };
    let caller = async {
        watch.await_ready().await;
        Instant::now()
    };
    let ((), ready_at) = tokio::join!(compiler, caller);

    assert!(ready_at >= ended_at.get().unwrap());
    assert_eq!(watch.phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn repeated_change_notifications_keep_the_first_deadline() {
    let watch = Watch::new(Duration::from_millis(300));
    let start = Instant::now();

    watch.change_triggered();
    sleep(Duration::from_millis(200)).await;
    watch.change_triggered();
    watch.await_ready().await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(450));
}

#[tokio::test]
async fn compiler_noticing_change_first_still_lets_caller_through() {
    let watch = Watch::new(Duration::from_millis(300));

    watch.compiler_started();
    let compiler = async {
        sleep(Duration::from_millis(100)).await;
        watch.compiler_ended();
    };
    let caller = async {
        sleep(Duration::from_millis(10)).await;
        watch.change_triggered();
        watch.await_ready().await;
    };
    tokio::join!(compiler, caller);

    assert_eq!(watch.phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn clones_share_state() {
    let watch = Watch::default();
    let other = watch.clone();

    watch.change_triggered();
    assert_eq!(other.phase(), WatchPhase::ChangePending);
    other.compiler_started();
    other.compiler_ended();
    assert_eq!(watch.phase(), WatchPhase::Idle);
    assert_eq!(watch.timeout(), Duration::from_millis(1000));
}
