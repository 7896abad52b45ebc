//! End-to-end integration tests for the task scheduler's public API
//! (`TaskManager` in front of `SchedulerEngine`), exercising the concrete
//! scenarios a caller assembling registry + engine + manager would observe.
//!
//! Each test builds its own `TaskManager`/`SchedulerEngine` pair rather than
//! touching `scheduler::GlobalScheduler` — the shared singleton persists for
//! the lifetime of the test binary and admitting a task under one test's id
//! would otherwise leak into another.
//!
//! # Running
//!
//! ```bash
//! cargo test -p scheduler --test scheduler_integration
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scheduler::{
    task_body, Clock, EngineConfig, InMemoryTaskRegistry, InMemoryTaskRepository, SchedulerEngine,
    SchedulerError, TaskManager,
};

/// A [`Clock`] whose `now()` tracks tokio's pausable/advanceable virtual
/// clock, so timing-sensitive tests run instantly under
/// `tokio::time::pause`/`advance` instead of sleeping in real time.
struct TestClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl TestClock {
    /// Floors the base instant to a whole second so cron-boundary timing in
    /// tests doesn't depend on the sub-second phase of the real wall clock
    /// at the moment the test happens to run.
    fn new() -> Arc<Self> {
        let now = Utc::now();
        let base = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        Arc::new(Self {
            base,
            start: tokio::time::Instant::now(),
        })
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now().duration_since(self.start);
        self.base + chrono::Duration::from_std(elapsed).unwrap_or_default()
    }
}

fn manager_with_repository() -> (TaskManager, Arc<InMemoryTaskRepository>) {
    let registry = Arc::new(InMemoryTaskRegistry::new());
    let repository = Arc::new(InMemoryTaskRepository::new());
    let engine = SchedulerEngine::with_repository(registry, repository.clone());
    (TaskManager::new(engine), repository)
}

fn manager() -> TaskManager {
    let registry = Arc::new(InMemoryTaskRegistry::new());
    TaskManager::new(SchedulerEngine::new(registry))
}

// ─────────────────────────────────────────────────────────────────────────────
// § 1  Register + fire cron
// ─────────────────────────────────────────────────────────────────────────────

/// A cron task firing once a second, run for 3.5s of real time, should fire
/// three or four times (spec.md §8 scenario 1).
#[tokio::test(flavor = "multi_thread")]
async fn cron_task_fires_roughly_once_per_second() {
    let manager = manager();
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_for_body = counter.clone();
    manager
        .register_function(
            "tick",
            task_body(move |_ctx| {
                let counter = counter_for_body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            }),
        )
        .await
        .unwrap();

    manager
        .create_cron_task("T1", "every second", "*/1 * * * * *", "tick")
        .await
        .unwrap();

    manager.scheduler().start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    manager.scheduler().stop().await.unwrap();

    let fires = counter.load(Ordering::SeqCst);
    assert!((3..=4).contains(&fires), "expected 3 or 4 fires, got {fires}");
}

// ─────────────────────────────────────────────────────────────────────────────
// § 2  One-shot timer
// ─────────────────────────────────────────────────────────────────────────────

/// A timer admitted 500ms in the future fires exactly once and then vanishes
/// from the live index (spec.md §8 scenario 2).
#[tokio::test(flavor = "multi_thread")]
async fn timer_task_fires_exactly_once_and_self_destructs() {
    let manager = manager();
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_for_body = counter.clone();
    manager
        .register_function(
            "boom",
            task_body(move |_ctx| {
                let counter = counter_for_body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            }),
        )
        .await
        .unwrap();

    manager
        .create_timer_task("T2", "one shot", Utc::now() + chrono::Duration::milliseconds(500), "boom")
        .await
        .unwrap();

    manager.scheduler().start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(matches!(
        manager.get_task("T2").await.unwrap_err(),
        SchedulerError::NotFound(_)
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// § 3  Duplicate id
// ─────────────────────────────────────────────────────────────────────────────

/// Admitting a timer under an id already held by a cron task fails with
/// `DuplicateId` and leaves the original task untouched (spec.md §8
/// scenario 3).
#[tokio::test]
async fn duplicate_id_across_task_kinds_is_rejected() {
    let manager = manager();
    manager
        .register_function("noop", task_body(|_ctx| async { Ok::<(), String>(()) }))
        .await
        .unwrap();

    manager
        .create_cron_task("T1", "cron", "* * * * * *", "noop")
        .await
        .unwrap();

    let err = manager
        .create_timer_task("T1", "timer", Utc::now() + chrono::Duration::seconds(30), "noop")
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::DuplicateId(_)));

    let tasks = manager.list_tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "T1");
}

// ─────────────────────────────────────────────────────────────────────────────
// § 4  Past-time rejection
// ─────────────────────────────────────────────────────────────────────────────

/// A timer whose `executeAt` already lies in the past is rejected at
/// admission and never reaches the live index (spec.md §8 scenario 4).
#[tokio::test]
async fn timer_in_the_past_is_rejected_and_index_is_unaffected() {
    let manager = manager();
    manager
        .register_function("noop", task_body(|_ctx| async { Ok::<(), String>(()) }))
        .await
        .unwrap();

    let err = manager
        .create_timer_task("late", "too late", Utc::now() - chrono::Duration::seconds(1), "noop")
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidArgument(_)));
    assert!(manager.list_tasks().await.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// § 5  Remove during wait
// ─────────────────────────────────────────────────────────────────────────────

/// Removing a timer before it fires prevents the body from ever running
/// (spec.md §8 scenario 5). Uses a paused virtual clock so the 11s wait
/// doesn't cost real wall-clock time.
#[tokio::test(start_paused = true)]
async fn removing_a_pending_timer_prevents_its_fire() {
    let clock = TestClock::new();
    let registry = Arc::new(InMemoryTaskRegistry::new());
    let engine = SchedulerEngine::with_clock(registry, None, EngineConfig::default(), clock.clone());
    let manager = TaskManager::new(engine);

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_for_body = counter.clone();
    manager
        .register_function(
            "boom",
            task_body(move |_ctx| {
                let counter = counter_for_body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            }),
        )
        .await
        .unwrap();

    manager
        .create_timer_task("T2", "removable", clock.now() + chrono::Duration::seconds(10), "boom")
        .await
        .unwrap();
    manager.scheduler().start().await.unwrap();

    manager.remove_task("T2").await.unwrap();

    tokio::time::advance(Duration::from_secs(11)).await;
    tokio::task::yield_now().await;

    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// § 6  Body failure does not kill the scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// A cron task whose body fails transitions to `Failed` but keeps firing on
/// schedule afterward (spec.md §8 scenario 6). Uses a paused virtual clock
/// so the two one-second fires are deterministic rather than racing real
/// wall-clock scheduling.
#[tokio::test(start_paused = true)]
async fn a_failing_cron_body_does_not_stop_subsequent_fires() {
    let clock = TestClock::new();
    let registry = Arc::new(InMemoryTaskRegistry::new());
    let engine = SchedulerEngine::with_clock(registry, None, EngineConfig::default(), clock.clone());
    let manager = TaskManager::new(engine);

    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_body = attempts.clone();
    manager
        .register_function(
            "flaky",
            task_body(move |_ctx| {
                let attempts = attempts_for_body.clone();
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        Err::<(), String>("deliberate failure on first fire".into())
                    } else {
                        Ok(())
                    }
                }
            }),
        )
        .await
        .unwrap();

    manager
        .create_cron_task("T1", "flaky cron", "*/1 * * * * *", "flaky")
        .await
        .unwrap();
    manager.scheduler().start().await.unwrap();

    tokio::time::advance(Duration::from_millis(1200)).await;
    tokio::task::yield_now().await;
    let after_first = manager.get_task("T1").await.unwrap();
    assert_eq!(after_first.state, scheduler::TaskState::Failed);

    tokio::time::advance(Duration::from_millis(1200)).await;
    tokio::task::yield_now().await;
    manager.scheduler().stop().await.unwrap();
    let after_second = manager.get_task("T1").await.unwrap();
    assert_eq!(after_second.state, scheduler::TaskState::Completed);
    assert!(attempts.load(Ordering::SeqCst) >= 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// § 7  Repository consistency
// ─────────────────────────────────────────────────────────────────────────────

/// Admission and removal keep the repository and the live index in lock
/// step (invariant 6 in spec.md §3).
#[tokio::test]
async fn repository_reflects_admission_and_removal() {
    let (manager, repository) = manager_with_repository();
    manager
        .register_function("noop", task_body(|_ctx| async { Ok::<(), String>(()) }))
        .await
        .unwrap();

    manager
        .create_timer_task("T9", "tracked", Utc::now() + chrono::Duration::seconds(60), "noop")
        .await
        .unwrap();
    assert!(repository.get("T9").await.is_ok());

    manager.remove_task("T9").await.unwrap();
    assert!(repository.get("T9").await.is_err());
}
