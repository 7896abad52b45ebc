//! The scheduler engine (C4): owns the live task index, drives each task's
//! dispatch loop, and enforces the execution timeout.
//!
//! Each admitted task gets its own spawned loop rather than being driven by
//! a single shared polling tick. A loop sleeps precisely until its task's
//! next fire instant (computed from the compiled cron schedule, or the
//! timer's absolute instant), races that sleep against the task's
//! cancellation token, fires, and — for cron tasks — recomputes the next
//! instant and repeats. Timer tasks self-remove from the index after their
//! one fire.

use std::collections::HashMap;
use std::sync::Arc;

use scheduler_kernel::{
    Clock, SchedulerError, SystemClock, Task, TaskBody, TaskContext, TaskKind, TaskRegistry,
    TaskRepository, TaskSchedule, TaskState,
};

use crate::config::EngineConfig;
use crate::entities::ArmedTask;

/// Drives cron and timer tasks to completion. Cheap to clone — internally
/// an `Arc` — so a single engine can be shared between the manager and the
/// global entry point.
#[derive(Clone)]
pub struct SchedulerEngine {
    inner: Arc<Inner>,
}

struct Inner {
    tasks: parking_lot::RwLock<HashMap<String, Arc<ArmedTask>>>,
    registry: Arc<dyn TaskRegistry>,
    repository: Option<Arc<dyn TaskRepository>>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    running: parking_lot::RwLock<bool>,
    root: parking_lot::RwLock<TaskContext>,
}

impl SchedulerEngine {
    pub fn new(registry: Arc<dyn TaskRegistry>) -> Self {
        Self::with_parts(registry, None, EngineConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_repository(
        registry: Arc<dyn TaskRegistry>,
        repository: Arc<dyn TaskRepository>,
    ) -> Self {
        Self::with_parts(
            registry,
            Some(repository),
            EngineConfig::default(),
            Arc::new(SystemClock),
        )
    }

    pub fn with_config(
        registry: Arc<dyn TaskRegistry>,
        repository: Option<Arc<dyn TaskRepository>>,
        config: EngineConfig,
    ) -> Self {
        Self::with_parts(registry, repository, config, Arc::new(SystemClock))
    }

    /// Builds an engine with an injected [`Clock`]. Exposed for tests that
    /// need deterministic timing; production callers should use [`Self::new`]
    /// or one of its siblings.
    pub fn with_clock(
        registry: Arc<dyn TaskRegistry>,
        repository: Option<Arc<dyn TaskRepository>>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_parts(registry, repository, config, clock)
    }

    fn with_parts(
        registry: Arc<dyn TaskRegistry>,
        repository: Option<Arc<dyn TaskRepository>>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                tasks: parking_lot::RwLock::new(HashMap::new()),
                registry,
                repository,
                config,
                clock,
                running: parking_lot::RwLock::new(false),
                root: parking_lot::RwLock::new(TaskContext::root()),
            }),
        }
    }

    pub fn registry(&self) -> Arc<dyn TaskRegistry> {
        self.inner.registry.clone()
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.read()
    }

    /// Arms every task currently in the index and flips the engine to
    /// running. Tasks added while already running are armed immediately by
    /// [`Self::add_task`] instead.
    ///
    /// A fresh root context is established here so a prior `stop()`'s
    /// cancellation doesn't carry over into this run. Every not-yet-armed
    /// entry is rebound onto the new root before being armed — tasks
    /// admitted before this `start()` captured their context from whatever
    /// root existed at admission time, which this new root now supersedes.
    /// Without the rebind, `stop()` would only reach tasks admitted after
    /// `start()`.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        {
            let mut running = self.inner.running.write();
            if *running {
                return Err(SchedulerError::AlreadyRunning);
            }
            *running = true;
        }
        let root = TaskContext::root();
        *self.inner.root.write() = root.clone();
        let entries: Vec<Arc<ArmedTask>> = self.inner.tasks.read().values().cloned().collect();
        for entry in entries {
            entry.rebind_context(&root);
            self.arm(entry);
        }
        tracing::info!("scheduler engine started");
        Ok(())
    }

    /// Cancels the root context, which cascades to every armed task's
    /// dispatch loop. Loops currently mid-execution are not forcibly
    /// aborted — they observe cancellation cooperatively via their
    /// [`TaskContext`].
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        {
            let mut running = self.inner.running.write();
            if !*running {
                return Err(SchedulerError::NotRunning);
            }
            *running = false;
        }
        self.inner.root.read().cancel();
        tracing::info!("scheduler engine stopped");
        Ok(())
    }

    /// Admits `task` into the live index. `body` is `None` only for tasks
    /// reconstituted without a resolvable function — such a task is held in
    /// the index but fails with [`SchedulerError::UnboundBody`] on fire.
    pub async fn add_task(&self, task: Task, body: Option<TaskBody>) -> Result<(), SchedulerError> {
        if task.id.is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "task id must not be empty".into(),
            ));
        }
        if self.inner.tasks.read().contains_key(&task.id) {
            return Err(SchedulerError::DuplicateId(task.id));
        }

        let now = self.inner.clock.now();
        if let TaskSchedule::Timer { execute_at } = &task.schedule {
            if *execute_at <= now {
                return Err(SchedulerError::InvalidArgument(
                    "timer execute_at must lie in the future".into(),
                ));
            }
        }

        let root = self.inner.root.read().clone();
        let armed = Arc::new(match task.kind() {
            TaskKind::Cron => ArmedTask::cron(task, body, &root, now)?,
            TaskKind::Timer => ArmedTask::timer(task, body, &root),
        });

        {
            let mut tasks = self.inner.tasks.write();
            if tasks.contains_key(&armed.id()) {
                return Err(SchedulerError::DuplicateId(armed.id()));
            }
            tasks.insert(armed.id(), armed.clone());
        }

        if self.is_running() {
            self.arm(armed.clone());
        }

        if let Some(repository) = &self.inner.repository {
            repository.save(&armed.snapshot()).await.map_err(|e| {
                tracing::warn!(task_id = %armed.id(), error = %e, "failed to persist admitted task");
                e
            })?;
        }

        Ok(())
    }

    /// Removes `id` from the live index, transitions it to `Cancelled`
    /// (guarded by `TaskState::can_transition_to`, so a task that already
    /// reached a kind-terminal state is left alone), and cancels its
    /// dispatch loop. A loop mid-sleep observes the cancellation
    /// immediately; a loop mid-execution finishes its current fire before
    /// exiting.
    pub async fn remove_task(&self, id: &str) -> Result<(), SchedulerError> {
        let entry = {
            let mut tasks = self.inner.tasks.write();
            tasks
                .remove(id)
                .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?
        };
        entry.mark_cancelled();
        entry.context().cancel();

        if let Some(repository) = &self.inner.repository {
            repository.delete(id).await.map_err(|e| {
                tracing::warn!(task_id = id, error = %e, "failed to delete persisted task");
                e
            })?;
        }

        Ok(())
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, SchedulerError> {
        self.inner
            .tasks
            .read()
            .get(id)
            .map(|entry| entry.snapshot())
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.inner.tasks.read().values().map(|e| e.snapshot()).collect()
    }

    fn arm(&self, entry: Arc<ArmedTask>) {
        if !entry.mark_armed() {
            return;
        }
        let inner = self.inner.clone();
        match entry.snapshot().kind() {
            TaskKind::Cron => {
                tokio::spawn(Self::run_cron_loop(inner, entry));
            }
            TaskKind::Timer => {
                tokio::spawn(Self::run_timer_once(inner, entry));
            }
        }
    }

    async fn run_cron_loop(inner: Arc<Inner>, entry: Arc<ArmedTask>) {
        loop {
            let Some(next) = entry.next_run_at() else {
                break;
            };
            let now = inner.clock.now();
            let delay = (next - now).to_std().unwrap_or(std::time::Duration::ZERO);
            let ctx = entry.context();
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            if entry.context().is_cancelled() {
                break;
            }
            Self::fire(&inner, &entry).await;
            entry.advance_cron(inner.clock.now());
        }
    }

    async fn run_timer_once(inner: Arc<Inner>, entry: Arc<ArmedTask>) {
        if let Some(next) = entry.next_run_at() {
            let now = inner.clock.now();
            let delay = (next - now).to_std().unwrap_or(std::time::Duration::ZERO);
            let ctx = entry.context();
            tokio::select! {
                _ = ctx.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !entry.context().is_cancelled() {
                        Self::fire(&inner, &entry).await;
                    }
                }
            }
        }
        inner.tasks.write().remove(&entry.id());
    }

    async fn fire(inner: &Arc<Inner>, entry: &Arc<ArmedTask>) {
        if !entry.record_start(inner.clock.now()) {
            tracing::debug!(task_id = %entry.id(), "skipping fire: task is no longer eligible to run");
            return;
        }
        Self::persist(inner, entry).await;

        let Some(body) = entry.body() else {
            tracing::warn!(task_id = %entry.id(), "task fired with no bound body");
            entry.record_outcome(TaskState::Failed);
            Self::persist(inner, entry).await;
            return;
        };

        let ctx = entry.context().child();
        let outcome = tokio::time::timeout(inner.config.execution_timeout, body(ctx)).await;
        let state = match outcome {
            Ok(Ok(())) => TaskState::Completed,
            Ok(Err(reason)) => {
                tracing::warn!(task_id = %entry.id(), reason, "task body returned an error");
                TaskState::Failed
            }
            Err(_elapsed) => {
                tracing::warn!(task_id = %entry.id(), "task execution exceeded the configured timeout");
                TaskState::Failed
            }
        };
        entry.record_outcome(state);
        Self::persist(inner, entry).await;
    }

    async fn persist(inner: &Arc<Inner>, entry: &Arc<ArmedTask>) {
        if let Some(repository) = &inner.repository {
            if let Err(e) = repository.save(&entry.snapshot()).await {
                tracing::warn!(task_id = %entry.id(), error = %e, "failed to persist task state");
            }
        }
    }
}
