//! The process-wide global entry point (C6): one [`TaskManager`] bound to
//! one [`SchedulerEngine`] bound to one default in-memory repository,
//! lazily initialized on first access behind a [`OnceCell`].
//!
//! Prefer constructing your own [`SchedulerEngine`]/[`TaskManager`] pair and
//! injecting it through your application's composition root — this
//! singleton exists only as a convenience for callers with no such root.
//! Tests must never touch it: the lazily-initialized instance is shared for
//! the lifetime of the process, so a test that admits a task here can
//! observe a task left behind by an unrelated test. Each test should build
//! its own [`SchedulerEngine`] instead.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use scheduler_kernel::{SchedulerError, Task, TaskBody};
use std::sync::Arc;

use crate::engine::SchedulerEngine;
use crate::manager::TaskManager;
use crate::registry::InMemoryTaskRegistry;
use crate::repository::InMemoryTaskRepository;

static GLOBAL: OnceCell<TaskManager> = OnceCell::new();

/// Process-wide facade over a single [`TaskManager`], backed by the default
/// in-memory registry and repository. No configuration is exposed; callers
/// that need an alternate repository or [`crate::EngineConfig`] should
/// construct their own [`SchedulerEngine`]/[`TaskManager`] pair directly.
pub struct GlobalScheduler;

impl GlobalScheduler {
    fn manager() -> &'static TaskManager {
        GLOBAL.get_or_init(|| {
            let registry = Arc::new(InMemoryTaskRegistry::new());
            let repository = Arc::new(InMemoryTaskRepository::new());
            let engine = SchedulerEngine::with_repository(registry, repository);
            TaskManager::new(engine)
        })
    }

    /// Starts the shared engine. Fails with [`SchedulerError::AlreadyRunning`]
    /// if a prior call already started it.
    pub async fn start() -> Result<(), SchedulerError> {
        Self::manager().scheduler().start().await
    }

    /// Stops the shared engine. Fails with [`SchedulerError::NotRunning`] if
    /// it was never started.
    pub async fn stop() -> Result<(), SchedulerError> {
        Self::manager().scheduler().stop().await
    }

    /// Registers `body` under `name` in the shared registry. Every function
    /// a persisted task may reference must be registered before [`Self::start`].
    pub async fn register_function(name: &str, body: TaskBody) -> Result<(), SchedulerError> {
        Self::manager().register_function(name, body).await
    }

    pub async fn create_cron_task(
        id: &str,
        name: &str,
        cron_expr: &str,
        func_name: &str,
    ) -> Result<Task, SchedulerError> {
        Self::manager()
            .create_cron_task(id, name, cron_expr, func_name)
            .await
    }

    pub async fn create_timer_task(
        id: &str,
        name: &str,
        execute_at: DateTime<Utc>,
        func_name: &str,
    ) -> Result<Task, SchedulerError> {
        Self::manager()
            .create_timer_task(id, name, execute_at, func_name)
            .await
    }

    pub async fn get_task(id: &str) -> Result<Task, SchedulerError> {
        Self::manager().get_task(id).await
    }

    pub async fn remove_task(id: &str) -> Result<(), SchedulerError> {
        Self::manager().remove_task(id).await
    }

    pub async fn list_tasks() -> Vec<Task> {
        Self::manager().list_tasks().await
    }

    pub fn is_running() -> bool {
        Self::manager().scheduler().is_running()
    }
}
