//! The task manager (C5): the everyday entry point for registering
//! functions and constructing tasks, sitting in front of the Registry and
//! the Engine so callers never touch either directly.

use chrono::{DateTime, Utc};
use scheduler_kernel::{SchedulerError, Task, TaskBody, TaskSchedule};

use crate::engine::SchedulerEngine;

/// Ties one [`scheduler_kernel::TaskRegistry`] (reached through the engine)
/// to one [`SchedulerEngine`]. Cheap to clone — the engine it wraps is
/// itself an `Arc` handle.
#[derive(Clone)]
pub struct TaskManager {
    engine: SchedulerEngine,
}

impl TaskManager {
    pub fn new(engine: SchedulerEngine) -> Self {
        Self { engine }
    }

    /// The engine backing this manager, for callers that need lower-level
    /// access (`start`/`stop`/direct `add_task`).
    pub fn scheduler(&self) -> &SchedulerEngine {
        &self.engine
    }

    pub async fn register_function(&self, name: &str, body: TaskBody) -> Result<(), SchedulerError> {
        self.engine.registry().register(name, body).await
    }

    /// Looks up `func_name` in the registry, constructs a cron task, and
    /// admits it to the engine. Any step failing surfaces immediately — a
    /// bad cron expression never reaches the engine's live index.
    pub async fn create_cron_task(
        &self,
        id: &str,
        name: &str,
        cron_expr: &str,
        func_name: &str,
    ) -> Result<Task, SchedulerError> {
        if id.is_empty() || name.is_empty() || cron_expr.is_empty() || func_name.is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "id, name, cron expression, and function name must all be non-empty".into(),
            ));
        }
        let body = self.engine.registry().lookup(func_name).await?;
        let task = Task::new(
            id.to_string(),
            name.to_string(),
            TaskSchedule::Cron {
                expression: cron_expr.to_string(),
            },
            func_name.to_string(),
            Utc::now(),
        );
        self.engine.add_task(task, Some(body)).await?;
        self.engine.get_task(id).await
    }

    /// Same admission pattern as [`Self::create_cron_task`] for a one-shot
    /// timer; `execute_at` must be strictly in the future, enforced by the
    /// engine at admission time.
    pub async fn create_timer_task(
        &self,
        id: &str,
        name: &str,
        execute_at: DateTime<Utc>,
        func_name: &str,
    ) -> Result<Task, SchedulerError> {
        if id.is_empty() || name.is_empty() || func_name.is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "id, name, and function name must all be non-empty".into(),
            ));
        }
        let body = self.engine.registry().lookup(func_name).await?;
        let task = Task::new(
            id.to_string(),
            name.to_string(),
            TaskSchedule::Timer { execute_at },
            func_name.to_string(),
            Utc::now(),
        );
        self.engine.add_task(task, Some(body)).await?;
        self.engine.get_task(id).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, SchedulerError> {
        self.engine.get_task(id).await
    }

    pub async fn remove_task(&self, id: &str) -> Result<(), SchedulerError> {
        self.engine.remove_task(id).await
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.engine.list_tasks().await
    }
}
