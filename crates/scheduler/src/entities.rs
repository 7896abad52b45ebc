//! Runtime-only wrappers around a [`Task`] that carry what must never be
//! persisted: the resolved executable body, the compiled cron schedule, and
//! the per-task cancellation handle.
//!
//! Splitting these out keeps [`Task`] itself serializable (see its module
//! docs) while still letting the engine hold everything it needs to drive a
//! task's dispatch loop.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use parking_lot::RwLock;
use scheduler_kernel::{SchedulerError, Task, TaskBody, TaskContext, TaskSchedule, TaskState};

/// A task admitted into the live engine index, paired with its runtime
/// handles. Exists only in memory — never serialized, never handed back to
/// callers directly (they see [`Task`] snapshots via [`ArmedTask::snapshot`]).
pub(crate) struct ArmedTask {
    task: RwLock<Task>,
    body: Option<TaskBody>,
    cron: Option<CronSchedule>,
    context: RwLock<TaskContext>,
    armed: AtomicBool,
}

impl ArmedTask {
    /// Builds an armed cron task, parsing `expression` eagerly so a bad
    /// expression is rejected at admission time rather than at first fire.
    pub(crate) fn cron(
        mut task: Task,
        body: Option<TaskBody>,
        parent: &TaskContext,
        now: DateTime<Utc>,
    ) -> Result<Self, SchedulerError> {
        let expression = match &task.schedule {
            TaskSchedule::Cron { expression } => expression.clone(),
            TaskSchedule::Timer { .. } => {
                return Err(SchedulerError::InvalidArgument(
                    "ArmedTask::cron called with a timer schedule".into(),
                ))
            }
        };
        let cron = CronSchedule::from_str(&expression).map_err(|e| SchedulerError::ParseError {
            expression,
            reason: e.to_string(),
        })?;
        task.next_run_at = cron.after(&now).next();
        Ok(Self {
            task: RwLock::new(task),
            body,
            cron: Some(cron),
            context: RwLock::new(parent.child()),
            armed: AtomicBool::new(false),
        })
    }

    /// Builds an armed one-shot timer task. `execute_at` must lie in the
    /// future relative to `now`; callers are expected to have validated this
    /// already (the Task Manager does, per its admission contract).
    pub(crate) fn timer(mut task: Task, body: Option<TaskBody>, parent: &TaskContext) -> Self {
        let execute_at = match task.schedule {
            TaskSchedule::Timer { execute_at } => execute_at,
            TaskSchedule::Cron { .. } => unreachable!("ArmedTask::timer called with a cron schedule"),
        };
        task.next_run_at = Some(execute_at);
        Self {
            task: RwLock::new(task),
            body,
            cron: None,
            context: RwLock::new(parent.child()),
            armed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> String {
        self.task.read().id.clone()
    }

    pub(crate) fn snapshot(&self) -> Task {
        self.task.read().clone()
    }

    pub(crate) fn next_run_at(&self) -> Option<DateTime<Utc>> {
        self.task.read().next_run_at
    }

    pub(crate) fn body(&self) -> Option<TaskBody> {
        self.body.clone()
    }

    /// Returns a clone of this task's current cancellation context. Cheap —
    /// `TaskContext` wraps a `tokio_util` `CancellationToken`, itself
    /// internally `Arc`-backed.
    pub(crate) fn context(&self) -> TaskContext {
        self.context.read().clone()
    }

    /// Rebinds this task's context to a fresh child of `parent`. Used by the
    /// engine at `start()` so tasks admitted before the engine's current
    /// root existed still descend from the root that `stop()` will cancel,
    /// rather than one that `start()` already discarded.
    pub(crate) fn rebind_context(&self, parent: &TaskContext) {
        *self.context.write() = parent.child();
    }

    /// Marks the loop as spawned; returns `false` if it already was (so the
    /// caller never double-spawns a dispatch loop for the same task).
    pub(crate) fn mark_armed(&self) -> bool {
        !self.armed.swap(true, Ordering::SeqCst)
    }

    /// Computes the next fire instant strictly after `now` for a cron task.
    /// `None` for a timer task (it has none, it already fired or is pending
    /// its single fire).
    pub(crate) fn advance_cron(&self, now: DateTime<Utc>) {
        if let Some(cron) = &self.cron {
            let mut task = self.task.write();
            task.next_run_at = cron.after(&now).next();
        }
    }

    /// Transitions into `Running` and stamps `last_run_at`. Returns `false`
    /// without mutating anything if the task's current state forbids it
    /// (e.g. a `remove_task` raced the dispatch loop and already marked it
    /// `Cancelled`) — callers must skip invoking the body in that case.
    pub(crate) fn record_start(&self, now: DateTime<Utc>) -> bool {
        let mut task = self.task.write();
        let kind = task.kind();
        if !task.state.can_transition_to(TaskState::Running, kind) {
            return false;
        }
        task.state = TaskState::Running;
        task.last_run_at = Some(now);
        true
    }

    pub(crate) fn record_outcome(&self, state: TaskState) {
        let mut task = self.task.write();
        let kind = task.kind();
        if task.state.can_transition_to(state, kind) {
            task.state = state;
        }
    }

    /// Transitions into `Cancelled` if the task's current state allows it;
    /// a no-op on a task that already reached a kind-terminal state.
    pub(crate) fn mark_cancelled(&self) {
        let mut task = self.task.write();
        let kind = task.kind();
        if task.state.can_transition_to(TaskState::Cancelled, kind) {
            task.state = TaskState::Cancelled;
        }
    }
}
