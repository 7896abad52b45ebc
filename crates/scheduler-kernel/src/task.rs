//! The persisted shape of a scheduled task.
//!
//! [`Task`] carries everything a [`crate::TaskRepository`] needs to persist
//! and reload a task: identity, schedule, and state. It deliberately does
//! *not* carry the task's executable body — bodies are never serialized,
//! they are recovered from the function registry by `function_name` at
//! reconstruction time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which family of schedule a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Recurring, driven by a cron expression.
    Cron,
    /// One-shot, fires once at an absolute instant.
    Timer,
}

/// The current lifecycle state of a task.
///
/// Transitions are restricted: `Pending -> Running -> (Completed | Failed)`;
/// from any non-terminal state `-> Cancelled`. Cron tasks may re-enter
/// `Running` from `Completed` or `Failed` on their next fire; Timer tasks
/// are terminal after their single fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TaskState {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskState {
    /// Checks whether a transition from `self` to `target` is legal for a
    /// task of the given `kind`.
    ///
    /// Cron tasks are allowed to re-fire from a terminal `Completed`/`Failed`
    /// state back into `Running`; Timer tasks are not, since they are
    /// terminal after their one fire. The same `kind` split applies to the
    /// `Cancelled` edge: a cron task sitting in `Completed`/`Failed` between
    /// fires is still live and cancellable, while a timer task in either of
    /// those states has already self-destructed.
    pub fn can_transition_to(&self, target: TaskState, kind: TaskKind) -> bool {
        use TaskState::*;
        match (self, target) {
            (Pending, Running) => true,
            (Running, Completed) | (Running, Failed) => true,
            (Completed, Running) | (Failed, Running) => kind == TaskKind::Cron,
            (_, Cancelled) => *self == Cancelled || !self.is_terminal(kind),
            _ => false,
        }
    }

    /// Whether this state has no further transitions for a task of the
    /// given `kind`. Cron tasks are only ever terminal once `Cancelled`;
    /// timer tasks are also terminal once `Completed` or `Failed`, since
    /// they never fire again.
    pub fn is_terminal(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Cron => matches!(self, TaskState::Cancelled),
            TaskKind::Timer => matches!(
                self,
                TaskState::Completed | TaskState::Failed | TaskState::Cancelled
            ),
        }
    }
}

/// A task's schedule: either a cron expression or an absolute fire instant.
///
/// The kernel deliberately stores the raw cron expression string rather than
/// a parsed schedule — parsing pulls in the `cron` crate, which is a
/// foundation-layer concern. `scheduler::CronTask` parses it at admission
/// time and keeps the compiled schedule alongside the persisted `Task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskSchedule {
    Cron { expression: String },
    Timer { execute_at: DateTime<Utc> },
}

impl TaskSchedule {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskSchedule::Cron { .. } => TaskKind::Cron,
            TaskSchedule::Timer { .. } => TaskKind::Timer,
        }
    }
}

/// A scheduled task's persisted metadata.
///
/// See the crate documentation for why `body` has no place here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub schedule: TaskSchedule,
    pub state: TaskState,
    pub function_name: String,
    pub created_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Builds a freshly admitted task in the `Pending` state.
    pub fn new(
        id: String,
        name: String,
        schedule: TaskSchedule,
        function_name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            schedule,
            state: TaskState::Pending,
            function_name,
            created_at,
            last_run_at: None,
            next_run_at: None,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.schedule.kind()
    }
}
