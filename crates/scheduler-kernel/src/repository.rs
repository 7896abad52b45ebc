//! The task repository (C2): a pluggable persistence abstraction for task
//! metadata and status.
//!
//! The default in-memory implementation lives in the `scheduler` crate.
//! Alternate implementations (relational, distributed) may be substituted —
//! the engine uses only this trait.

use crate::error::SchedulerError;
use crate::task::{Task, TaskState};
use async_trait::async_trait;

/// Persistence contract for [`Task`] metadata.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts or updates `task`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidArgument`] if `task.id` is empty.
    async fn save(&self, task: &Task) -> Result<(), SchedulerError>;

    /// Fetches the task stored under `id`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] if `id` is not present.
    async fn get(&self, id: &str) -> Result<Task, SchedulerError>;

    /// Returns a snapshot of every stored task. Order is unspecified.
    async fn list(&self) -> Vec<Task>;

    /// Removes the task stored under `id`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] if `id` is not present.
    async fn delete(&self, id: &str) -> Result<(), SchedulerError>;

    /// Updates only the state of the task stored under `id`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] if `id` is not present.
    async fn update_status(&self, id: &str, state: TaskState) -> Result<(), SchedulerError>;
}
