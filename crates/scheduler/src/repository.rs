//! Default in-memory implementation of [`scheduler_kernel::TaskRepository`].

use async_trait::async_trait;
use parking_lot::RwLock;
use scheduler_kernel::{SchedulerError, Task, TaskRepository, TaskState};
use std::collections::HashMap;

/// Process-local, non-durable task store. Useful as the default backend and
/// as a reference implementation for alternate (durable) repositories.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, task: &Task) -> Result<(), SchedulerError> {
        if task.id.is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "task id must not be empty".into(),
            ));
        }
        self.tasks.write().insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Task, SchedulerError> {
        self.tasks
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Vec<Task> {
        self.tasks.read().values().cloned().collect()
    }

    async fn delete(&self, id: &str) -> Result<(), SchedulerError> {
        self.tasks
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    async fn update_status(&self, id: &str, state: TaskState) -> Result<(), SchedulerError> {
        let mut tasks = self.tasks.write();
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
        task.state = state;
        Ok(())
    }
}
