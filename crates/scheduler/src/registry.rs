//! Default in-memory implementation of [`scheduler_kernel::TaskRegistry`].

use async_trait::async_trait;
use parking_lot::RwLock;
use scheduler_kernel::{SchedulerError, TaskBody, TaskRegistry};
use std::collections::HashMap;

/// Thread-safe, process-local function registry.
///
/// Lookups take the reader side of the lock and can proceed concurrently;
/// registration and removal take the writer side and are serialized.
#[derive(Default)]
pub struct InMemoryTaskRegistry {
    bodies: RwLock<HashMap<String, TaskBody>>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn register(&self, name: &str, body: TaskBody) -> Result<(), SchedulerError> {
        if name.is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "function name must not be empty".into(),
            ));
        }
        let mut bodies = self.bodies.write();
        if bodies.contains_key(name) {
            return Err(SchedulerError::DuplicateName(name.to_string()));
        }
        bodies.insert(name.to_string(), body);
        tracing::info!(function = name, "registered task function");
        Ok(())
    }

    async fn lookup(&self, name: &str) -> Result<TaskBody, SchedulerError> {
        self.bodies
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))
    }

    async fn remove(&self, name: &str) -> Result<(), SchedulerError> {
        let mut bodies = self.bodies.write();
        if bodies.remove(name).is_none() {
            return Err(SchedulerError::NotFound(name.to_string()));
        }
        tracing::info!(function = name, "removed task function");
        Ok(())
    }

    async fn list(&self) -> Vec<String> {
        self.bodies.read().keys().cloned().collect()
    }
}
