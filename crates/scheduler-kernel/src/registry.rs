//! The task function registry (C1): a name -> executable body mapping
//! populated at process startup and consulted by the Task Manager whenever
//! a new task is constructed.

use crate::error::SchedulerError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A future-returning body, boxed so it can be stored behind a trait object.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A cancellation-aware handle passed to every task body invocation.
///
/// Every `TaskContext` descends from the engine's root cancellation token
/// via [`TaskContext::child`]; cancelling an ancestor cancels every
/// descendant. Bodies are responsible for honoring cancellation
/// cooperatively — the engine never forcibly aborts a running body, it only
/// cancels the token and lets the body observe it.
#[derive(Clone)]
pub struct TaskContext {
    token: CancellationToken,
}

impl TaskContext {
    /// Creates a fresh root context with no parent.
    pub fn root() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Derives a child context that is cancelled whenever `self` is
    /// cancelled, but can also be cancelled independently.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested on this context or an ancestor.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl Default for TaskContext {
    fn default() -> Self {
        Self::root()
    }
}

/// A task's executable body: takes a cancellation-bearing context, returns
/// success or a descriptive failure.
pub type TaskBody =
    Arc<dyn Fn(TaskContext) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Builds a [`TaskBody`] from any `Fn(TaskContext) -> Fut` where `Fut`
/// resolves to a `Result<(), E>` for any displayable `E`.
pub fn task_body<F, Fut, E>(f: F) -> TaskBody
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display,
{
    Arc::new(move |ctx| {
        let fut = f(ctx);
        Box::pin(async move { fut.await.map_err(|e| e.to_string()) })
    })
}

/// Name -> executable body mapping.
///
/// Lookups may proceed concurrently; registration and removal are
/// serialized by the implementation.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Registers a body under `name`.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::InvalidArgument`] if `name` is empty.
    /// - [`SchedulerError::DuplicateName`] if `name` is already registered.
    async fn register(&self, name: &str, body: TaskBody) -> Result<(), SchedulerError>;

    /// Looks up the body registered under `name`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] if `name` is not registered.
    async fn lookup(&self, name: &str) -> Result<TaskBody, SchedulerError>;

    /// Removes the body registered under `name`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] if `name` is not registered.
    async fn remove(&self, name: &str) -> Result<(), SchedulerError>;

    /// Lists every registered function name. Order is unspecified.
    async fn list(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn task_context_resolves_cancelled_after_cancel() {
        let ctx = TaskContext::root();
        assert!(!ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
        ctx.cancelled().await;
    }

    #[tokio::test]
    async fn child_context_observes_parent_cancellation() {
        let root = TaskContext::root();
        let child = root.child();
        assert!(!child.is_cancelled());
        root.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn task_body_wraps_error_as_string() {
        let body = task_body(|_ctx| async { Err::<(), &'static str>("boom") });
        let result = body(TaskContext::root()).await;
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[tokio::test]
    async fn task_body_passes_through_success() {
        let body = task_body(|_ctx| async { Ok::<(), &'static str>(()) });
        assert!(body(TaskContext::root()).await.is_ok());
    }
}
