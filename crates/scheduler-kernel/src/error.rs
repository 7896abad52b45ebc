//! Crate-wide error taxonomy for the task scheduler core.

use thiserror::Error;

/// All errors that can be returned by scheduler operations.
///
/// Marked `#[non_exhaustive]` so new variants can be added in future minor
/// releases without breaking callers that match exhaustively.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchedulerError {
    /// A required argument was empty, null, or otherwise malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No task, function, or schedule exists under the given identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// `addTask` was called with an id already present in the live index.
    #[error("duplicate task id: {0}")]
    DuplicateId(String),

    /// `registerFunction` was called with a name already present in the registry.
    #[error("duplicate function name: {0}")]
    DuplicateName(String),

    /// A cron expression failed to parse.
    #[error("invalid cron expression '{expression}': {reason}")]
    ParseError { expression: String, reason: String },

    /// `start` was called on an engine that is already running.
    #[error("engine is already running")]
    AlreadyRunning,

    /// `stop` was called on an engine that is not running.
    #[error("engine is not running")]
    NotRunning,

    /// A task fired but had no bound body (reconstituted from persistence
    /// without its function being re-registered first).
    #[error("task '{0}' has no bound body")]
    UnboundBody(String),

    /// The repository backing the engine returned an error.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// The task body itself returned an error when invoked.
    #[error("execution failed: {0}")]
    ExecutionFailure(String),
}
