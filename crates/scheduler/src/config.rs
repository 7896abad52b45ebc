//! Operator-tunable knobs for the [`crate::SchedulerEngine`].

use std::time::Duration;

/// Configuration accepted by [`crate::SchedulerEngine::new`] /
/// [`crate::SchedulerEngine::with_config`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard cap applied to every task execution via its derived context.
    /// Bodies that exceed this are logged as failed; the engine does not
    /// forcibly abort them.
    pub execution_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            execution_timeout: Duration::from_secs(60 * 60),
        }
    }
}
