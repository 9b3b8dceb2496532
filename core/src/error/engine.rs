use thiserror::Error;

use super::runner::RunnerError;

/// Scheduler and group level errors. A command failure crosses group latches
/// unchanged, wrapped as `Runner`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("group already exists: {0:?}")]
    DuplicateGroup(String),

    #[error("dependency cycle: {0}")]
    DependencyCycle(String),

    #[error("output capture not allowed for asynchronous submission")]
    CaptureOnSubmit,

    #[error("limiter closed unexpectedly")]
    LimiterClosed,

    #[error("runner failed: {0}")]
    Runner(#[from] RunnerError),
}
