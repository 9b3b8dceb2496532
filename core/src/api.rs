//! Stable re-exports for consumers (the scripting front-end and external
//! crates).
//!
//! Prefer importing from `taskmill_core::api` instead of reaching into
//! internal modules.

pub use crate::config::{load_path, SchedulerConfig};
pub use crate::error::{EngineError, RunnerError};
pub use crate::group::Group;
pub use crate::log::{ColorHint, LogSink, NullLog, StderrLog};
pub use crate::runner::{
    run_command, CommandSpec, ExecutionResult, Redirect, RedirectTarget, StdinSource,
};
pub use crate::scheduler::Scheduler;
pub use crate::util::OutputSink;
