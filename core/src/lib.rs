//! taskmill-core: the concurrent process-execution engine behind the
//! taskmill task runner.
//!
//! Commands are submitted into named groups. A group encodes dependency
//! ordering ("follows"), optional per-group concurrency limits on top of a
//! global limiter, and first-error propagation across its asynchronous
//! submissions. The [`Scheduler`](scheduler::Scheduler) owns the group and
//! limiter namespace; the [`runner`] module turns a
//! [`CommandSpec`](runner::CommandSpec) into a running process with
//! redirect/tee/capture stream plumbing.
//!
//! The embedding layer (the scripting VM and CLI) lives in other crates and
//! talks to this one exclusively through [`api`].

pub mod api;
pub mod config;
pub mod error;
pub mod group;
pub mod log;
pub mod runner;
pub mod scheduler;
pub mod util;
