#![allow(dead_code)]

use std::sync::Arc;

use taskmill_core::api::{CommandSpec, NullLog, Scheduler, SchedulerConfig};

/// A `/bin/sh -c` one-liner spec with echo disabled, so test output stays
/// quiet.
pub fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("/bin/sh").args(["-c", script]).echo(false)
}

/// A scheduler with a silent log sink and the given global limiter size.
pub fn scheduler(max_procs: usize) -> Scheduler {
    Scheduler::new(
        SchedulerConfig {
            max_procs,
            verbose: false,
        },
        Arc::new(NullLog),
    )
}
