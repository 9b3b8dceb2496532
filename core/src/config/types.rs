use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Size of the global limiter. `0` means "use the machine's logical CPU
    /// count".
    #[serde(default = "default_max_procs")]
    pub max_procs: usize,

    /// If true, ignored command failures are reported through the log sink.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_max_procs() -> usize {
    0
}

fn default_verbose() -> bool {
    false
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_procs: default_max_procs(),
            verbose: default_verbose(),
        }
    }
}

impl SchedulerConfig {
    /// The resolved global limiter size.
    pub fn effective_max_procs(&self) -> usize {
        if self.max_procs == 0 {
            num_cpus::get()
        } else {
            self.max_procs
        }
    }
}
