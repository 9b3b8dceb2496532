mod io_pump;
mod run;
pub mod spec;

pub use run::{run_command, ExecutionResult};
pub use spec::{CommandSpec, Redirect, RedirectTarget, StdinSource};
