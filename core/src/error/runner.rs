use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures of a single command execution: setup, stream plumbing, or the
/// process itself. Exit codes are not part of the public contract; a non-zero
/// exit is simply `Failed`.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("spawn failed: {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("wait failed: {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
    #[error("command failed: {program}: {status}")]
    Failed { program: String, status: ExitStatus },
}
