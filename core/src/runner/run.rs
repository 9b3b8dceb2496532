use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::error::RunnerError;
use crate::util::OutputSink;

use super::io_pump::{pump, ParentStream, SharedFile, StreamWriter};
use super::spec::{CommandSpec, Redirect, RedirectTarget, StdinSource};

/// Outcome of a single command. Captured bytes are present whenever capture
/// was requested, including on failure.
pub struct ExecutionResult {
    pub output: Option<Vec<u8>>,
    pub status: Result<(), RunnerError>,
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Execute one command with the spec's stdin wiring and redirect plumbing,
/// blocking until the process exits and all stream pumps have drained.
pub async fn run_command(spec: &CommandSpec) -> ExecutionResult {
    let stdout_r = spec
        .stdout
        .as_deref()
        .map(Redirect::parse)
        .unwrap_or_else(Redirect::inherit);
    let stderr_r = spec
        .stderr
        .as_deref()
        .map(Redirect::parse)
        .unwrap_or_else(Redirect::inherit);

    // One sink serves both streams; interleaving between them is unordered.
    let sink = if stdout_r.capture || stderr_r.capture {
        Some(OutputSink::new())
    } else {
        None
    };

    let status = execute(spec, &stdout_r, &stderr_r, sink.as_ref()).await;
    ExecutionResult {
        output: sink.map(|s| s.to_bytes()),
        status,
    }
}

async fn execute(
    spec: &CommandSpec,
    stdout_r: &Redirect,
    stderr_r: &Redirect,
    sink: Option<&Arc<OutputSink>>,
) -> Result<(), RunnerError> {
    let stdout_plumbed = stdout_r.needs_plumbing(&RedirectTarget::ParentStdout);
    let stderr_plumbed = stderr_r.needs_plumbing(&RedirectTarget::ParentStderr);

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    if let Some(dir) = &spec.dir {
        cmd.current_dir(dir);
    }
    if let Some(env) = &spec.env {
        cmd.env_clear();
        cmd.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    match &spec.stdin {
        StdinSource::Inherit => {
            cmd.stdin(Stdio::inherit());
        }
        StdinSource::Inline(_) => {
            cmd.stdin(Stdio::piped());
        }
        StdinSource::File(path) => {
            let path = resolve(spec.dir.as_deref(), path);
            let f = std::fs::File::open(&path).map_err(|e| RunnerError::Open {
                path: path.clone(),
                source: e,
            })?;
            cmd.stdin(Stdio::from(f));
        }
    }

    // Identical destination paths share one open file so neither stream
    // truncates the other; the stdout spec's append flag governs the open.
    let stdout_file = match &stdout_r.target {
        RedirectTarget::File(name) => {
            Some(open_target(spec.dir.as_deref(), name, stdout_r.append).await?)
        }
        _ => None,
    };
    let stderr_file = match (&stderr_r.target, &stdout_r.target) {
        (RedirectTarget::File(e), RedirectTarget::File(o)) if e == o => stdout_file.clone(),
        (RedirectTarget::File(name), _) => {
            Some(open_target(spec.dir.as_deref(), name, stderr_r.append).await?)
        }
        _ => None,
    };

    cmd.stdout(if stdout_plumbed {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(if stderr_plumbed {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });

    debug!(program = %spec.program, stdout_plumbed, stderr_plumbed, "spawning command");
    let mut child = cmd.spawn().map_err(|e| RunnerError::Spawn {
        program: spec.program.clone(),
        source: e,
    })?;

    if let StdinSource::Inline(bytes) = &spec.stdin {
        if let Some(mut stdin) = child.stdin.take() {
            let bytes = bytes.clone();
            tokio::spawn(async move {
                let _ = stdin.write_all(&bytes).await;
                let _ = stdin.shutdown().await;
            });
        }
    }

    let nstreams = usize::from(stdout_plumbed) + usize::from(stderr_plumbed);
    let (done_tx, mut done_rx) = mpsc::channel(nstreams.max(1));
    let mut pumps = 0usize;

    if stdout_plumbed {
        if let Some(rd) = child.stdout.take() {
            let wr = StreamWriter {
                capture: stdout_r.capture.then(|| sink.cloned()).flatten(),
                file: stdout_file,
                parent: alias_writer(&stdout_r.target),
                tee: stdout_r.tee.then(ParentStream::stdout),
            };
            pump(rd, wr, "stdout", done_tx.clone());
            pumps += 1;
        }
    }
    if stderr_plumbed {
        if let Some(rd) = child.stderr.take() {
            let wr = StreamWriter {
                capture: stderr_r.capture.then(|| sink.cloned()).flatten(),
                file: stderr_file,
                parent: alias_writer(&stderr_r.target),
                tee: stderr_r.tee.then(ParentStream::stderr),
            };
            pump(rd, wr, "stderr", done_tx.clone());
            pumps += 1;
        }
    }
    drop(done_tx);

    let mut pump_err: Option<RunnerError> = None;
    let mut remaining = pumps;
    while remaining > 0 {
        let Some(res) = done_rx.recv().await else {
            break;
        };
        remaining -= 1;
        if let Err(e) = res {
            pump_err = Some(e);
            break;
        }
    }

    if let Some(err) = pump_err {
        // Drain the other pump so the child's pipes stay read, then reap the
        // process before surfacing the stream error.
        while remaining > 0 {
            if done_rx.recv().await.is_none() {
                break;
            }
            remaining -= 1;
        }
        let _ = child.wait().await;
        return Err(err);
    }

    let status = child.wait().await.map_err(|e| RunnerError::Wait {
        program: spec.program.clone(),
        source: e,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(RunnerError::Failed {
            program: spec.program.clone(),
            status,
        })
    }
}

fn alias_writer(target: &RedirectTarget) -> Option<ParentStream> {
    match target {
        RedirectTarget::ParentStdout => Some(ParentStream::stdout()),
        RedirectTarget::ParentStderr => Some(ParentStream::stderr()),
        _ => None,
    }
}

async fn open_target(
    dir: Option<&Path>,
    name: &str,
    append: bool,
) -> Result<SharedFile, RunnerError> {
    let path = resolve(dir, Path::new(name));
    let mut opts = tokio::fs::OpenOptions::new();
    opts.write(true).create(true);
    if append {
        opts.append(true);
    } else {
        opts.truncate(true);
    }
    let file = opts.open(&path).await.map_err(|e| RunnerError::Open {
        path: path.clone(),
        source: e,
    })?;
    Ok(Arc::new(Mutex::new(file)))
}

fn resolve(dir: Option<&Path>, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match dir {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}
