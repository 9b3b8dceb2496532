use std::path::PathBuf;

/// Where the child's stdin comes from. Exactly one source applies.
#[derive(Debug, Clone, Default)]
pub enum StdinSource {
    #[default]
    Inherit,
    Inline(Vec<u8>),
    File(PathBuf),
}

/// A single command to execute. Argument vectors arrive pre-split; no shell
/// expansion happens here.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child. Relative redirect targets and stdin
    /// files resolve against it as well.
    pub dir: Option<PathBuf>,
    /// When set, replaces the child's environment entirely; the embedding
    /// layer composes the full set of variables.
    pub env: Option<Vec<(String, String)>>,
    pub stdin: StdinSource,
    /// Raw stdout redirect spec, e.g. `"+&out.log"`. See [`Redirect::parse`].
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    /// Treat a command failure as success for propagation purposes.
    pub ignore_failure: bool,
    /// Echo the composed command line through the log sink before running.
    pub echo: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            env: None,
            stdin: StdinSource::Inherit,
            stdout: None,
            stderr: None,
            ignore_failure: false,
            echo: true,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn input(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = StdinSource::Inline(bytes.into());
        self
    }

    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = StdinSource::File(path.into());
        self
    }

    pub fn stdout(mut self, spec: impl Into<String>) -> Self {
        self.stdout = Some(spec.into());
        self
    }

    pub fn stderr(mut self, spec: impl Into<String>) -> Self {
        self.stderr = Some(spec.into());
        self
    }

    pub fn ignore_failure(mut self, ignore: bool) -> Self {
        self.ignore_failure = ignore;
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// The shell-style command line used for echoing and failure reports.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len());
        parts.push(quote_arg(&self.program));
        parts.extend(self.args.iter().map(|a| quote_arg(a)));
        parts.join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.chars().any(char::is_whitespace) {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Destination of a parsed redirect spec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RedirectTarget {
    /// No file destination; only tee/capture apply (or plain inheritance).
    #[default]
    None,
    File(String),
    /// The literal alias `&1`.
    ParentStdout,
    /// The literal alias `&2`.
    ParentStderr,
}

/// A parsed per-stream redirect spec.
///
/// The grammar strips leading modifier characters greedily, left to right:
/// `+` append, `&` tee, `$` capture. What remains is the destination path.
/// The aliases `&1`/`&2` are recognized before any stripping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Redirect {
    pub append: bool,
    pub tee: bool,
    pub capture: bool,
    pub target: RedirectTarget,
}

impl Redirect {
    /// A redirect that leaves the stream inherited from the parent.
    pub fn inherit() -> Self {
        Self::default()
    }

    pub fn parse(spec: &str) -> Self {
        match spec {
            "&1" => {
                return Self {
                    target: RedirectTarget::ParentStdout,
                    ..Self::default()
                }
            }
            "&2" => {
                return Self {
                    target: RedirectTarget::ParentStderr,
                    ..Self::default()
                }
            }
            _ => {}
        }

        let mut rest = spec;
        let mut append = false;
        let mut tee = false;
        let mut capture = false;
        loop {
            if let Some(r) = rest.strip_prefix('+') {
                append = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix('&') {
                tee = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix('$') {
                capture = true;
                rest = r;
            } else {
                break;
            }
        }

        let target = if rest.is_empty() {
            RedirectTarget::None
        } else {
            RedirectTarget::File(rest.to_string())
        };

        // Tee with neither a file nor capture is a no-op: the stream would
        // already be inherited.
        if !capture && target == RedirectTarget::None {
            tee = false;
        }

        Self {
            append,
            tee,
            capture,
            target,
        }
    }

    /// Whether this stream needs a pipe and a pump task. `own_parent` is the
    /// alias naming the stream's own inherited destination (`&1` for stdout,
    /// `&2` for stderr); redirecting a stream onto itself with no modifiers
    /// is plain inheritance.
    pub fn needs_plumbing(&self, own_parent: &RedirectTarget) -> bool {
        if self.capture || self.tee {
            return true;
        }
        !(self.target == RedirectTarget::None || self.target == *own_parent)
    }
}
