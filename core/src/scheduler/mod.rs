//! The scheduler owns the group and limiter namespace and dispatches
//! submitted commands through it.
//!
//! One instance is constructed at startup from a [`SchedulerConfig`] and
//! passed to every collaborator; there is no process-wide state.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::error::EngineError;
use crate::group::Group;
use crate::log::{ColorHint, LogSink};
use crate::runner::{run_command, CommandSpec, ExecutionResult, Redirect};

mod graph;

enum GroupLimit {
    /// Additional per-group semaphore on top of the global limiter.
    Extra(Arc<Semaphore>),
    /// Exempt from the global limiter as well.
    Unlimited,
}

struct Registry {
    groups: HashMap<String, Arc<Group>>,
    limits: HashMap<String, GroupLimit>,
    declared: HashSet<String>,
    follows: HashMap<String, Vec<String>>,
}

pub struct Scheduler {
    registry: Mutex<Registry>,
    global: Arc<Semaphore>,
    log: Arc<dyn LogSink>,
    verbose: bool,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, log: Arc<dyn LogSink>) -> Self {
        Self {
            registry: Mutex::new(Registry {
                groups: HashMap::new(),
                limits: HashMap::new(),
                declared: HashSet::new(),
                follows: HashMap::new(),
            }),
            global: Arc::new(Semaphore::new(config.effective_max_procs())),
            log,
            verbose: config.verbose,
        }
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Declare a group with dependencies and a concurrency limit. Groups
    /// named in `follows` are created on demand with default options. A name
    /// previously created implicitly may be declared once; the declaration
    /// wires its dependencies and limit in place. Limit semantics: `0` uses
    /// only the global limiter, `> 0` adds a per-group semaphore of that
    /// size, `< 0` exempts the group from the global limiter entirely.
    pub fn declare_group(
        &self,
        name: &str,
        follows: &[String],
        limit: i64,
    ) -> Result<(), EngineError> {
        let mut reg = self.lock_registry();

        if reg.declared.contains(name) {
            return Err(EngineError::DuplicateGroup(name.to_string()));
        }

        let mut edges = reg.follows.clone();
        edges.insert(name.to_string(), follows.to_vec());
        if let Some(path) = graph::find_cycle(&edges, name) {
            return Err(EngineError::DependencyCycle(path));
        }

        let mut deps = Vec::with_capacity(follows.len());
        for dep in follows {
            let group = reg
                .groups
                .entry(dep.clone())
                .or_insert_with(|| Group::new(Vec::new()));
            deps.push(Arc::clone(group));
        }

        let group = Arc::clone(
            reg.groups
                .entry(name.to_string())
                .or_insert_with(|| Group::new(Vec::new())),
        );
        group.set_follows(deps);

        match limit.cmp(&0) {
            Ordering::Greater => {
                reg.limits.insert(
                    name.to_string(),
                    GroupLimit::Extra(Arc::new(Semaphore::new(limit as usize))),
                );
            }
            Ordering::Less => {
                reg.limits.insert(name.to_string(), GroupLimit::Unlimited);
            }
            Ordering::Equal => {}
        }

        reg.declared.insert(name.to_string());
        reg.follows.insert(name.to_string(), follows.to_vec());
        debug!(group = name, ?follows, limit, "declared group");
        Ok(())
    }

    /// Submit a command to a group, creating the group on demand, and return
    /// without waiting for it. An error from `submit` reflects a rejected
    /// spec or a previously latched group error, never this command's
    /// outcome. Specs requesting output capture are rejected; captured bytes
    /// have nowhere to go on an asynchronous submission (use
    /// [`run_sync`](Self::run_sync)).
    pub fn submit(&self, group_name: &str, spec: CommandSpec) -> Result<(), EngineError> {
        let wants_capture = |s: &Option<String>| {
            s.as_deref()
                .map(|raw| Redirect::parse(raw).capture)
                .unwrap_or(false)
        };
        if wants_capture(&spec.stdout) || wants_capture(&spec.stderr) {
            return Err(EngineError::CaptureOnSubmit);
        }

        let (group, group_sem, use_global) = {
            let mut reg = self.lock_registry();
            let group = Arc::clone(
                reg.groups
                    .entry(group_name.to_string())
                    .or_insert_with(|| Group::new(Vec::new())),
            );
            let (sem, use_global) = match reg.limits.get(group_name) {
                Some(GroupLimit::Unlimited) => (None, false),
                Some(GroupLimit::Extra(s)) => (Some(Arc::clone(s)), true),
                None => (None, true),
            };
            (group, sem, use_global)
        };

        let line = spec.command_line();
        let global = Arc::clone(&self.global);
        let log = Arc::clone(&self.log);
        let verbose = self.verbose;

        debug!(group = group_name, command = %line, "submitting command");
        group.exec(async move {
            let _group_token = match group_sem {
                Some(sem) => Some(
                    sem.acquire_owned()
                        .await
                        .map_err(|_| EngineError::LimiterClosed)?,
                ),
                None => None,
            };
            let _global_token = if use_global {
                Some(
                    global
                        .acquire_owned()
                        .await
                        .map_err(|_| EngineError::LimiterClosed)?,
                )
            } else {
                None
            };

            // Echo after limiter acquisition so echo order tracks actual
            // start order.
            if spec.echo {
                log.log(&line, ColorHint::Green);
            }

            let result = run_command(&spec).await;
            match result.status {
                Ok(()) => Ok(()),
                Err(err) => {
                    if spec.ignore_failure {
                        warn!(command = %line, error = %err, "ignoring command failure");
                        if verbose {
                            log.log(&format!("{line} (ignored)"), ColorHint::Yellow);
                        }
                        Ok(())
                    } else {
                        log.log(&line, ColorHint::Red);
                        Err(EngineError::Runner(err))
                    }
                }
            }
        })
    }

    /// Wait for the named groups (all known groups when `names` is empty).
    /// Every named group is waited on even after a failure, so dependents of
    /// later groups are not stranded mid-flight; the first error encountered
    /// is returned.
    pub async fn await_groups(&self, names: &[String]) -> Result<(), EngineError> {
        let groups: Vec<Arc<Group>> = {
            let mut reg = self.lock_registry();
            if names.is_empty() {
                reg.groups.values().cloned().collect()
            } else {
                names
                    .iter()
                    .map(|name| {
                        Arc::clone(
                            reg.groups
                                .entry(name.clone())
                                .or_insert_with(|| Group::new(Vec::new())),
                        )
                    })
                    .collect()
            }
        };

        let mut first_err = None;
        for group in groups {
            if let Err(err) = group.wait().await {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run a single ungrouped command and block until it exits. Unlike
    /// `submit`, capture is permitted and the captured bytes are returned in
    /// the result.
    pub async fn run_sync(&self, spec: CommandSpec) -> ExecutionResult {
        let line = spec.command_line();
        if spec.echo {
            self.log.log(&line, ColorHint::Green);
        }

        let mut result = run_command(&spec).await;
        if let Err(err) = &result.status {
            if spec.ignore_failure {
                warn!(command = %line, error = %err, "ignoring command failure");
                if self.verbose {
                    self.log.log(&format!("{line} (ignored)"), ColorHint::Yellow);
                }
                result.status = Ok(());
            } else {
                self.log.log(&line, ColorHint::Red);
            }
        }
        result
    }
}
