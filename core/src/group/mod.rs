//! Dependency groups.
//!
//! A [`Group`] coordinates asynchronous submissions that must observe the
//! completion (and failure) of other groups before running. Each group keeps
//! an in-flight counter and a single latched error; the first error recorded
//! between two waits wins, later concurrent errors in the same epoch are
//! dropped.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;

use crate::error::EngineError;

struct State {
    in_flight: u64,
    err: Option<EngineError>,
}

pub struct Group {
    deps: Mutex<Vec<Arc<Group>>>,
    state: Mutex<State>,
    notify: Notify,
}

impl Group {
    pub fn new(deps: Vec<Arc<Group>>) -> Arc<Self> {
        Arc::new(Self {
            deps: Mutex::new(deps),
            state: Mutex::new(State {
                in_flight: 0,
                err: None,
            }),
            notify: Notify::new(),
        })
    }

    /// Replace the dependency list. The scheduler calls this when a group
    /// created implicitly is later declared with `follows`. Must not be
    /// called once submissions to this group have begun.
    pub fn set_follows(&self, deps: Vec<Arc<Group>>) {
        let mut g = self.deps.lock().unwrap_or_else(PoisonError::into_inner);
        *g = deps;
    }

    /// Begin executing `fut` and prevent waiters from resuming until it
    /// finishes. If the group already holds a latched error it is returned
    /// immediately, cleared, and `fut` is never started. That check races
    /// with concurrently finishing work; a submission landing just before a
    /// failure is recorded still runs. This is a documented simplification.
    pub fn exec<F>(self: &Arc<Self>, fut: F) -> Result<(), EngineError>
    where
        F: Future<Output = Result<(), EngineError>> + Send + 'static,
    {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(err) = state.err.take() {
                return Err(err);
            }
            state.in_flight += 1;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut err = None;

            let deps = {
                let g = this.deps.lock().unwrap_or_else(PoisonError::into_inner);
                g.clone()
            };
            // Dependencies are awaited in declaration order; any failure
            // skips the body entirely.
            for dep in deps {
                if let Err(e) = dep.wait().await {
                    err = Some(e);
                    break;
                }
            }

            if err.is_none() {
                err = fut.await.err();
            }

            let mut state = this.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.err.is_none() {
                state.err = err;
            }
            state.in_flight -= 1;
            drop(state);
            this.notify.notify_waiters();
        });

        Ok(())
    }

    /// Block until the group has no running submissions or an error has been
    /// recorded, whichever comes first. The returned error is cleared from
    /// the latch; a second wait with no new submissions reports success.
    pub async fn wait(&self) -> Result<(), EngineError> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.in_flight == 0 || state.err.is_some() {
                    return match state.err.take() {
                        Some(err) => Err(err),
                        None => Ok(()),
                    };
                }
            }
            notified.await;
        }
    }
}
