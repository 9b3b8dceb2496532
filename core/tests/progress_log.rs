//! Progress-sink output: echoed command lines, failure reports, and the
//! verbose-gated ignored-failure warning.

mod common;

use std::sync::{Arc, Mutex};

use common::sh;
use taskmill_core::api::{ColorHint, LogSink, Scheduler, SchedulerConfig};

#[derive(Default)]
struct RecordingLog {
    lines: Mutex<Vec<(String, ColorHint)>>,
}

impl RecordingLog {
    fn lines(&self) -> Vec<(String, ColorHint)> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for RecordingLog {
    fn log(&self, message: &str, color: ColorHint) {
        self.lines
            .lock()
            .unwrap()
            .push((message.to_string(), color));
    }
}

fn recording_scheduler(verbose: bool) -> (Scheduler, Arc<RecordingLog>) {
    let log = Arc::new(RecordingLog::default());
    let scheduler = Scheduler::new(
        SchedulerConfig {
            max_procs: 2,
            verbose,
        },
        Arc::clone(&log) as Arc<dyn LogSink>,
    );
    (scheduler, log)
}

#[tokio::test]
async fn submitted_command_line_echoes_green() {
    let (s, log) = recording_scheduler(false);
    let spec = sh("true").echo(true);
    let line = spec.command_line();

    s.submit("g", spec).unwrap();
    s.await_groups(&[]).await.unwrap();

    assert!(log.lines().contains(&(line, ColorHint::Green)));
}

#[tokio::test]
async fn unignored_failure_reports_command_line_red() {
    let (s, log) = recording_scheduler(false);
    let spec = sh("exit 1");
    let line = spec.command_line();

    s.submit("g", spec).unwrap();
    assert!(s.await_groups(&[]).await.is_err());

    let lines = log.lines();
    assert!(lines.contains(&(line, ColorHint::Red)));
    assert!(lines.iter().all(|(_, c)| *c != ColorHint::Green));
}

#[tokio::test]
async fn ignored_failure_warns_yellow_when_verbose() {
    let (s, log) = recording_scheduler(true);
    let spec = sh("exit 1").ignore_failure(true);
    let line = spec.command_line();

    s.submit("g", spec).unwrap();
    s.await_groups(&[]).await.unwrap();

    assert!(log
        .lines()
        .contains(&(format!("{line} (ignored)"), ColorHint::Yellow)));
}

#[tokio::test]
async fn ignored_failure_stays_silent_without_verbose() {
    let (s, log) = recording_scheduler(false);
    s.submit("g", sh("exit 1").ignore_failure(true)).unwrap();
    s.await_groups(&[]).await.unwrap();

    let lines = log.lines();
    assert!(lines.iter().all(|(_, c)| *c != ColorHint::Yellow));
    assert!(lines.iter().all(|(_, c)| *c != ColorHint::Red));
}
