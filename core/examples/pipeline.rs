//! Small demo pipeline: a "build" group feeding a "test" group, plus a
//! synchronous captured invocation.
//!
//! Run with: cargo run --example pipeline

use std::sync::Arc;

use taskmill_core::api::{CommandSpec, Scheduler, SchedulerConfig, StderrLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmill_core=debug".into()),
        )
        .init();

    let scheduler = Scheduler::new(
        SchedulerConfig {
            max_procs: 2,
            verbose: true,
        },
        Arc::new(StderrLog::new()),
    );

    scheduler.declare_group("build", &[], 0)?;
    scheduler.declare_group("test", &["build".to_string()], 1)?;

    for unit in ["alpha", "beta", "gamma"] {
        scheduler.submit(
            "build",
            CommandSpec::new("/bin/sh")
                .arg("-c")
                .arg(format!("sleep 0.2; echo built {unit}")),
        )?;
    }
    scheduler.submit(
        "test",
        CommandSpec::new("/bin/sh").args(["-c", "echo all units tested"]),
    )?;

    scheduler.await_groups(&[]).await?;

    let result = scheduler
        .run_sync(
            CommandSpec::new("/bin/sh")
                .args(["-c", "uname -s"])
                .stdout("$"),
        )
        .await;
    result.status?;
    if let Some(bytes) = result.output {
        print!("captured: {}", String::from_utf8_lossy(&bytes));
    }

    Ok(())
}
