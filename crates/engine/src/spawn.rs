// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution.
//!
//! Commands run through the shell so agent invocations may use pipes. The
//! child gets its own process group; on timeout or cancellation the whole
//! group is terminated and whatever output was captured is returned so it
//! can still be published as artifacts.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::backchannel::BackChannel;
use crate::error::EngineError;

/// How often the back-channel sinks are polled while the child runs.
const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Grace period between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// One subprocess invocation.
pub struct SpawnSpec<'a> {
    pub command: &'a str,
    pub env: Vec<(String, String)>,
    pub cwd: &'a Path,
    pub timeout: Duration,
}

/// What happened to the child, including partial output on termination.
#[derive(Debug)]
pub struct SpawnOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl SpawnOutcome {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && !self.cancelled && self.exit_code == Some(0)
    }
}

/// Run a shell command, polling the back-channel until it exits.
pub async fn run_shell(
    spec: SpawnSpec<'_>,
    backchannel: &BackChannel,
    cancel: &CancellationToken,
) -> Result<SpawnOutcome, EngineError> {
    let started = Instant::now();

    let mut command = tokio::process::Command::new("sh");
    command
        .arg("-c")
        .arg(spec.command)
        .current_dir(spec.cwd)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn()?;
    let pid = child.id();

    let stdout_task = read_pipe(child.stdout.take());
    let stderr_task = read_pipe(child.stderr.take());

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    let deadline = tokio::time::sleep(spec.timeout);
    tokio::pin!(deadline);

    let mut timed_out = false;
    let mut cancelled = false;
    let exit_status = loop {
        tokio::select! {
            status = child.wait() => break Some(status?),
            _ = &mut deadline => {
                timed_out = true;
                break None;
            }
            _ = cancel.cancelled() => {
                cancelled = true;
                break None;
            }
            _ = interval.tick() => backchannel.poll(),
        }
    };

    let exit_status = match exit_status {
        Some(status) => Some(status),
        None => {
            terminate_group(pid, &mut child).await;
            child.wait().await.ok()
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();
    backchannel.poll();

    Ok(SpawnOutcome {
        exit_code: exit_status.and_then(|s| s.code()),
        stdout,
        stderr,
        timed_out,
        cancelled,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

fn read_pipe<R>(pipe: Option<R>) -> tokio::task::JoinHandle<String>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut pipe) = pipe else {
            return String::new();
        };
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer).await;
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

/// SIGTERM the process group, escalate to SIGKILL after the grace period.
#[cfg(unix)]
async fn terminate_group(pid: Option<u32>, child: &mut tokio::process::Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else {
        let _ = child.kill().await;
        return;
    };
    let group = Pid::from_raw(pid as i32);
    let _ = killpg(group, Signal::SIGTERM);
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
        tracing::warn!(pid, "child ignored SIGTERM, escalating");
        let _ = killpg(group, Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
async fn terminate_group(_pid: Option<u32>, child: &mut tokio::process::Child) {
    let _ = child.kill().await;
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
