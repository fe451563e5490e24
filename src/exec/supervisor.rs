// src/exec/supervisor.rs

//! Lifecycle of the supervised application process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::errors::{Result, WindError};
use crate::exec::command::shell_command;

/// One generation of the running application.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
    generation: u64,
    child: Child,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// 1 for the first process started by a supervisor, 2 for the next, ...
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns at most one running application process.
///
/// `start` always stops the previous generation first, and `stop` only
/// returns once the process has been reaped, so two generations never run
/// at the same time.
#[derive(Debug)]
pub struct ProcessSupervisor {
    root: PathBuf,
    stop_timeout: Duration,
    current: Option<ProcessHandle>,
    generations: u64,
}

impl ProcessSupervisor {
    pub fn new(root: impl Into<PathBuf>, stop_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            stop_timeout,
            current: None,
            generations: 0,
        }
    }

    pub fn from_config(cfg: &WatchConfig) -> Self {
        Self::new(cfg.root.clone(), cfg.stop_timeout)
    }

    pub fn current(&self) -> Option<&ProcessHandle> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Number of generations launched so far.
    pub fn generations_started(&self) -> u64 {
        self.generations
    }

    /// Launch `run_cmd` as the next generation and return its pid.
    ///
    /// Does not wait for the process; its stdout/stderr are inherited.
    pub async fn start(&mut self, run_cmd: &str) -> Result<u32> {
        self.stop().await;

        let mut cmd = shell_command(run_cmd, &self.root);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Own process group, so stopping also reaches anything the shell forked.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd
            .spawn()
            .map_err(|e| WindError::LaunchFailed(format!("'{run_cmd}': {e}")))?;

        let pid = child.id().ok_or_else(|| {
            WindError::LaunchFailed(format!("'{run_cmd}' exited before it could be tracked"))
        })?;

        self.generations += 1;
        let generation = self.generations;
        self.current = Some(ProcessHandle {
            pid,
            generation,
            child,
        });

        info!(pid, generation, cmd = %run_cmd, "application started");
        Ok(pid)
    }

    /// Stop the current generation, if any, and wait for it to exit.
    ///
    /// Sends SIGTERM first; if that cannot be delivered, or the process is
    /// still alive after `stop_timeout`, it is killed. Failures are logged,
    /// never returned: shutdown has to proceed regardless.
    pub async fn stop(&mut self) {
        let Some(mut handle) = self.current.take() else {
            debug!("no application running; nothing to stop");
            return;
        };
        let pid = handle.pid;
        let generation = handle.generation;

        info!(pid, generation, "stopping application");

        if let Err(err) = terminate(&handle) {
            warn!(pid, error = %err, "graceful stop failed; killing application");
            force_kill(&mut handle);
        }

        match timeout(self.stop_timeout, handle.child.wait()).await {
            Ok(Ok(status)) => info!(pid, generation, %status, "application stopped"),
            Ok(Err(err)) => warn!(pid, error = %err, "failed to wait for application"),
            Err(_) => {
                warn!(
                    pid,
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "application did not exit in time; killing"
                );
                force_kill(&mut handle);
                match handle.child.wait().await {
                    Ok(status) => info!(pid, generation, %status, "application killed"),
                    Err(err) => warn!(pid, error = %err, "failed to reap killed application"),
                }
            }
        }
    }
}

#[cfg(unix)]
fn process_group_of(handle: &ProcessHandle) -> anyhow::Result<nix::unistd::Pid> {
    let raw = i32::try_from(handle.pid)?;
    Ok(nix::unistd::Pid::from_raw(raw))
}

/// Ask the application to exit (SIGTERM to its process group).
#[cfg(unix)]
fn terminate(handle: &ProcessHandle) -> anyhow::Result<()> {
    use nix::sys::signal::{killpg, Signal};

    killpg(process_group_of(handle)?, Signal::SIGTERM)?;
    Ok(())
}

#[cfg(not(unix))]
fn terminate(_handle: &ProcessHandle) -> anyhow::Result<()> {
    anyhow::bail!("graceful termination is not supported on this platform")
}

fn force_kill(handle: &mut ProcessHandle) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};

        if let Ok(group) = process_group_of(handle) {
            if let Err(err) = killpg(group, Signal::SIGKILL) {
                debug!(pid = handle.pid, error = %err, "SIGKILL to process group failed");
            }
        }
    }

    if let Err(err) = handle.child.start_kill() {
        warn!(pid = handle.pid, error = %err, "failed to kill application");
    }
}
