// src/exec/command.rs

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::errors::{Result, WindError};

/// Build a shell command appropriate for the platform, running in `dir`.
pub fn shell_command(cmd: &str, dir: &Path) -> Command {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };
    command.current_dir(dir);
    command
}

/// Run the build command to completion with inherited stdout/stderr.
///
/// A non-zero exit is reported as [`WindError::BuildFailed`]. There is no
/// timeout: a hanging build blocks the caller until it exits.
pub async fn run_build(cmd: &str, dir: &Path) -> Result<()> {
    info!(cmd = %cmd, "building application");

    let status = shell_command(cmd, dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| WindError::BuildFailed(format!("could not run '{cmd}': {e}")))?;

    if !status.success() {
        return Err(WindError::BuildFailed(format!("'{cmd}' exited with {status}")));
    }

    info!("build successful");
    Ok(())
}
