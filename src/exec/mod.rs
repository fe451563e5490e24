// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the build and run
//! commands, using `tokio::process::Command` through the platform shell.
//!
//! - [`command`] builds shell commands and runs the build to completion.
//! - [`supervisor`] owns the launched application process: starting a new
//!   generation, and stopping (SIGTERM, then SIGKILL) and reaping the old one.

pub mod command;
pub mod supervisor;

pub use command::{run_build, shell_command};
pub use supervisor::{ProcessHandle, ProcessSupervisor};
