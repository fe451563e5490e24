// src/engine/build_loop.rs

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::WatchConfig;
use crate::engine::CycleOutcome;
use crate::exec::{run_build, ProcessSupervisor};

/// State shared between rebuild cycles and shutdown.
///
/// `building` is set for the whole cycle (stop, build, launch) and cleared
/// on every exit path. `stopped` is set once by shutdown and never cleared.
#[derive(Debug)]
pub struct BuildState {
    building: bool,
    stopped: bool,
    supervisor: ProcessSupervisor,
}

impl BuildState {
    pub fn is_building(&self) -> bool {
        self.building
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }
}

/// Serialized stop → build → launch cycle.
///
/// The lock is held while the previous generation is stopped and while the
/// next one is launched, but not during the build itself, so shutdown can
/// always reap the application even when a build hangs.
#[derive(Debug)]
pub struct BuildRunLoop {
    config: Arc<WatchConfig>,
    state: Mutex<BuildState>,
}

impl BuildRunLoop {
    pub fn new(config: Arc<WatchConfig>) -> Self {
        let supervisor = ProcessSupervisor::from_config(&config);
        Self {
            config,
            state: Mutex::new(BuildState {
                building: false,
                stopped: false,
                supervisor,
            }),
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub async fn is_building(&self) -> bool {
        self.state.lock().await.is_building()
    }

    /// Pid of the running generation, if any.
    pub async fn current_pid(&self) -> Option<u32> {
        self.state
            .lock()
            .await
            .supervisor()
            .current()
            .map(|handle| handle.pid())
    }

    pub async fn generations_started(&self) -> u64 {
        self.state.lock().await.supervisor().generations_started()
    }

    /// Rebuild the project and replace the running application.
    ///
    /// Returns immediately with [`CycleOutcome::Skipped`] if another cycle
    /// is in flight. Failures are logged and reported through the outcome;
    /// nothing here is fatal to the watcher.
    pub async fn build_and_run(&self) -> CycleOutcome {
        {
            let mut state = self.state.lock().await;
            if state.stopped {
                debug!("shutdown requested; ignoring rebuild trigger");
                return CycleOutcome::ShuttingDown;
            }
            if state.building {
                debug!("build already in progress; dropping rebuild trigger");
                return CycleOutcome::Skipped;
            }
            state.building = true;

            // The old binary must not keep running (or hold the artifact open)
            // while the next build writes it.
            state.supervisor.stop().await;
        }

        let build = run_build(&self.config.build_cmd, &self.config.root).await;

        let mut state = self.state.lock().await;
        let outcome = match build {
            Err(err) => {
                error!(error = %err, "build failed; waiting for the next change");
                CycleOutcome::BuildFailed
            }
            Ok(()) if state.stopped => {
                info!("shutdown requested during build; not starting application");
                CycleOutcome::ShuttingDown
            }
            Ok(()) => match state.supervisor.start(&self.config.run_cmd).await {
                Ok(pid) => CycleOutcome::Started {
                    pid,
                    generation: state.supervisor.generations_started(),
                },
                Err(err) => {
                    error!(error = %err, "application did not start");
                    CycleOutcome::LaunchFailed
                }
            },
        };
        state.building = false;
        outcome
    }

    /// Stop the running generation and refuse further cycles.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if !state.stopped {
            info!("stopping build loop");
            state.stopped = true;
        }
        state.supervisor.stop().await;
    }
}
