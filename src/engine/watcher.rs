// src/engine/watcher.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::engine::debounce::DebounceScheduler;
use crate::engine::{CycleBackend, WatcherState};
use crate::errors::{Result, WindError};
use crate::fs::FileSystem;
use crate::watch::ChangeDetector;

/// Top-level coordinator.
///
/// Owns the change detector and the debounce state, and drives a
/// [`CycleBackend`] from a single control loop that waits on three events:
/// the poll tick, the debounce deadline, and cancellation.
///
/// Lifecycle: `Initializing` (output dir, first scan, first build) →
/// `Running` (the loop) → `ShuttingDown` (backend shutdown, artifact
/// removal) → `Stopped`.
pub struct Watcher<B: CycleBackend> {
    config: Arc<WatchConfig>,
    fs: Arc<dyn FileSystem>,
    detector: ChangeDetector,
    debounce: DebounceScheduler,
    backend: Arc<B>,
    cancel: CancellationToken,
    state: WatcherState,
}

impl<B: CycleBackend> fmt::Debug for Watcher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("state", &self.state)
            .field("debounce", &self.debounce)
            .field("tracked_files", &self.detector.index().len())
            .finish_non_exhaustive()
    }
}

impl<B: CycleBackend> Watcher<B> {
    pub fn new(
        config: Arc<WatchConfig>,
        fs: Arc<dyn FileSystem>,
        backend: Arc<B>,
        cancel: CancellationToken,
    ) -> Self {
        let detector = ChangeDetector::from_config(Arc::clone(&fs), &config);
        let debounce = DebounceScheduler::new(config.debounce_delay);
        Self {
            config,
            fs,
            detector,
            debounce,
            backend,
            cancel,
            state: WatcherState::Initializing,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Initialize, watch until cancelled, then shut down.
    pub async fn run(mut self) -> Result<()> {
        if let Err(err) = self.initialize().await {
            self.state = WatcherState::Stopped;
            return Err(err);
        }
        self.watch().await;
        self.shutdown().await;
        Ok(())
    }

    /// Create the output directory, take the baseline scan and run the
    /// first build so an application is up before watching starts.
    ///
    /// Only a failure to create the output directory is fatal.
    pub async fn initialize(&mut self) -> Result<()> {
        self.state = WatcherState::Initializing;

        let output_dir = self.config.output_dir_path();
        self.fs
            .create_dir_all(&output_dir)
            .map_err(|e| WindError::OutputDirError(format!("{e:#}")))?;

        match self.detector.scan_files() {
            Ok(tracked) => info!(tracked, "initial scan complete"),
            Err(err) => warn!(error = %err, "initial scan failed; continuing"),
        }

        let outcome = self.backend.build_and_run().await;
        debug!(?outcome, "initial build cycle finished");
        Ok(())
    }

    /// The poll/debounce loop. Returns once the cancellation token fires.
    ///
    /// A cycle that is already running is awaited to completion; the
    /// cancellation is observed on the next iteration.
    pub async fn watch(&mut self) {
        self.state = WatcherState::Running;

        let cancel = self.cancel.clone();
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_ms = period.as_millis() as u64,
            debounce_ms = self.debounce.delay().as_millis() as u64,
            "watching for changes"
        );

        loop {
            let deadline = self.debounce.deadline();

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("cancellation received; leaving watch loop");
                    break;
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_debounce_elapsed().await;
                }

                _ = ticker.tick() => {
                    self.on_poll_tick();
                }
            }
        }
    }

    /// Stop the application and remove the build artifact.
    pub async fn shutdown(&mut self) {
        self.state = WatcherState::ShuttingDown;
        self.backend.shutdown().await;
        remove_artifact(self.fs.as_ref(), &self.config);
        self.state = WatcherState::Stopped;
        info!("watcher stopped");
    }

    fn on_poll_tick(&mut self) {
        match self.detector.check_for_changes() {
            Ok(changed) => {
                if self.debounce.observe(changed, Instant::now()) {
                    debug!(
                        delay_ms = self.debounce.delay().as_millis() as u64,
                        "change detected; rebuild scheduled"
                    );
                }
            }
            Err(err) => warn!(error = %err, "scan failed; retrying on next poll"),
        }
    }

    async fn on_debounce_elapsed(&mut self) {
        if !self.debounce.fire() {
            return;
        }
        info!("changes settled; rebuilding");
        let outcome = self.backend.build_and_run().await;
        debug!(?outcome, "rebuild cycle finished");
    }
}

/// Operator-requested shutdown of a spawned [`Watcher`].
///
/// Cancels the loop and shuts the backend down directly, so the application
/// is reaped even while the loop is stuck in a build. The loop then gets
/// `exit_timeout` to finish; after that it is aborted and the artifact is
/// removed here instead.
pub async fn shutdown_watcher<B: CycleBackend>(
    cancel: &CancellationToken,
    backend: &B,
    mut watcher_task: JoinHandle<Result<()>>,
    fs: &dyn FileSystem,
    cfg: &WatchConfig,
    exit_timeout: Duration,
) -> Result<()> {
    cancel.cancel();
    backend.shutdown().await;

    match timeout(exit_timeout, &mut watcher_task).await {
        Ok(Ok(res)) => res,
        Ok(Err(join_err)) => Err(WindError::Other(anyhow!("watcher task failed: {join_err}"))),
        Err(_) => {
            warn!(
                timeout_ms = exit_timeout.as_millis() as u64,
                "watch loop is still busy with a build; abandoning it"
            );
            watcher_task.abort();
            remove_artifact(fs, cfg);
            Ok(())
        }
    }
}

/// Remove the build artifact if it exists. Failures are only logged.
pub fn remove_artifact(fs: &dyn FileSystem, cfg: &WatchConfig) {
    let artifact = cfg.artifact_path();
    if !fs.is_file(&artifact) {
        return;
    }
    match fs.remove_file(&artifact) {
        Ok(()) => debug!(path = %artifact.display(), "removed build artifact"),
        Err(err) => warn!(path = %artifact.display(), error = %err, "failed to remove build artifact"),
    }
}
