// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod signal;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{detect_project_layout, ProjectLayout, WatchConfig};
use crate::engine::{shutdown_watcher, BuildRunLoop, Watcher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::signal::ShutdownSignal;

/// How long to wait for the watch loop to finish its own shutdown after a
/// signal. Longer than this means it is stuck in a build.
const WATCHER_EXIT_TIMEOUT: Duration = Duration::from_secs(2);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project layout detection and config
/// - build loop / watcher
/// - Ctrl-C and SIGTERM handling
pub async fn run(args: CliArgs) -> Result<()> {
    if args.wants_version() {
        println!("wind v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let root = PathBuf::from(".");

    let layout = detect_project_layout(fs.as_ref(), &root);
    info!(layout = %layout.label, "detected project structure");

    let config = build_config(&args, root, &layout);
    config.validate()?;

    if args.dry_run {
        print_dry_run(&layout, &config);
        return Ok(());
    }

    info!(cwd = %current_dir_display(), "starting wind watcher");

    // Registered before anything is spawned so a failure aborts startup.
    let mut shutdown_signal = ShutdownSignal::register()?;

    let config = Arc::new(config);
    let backend = Arc::new(BuildRunLoop::new(Arc::clone(&config)));
    let cancel = CancellationToken::new();

    let watcher = Watcher::new(
        Arc::clone(&config),
        Arc::clone(&fs),
        Arc::clone(&backend),
        cancel.clone(),
    );
    let mut watcher_task = tokio::spawn(watcher.run());

    info!("press Ctrl+C to stop");

    tokio::select! {
        res = &mut watcher_task => {
            // The watcher only returns on its own if initialization failed.
            return match res {
                Ok(inner) => inner.map_err(Into::into),
                Err(join_err) => Err(anyhow!("watcher task failed: {join_err}")),
            };
        }
        signal = shutdown_signal.recv() => {
            let signal = signal?;
            info!(signal, "shutting down");
        }
    }

    shutdown_watcher(
        &cancel,
        backend.as_ref(),
        watcher_task,
        fs.as_ref(),
        &config,
        WATCHER_EXIT_TIMEOUT,
    )
    .await?;

    debug!("shutdown complete");
    Ok(())
}

/// Defaults + detected build command + CLI overrides.
fn build_config(args: &CliArgs, root: PathBuf, layout: &ProjectLayout) -> WatchConfig {
    let mut config = WatchConfig::from_layout(root, layout);
    if let Some(ms) = args.poll_interval_ms {
        config = config.with_poll_interval(Duration::from_millis(ms));
    }
    if let Some(ms) = args.debounce_ms {
        config = config.with_debounce_delay(Duration::from_millis(ms));
    }
    config
}

fn current_dir_display() -> String {
    std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Simple dry-run output: detected layout and effective configuration.
fn print_dry_run(layout: &ProjectLayout, cfg: &WatchConfig) {
    println!("wind dry-run");
    println!("  layout = {}", layout.label);
    println!("  root = {}", cfg.root.display());
    println!("  build_cmd = {}", cfg.build_cmd);
    println!("  run_cmd = {}", cfg.run_cmd);
    println!("  exclude_dirs = {:?}", cfg.exclude_dirs);
    println!("  include_exts = {:?}", cfg.include_exts);
    println!("  poll_interval_ms = {}", cfg.poll_interval.as_millis());
    println!("  debounce_ms = {}", cfg.debounce_delay.as_millis());
    println!("  stop_timeout_ms = {}", cfg.stop_timeout.as_millis());
    println!("  artifact = {}", cfg.artifact.display());

    debug!("dry-run complete (no execution)");
}
