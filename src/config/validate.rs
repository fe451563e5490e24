// src/config/validate.rs

use std::time::Duration;

use crate::config::model::WatchConfig;
use crate::errors::{Result, WindError};

impl WatchConfig {
    /// Check the invariants the watcher relies on.
    ///
    /// Called once at startup, after CLI overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        validate_commands(self)?;
        validate_timings(self)?;
        validate_extensions(self)?;
        validate_excludes(self)?;
        Ok(())
    }
}

fn validate_commands(cfg: &WatchConfig) -> Result<()> {
    if cfg.build_cmd.trim().is_empty() {
        return Err(WindError::ConfigError(
            "build command must not be empty".to_string(),
        ));
    }
    if cfg.run_cmd.trim().is_empty() {
        return Err(WindError::ConfigError(
            "run command must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_timings(cfg: &WatchConfig) -> Result<()> {
    // tokio intervals panic on a zero period.
    if cfg.poll_interval == Duration::ZERO {
        return Err(WindError::ConfigError(
            "poll interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_extensions(cfg: &WatchConfig) -> Result<()> {
    if cfg.include_exts.is_empty() {
        return Err(WindError::ConfigError(
            "at least one file extension must be watched".to_string(),
        ));
    }
    for ext in cfg.include_exts.iter() {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(WindError::ConfigError(format!(
                "watched extension '{}' must start with '.' (e.g. \".go\")",
                ext
            )));
        }
    }
    Ok(())
}

fn validate_excludes(cfg: &WatchConfig) -> Result<()> {
    // An empty fragment is a substring of every path.
    if cfg.exclude_dirs.iter().any(|d| d.is_empty()) {
        return Err(WindError::ConfigError(
            "excluded directory names must not be empty".to_string(),
        ));
    }
    Ok(())
}
