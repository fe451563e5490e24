// src/signal.rs

//! Operator shutdown signals (Ctrl-C, and SIGTERM on unix).

use crate::errors::{Result, WindError};

/// Registered shutdown signal listeners.
///
/// Registration happens in [`ShutdownSignal::register`] so a failure is
/// reported at startup rather than when the first signal arrives.
#[derive(Debug)]
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    pub fn register() -> Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let terminate = signal(SignalKind::terminate()).map_err(|e| {
                WindError::SignalError(format!("failed to listen for SIGTERM: {e}"))
            })?;
            Ok(Self { terminate })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next shutdown request and return its name.
    pub async fn recv(&mut self) -> Result<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res.map_err(|e| {
                        WindError::SignalError(format!("failed to listen for Ctrl+C: {e}"))
                    })?;
                    Ok("interrupt")
                }
                _ = self.terminate.recv() => Ok("terminate"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.map_err(|e| {
                WindError::SignalError(format!("failed to listen for Ctrl+C: {e}"))
            })?;
            Ok("interrupt")
        }
    }
}
