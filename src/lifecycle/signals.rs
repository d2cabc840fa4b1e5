//! OS signal handling.
//!
//! SIGINT and SIGTERM both start a graceful shutdown.

use crate::lifecycle::shutdown::Shutdown;

/// Wait for SIGINT (ctrl-c) or, on unix, SIGTERM.
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "SIGINT")
    }
}

/// Spawn a task that triggers `shutdown` on the first termination signal.
pub fn spawn_signal_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_termination().await {
            Ok(signal) => {
                tracing::info!(signal, "Shutdown signal received");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler"),
        }
    })
}
