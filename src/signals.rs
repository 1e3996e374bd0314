//! Process signal handling.
//!
//! SIGINT and SIGTERM cancel the shared token, which stops the notifier and
//! lets the relay drain and return. SIGQUIT logs a runtime dump and keeps
//! running. On non-Unix platforms only Ctrl-C is observed.

use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Spawns the signal listener task.
///
/// Must be called from within a Tokio runtime.
#[cfg(unix)]
pub fn install(cancel: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::warn!("Terminate signal");
                    cancel.cancel();
                }
                _ = sigint.recv() => {
                    tracing::warn!("Interrupt signal");
                    cancel.cancel();
                }
                _ = sigquit.recv() => {
                    tracing::info!("SIGQUIT detected, dump:\n{}", runtime_dump());
                }
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn install(cancel: CancellationToken) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt signal");
            cancel.cancel();
        }
    });
    Ok(())
}

/// Best-effort description of the running process: runtime metrics plus a
/// backtrace of the calling task.
pub fn runtime_dump() -> String {
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let metrics = handle.metrics();
            format!(
                "runtime: workers={} alive_tasks={}",
                metrics.num_workers(),
                metrics.num_alive_tasks()
            )
        }
        Err(_) => "runtime: none".to_string(),
    };

    format!(
        "{}\n{}",
        runtime,
        std::backtrace::Backtrace::force_capture()
    )
}
