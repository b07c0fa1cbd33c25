//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], the default shutdown trigger of
//! [`Supervisor::run`](crate::Supervisor::run).
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM` (systemd/Kubernetes stop) and `SIGQUIT`.
//!
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

/// Waits for a termination signal.
///
/// Each call installs independent listeners. Returns `Err` if a listener
/// cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call installs an independent listener. Returns `Err` if it cannot be
/// registered.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
