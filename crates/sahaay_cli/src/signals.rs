//! OS signal handling.

use tracing::{error, info};

/// Resolves on the next Ctrl-C.
///
/// Never resolves if the handler cannot be installed.
pub(crate) async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(signal = "SIGINT", "Signal received."),
        Err(error) => {
            error!(%error, "Couldn't listen for SIGINT.");
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves when the process is asked to shut down.
#[cfg(unix)]
pub(crate) async fn shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(error) => {
            error!(%error, "Couldn't set up SIGTERM handler.");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        () = ctrl_c() => {}
        _ = sigterm.recv() => info!(signal = "SIGTERM", "Signal received."),
    }
}

/// Resolves when the process is asked to shut down.
#[cfg(not(unix))]
pub(crate) async fn shutdown() {
    ctrl_c().await;
}
