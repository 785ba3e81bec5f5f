//! OS signal handling (§15), following the sibling `alerter` binary's
//! `shutdown::signal_handler` convention. Combined here with the
//! file-sentinel stop request so `sniper stop` and a real SIGINT/SIGTERM
//! end `start` the same way.

use crate::control::{ControlDir, STOP_POLL_INTERVAL};

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("received SIGINT signal, initiating graceful shutdown");
        }
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    tracing::info!("received CTRL+C signal, initiating graceful shutdown");
}

/// Waits until either an OS shutdown signal arrives or `sniper stop` touches
/// the control directory's stop sentinel (§15).
pub async fn wait(control: &ControlDir) {
    let poll_stop = async {
        loop {
            if control.stop_requested() {
                tracing::info!("stop requested via control file, initiating graceful shutdown");
                break;
            }
            tokio::time::sleep(STOP_POLL_INTERVAL).await;
        }
    };

    tokio::select! {
        _ = os_signal() => {}
        _ = poll_stop => {}
    }
}
