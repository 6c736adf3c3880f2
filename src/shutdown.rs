use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Cancel `token` once a termination signal arrives
pub async fn handle_signals(token: CancellationToken) {
    tokio::select! {
        _ = wait_for_signal() => token.cancel(),
        _ = token.cancelled() => {}
    }
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() {
    // Handle SIGTERM
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!("Failed to create SIGTERM signal handler: {}", e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, cancelling");
        }
        _ = wait_for_ctrl_c() => {}
    }
}

/// Platform-specific signal handling implementation
#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C signal, cancelling"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            // Without a signal source the only way out is normal completion
            std::future::pending::<()>().await
        }
    }
}
