use crate::error::{BlockwallError, Result};
use tokio::signal;
use tokio::signal::unix::SignalKind;
use tracing::info;

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// Returns when the first signal is received.
pub async fn wait_for_shutdown_signal() -> Result<()> {
    let mut terminate = signal::unix::signal(SignalKind::terminate())
        .map_err(|e| BlockwallError::Signal(format!("failed to install SIGTERM handler: {}", e)))?;

    tokio::select! {
        res = signal::ctrl_c() => {
            res.map_err(|e| BlockwallError::Signal(format!("failed to install Ctrl+C handler: {}", e)))?;
            info!("Received SIGINT");
        }
        _ = terminate.recv() => info!("Received SIGTERM"),
    }

    Ok(())
}
