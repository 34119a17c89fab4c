use anyhow::Result;

/// Resolves on SIGTERM/SIGINT (Unix) or Ctrl+C/Ctrl+Break (Windows).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c};
        let mut c = ctrl_c()?;
        let mut br = ctrl_break()?;
        tokio::select! {
            _ = c.recv() => {},
            _ = br.recv() => {},
        }
        Ok(())
    }
}

/// Cancel `token` once a shutdown signal arrives. Falls back to
/// `ctrl_c()` when signal handlers cannot be installed.
pub fn cancel_on_signal(token: tokio_util::sync::CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown().await {
            tracing::warn!(error = %e, "shutdown: signal handler failed; falling back to ctrl_c()");
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("shutdown: signal received");
        token.cancel();
    });
}
