use tokio::{signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// What stopped the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    /// SIGINT (Ctrl+C)
    CtrlC,
    /// SIGTERM
    Terminate,
    /// Cancelled from code
    Manual,
}

/// Turns OS interrupt signals into a cancelled `CancellationToken`.
///
/// The executor watches the token, so a repeat loop ends between or during requests
/// instead of the process dying mid-write.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    token: CancellationToken,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to hand to anything that should stop on interrupt.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the token without a signal.
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("Interrupt manually triggered: {:?}", InterruptReason::Manual);
            self.token.cancel();
        }
    }

    /// Spawn a task waiting for Ctrl+C or SIGTERM. The task exits on its own once the
    /// token is cancelled by any other path.
    pub fn spawn_listener(&self) -> JoinHandle<Option<InterruptReason>> {
        let token = self.token.clone();
        tokio::spawn(async move {
            let reason = tokio::select! {
                _ = token.cancelled() => return None,
                result = signal::ctrl_c() => match result {
                    Ok(()) => InterruptReason::CtrlC,
                    Err(e) => {
                        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                        token.cancelled().await;
                        return None;
                    }
                },
                _ = wait_for_sigterm() => InterruptReason::Terminate,
            };

            tracing::info!("Received {:?}, stopping", reason);
            token.cancel();
            Some(reason)
        })
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    // Only Ctrl+C elsewhere
    std::future::pending::<()>().await;
}
