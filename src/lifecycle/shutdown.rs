//! Shutdown coordination.

use tokio::sync::broadcast;

/// Broadcasts a single stop request to every subscriber.
///
/// Long-running loops (the confirmation watcher) take `wait()` as their
/// cancellation future.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Future resolving once `trigger` is called.
    ///
    /// Subscribes immediately, so a trigger after this call is never missed.
    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    pub fn trigger(&self) {
        if self.tx.send(()).is_ok() {
            tracing::info!("Shutdown requested");
        }
    }

    /// Trigger on the first Ctrl-C.
    pub fn trigger_on_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => shutdown.trigger(),
                Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
            }
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_after_trigger() {
        let shutdown = Shutdown::new();
        let waiting = shutdown.wait();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .expect("wait should resolve");
    }

    #[tokio::test]
    async fn test_wait_pending_without_trigger() {
        let shutdown = Shutdown::new();
        let result = tokio::time::timeout(Duration::from_millis(50), shutdown.wait()).await;
        assert!(result.is_err());
    }
}
