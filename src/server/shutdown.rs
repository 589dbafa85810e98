use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;

pub struct ShutdownManager {
    shutdown: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Resolve on Ctrl-C, SIGTERM or [`ShutdownManager::signal_shutdown`].
    pub async fn wait_for_shutdown(&self) -> std::io::Result<()> {
        // Register before checking the flag so a concurrent signal is not lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_shutting_down() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
                _ = notified => {},
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = notified => {},
            }
        }

        self.shutdown.store(true, Ordering::SeqCst);
        tracing::info!("Shutting down gracefully...");
        Ok(())
    }

    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_before_wait_returns_immediately() {
        let manager = ShutdownManager::new();
        manager.signal_shutdown();
        tokio::time::timeout(Duration::from_secs(1), manager.wait_for_shutdown())
            .await
            .expect("wait_for_shutdown should not block")
            .unwrap();
        assert!(manager.is_shutting_down());
    }

    #[tokio::test]
    async fn test_signal_wakes_waiter() {
        let manager = Arc::new(ShutdownManager::new());
        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.wait_for_shutdown().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.signal_shutdown();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap()
            .unwrap();
    }
}
