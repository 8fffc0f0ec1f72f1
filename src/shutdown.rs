//! Graceful shutdown handling.
//!
//! Connection release is bound to the shutdown sequence rather than raw
//! signal delivery: signals only flip the shutdown flag, and `main` runs
//! `graceful_shutdown` before exiting, which closes the database handle.

use crate::database::ConnectionManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Shutdown signal that can be awaited.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for the shutdown signal.
    pub async fn recv(&mut self) {
        let _ = self.receiver.wait_for(|&v| v).await;
    }

    /// Check if shutdown has been signaled without blocking.
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Controller for managing graceful shutdown.
pub struct ShutdownController {
    sender: watch::Sender<bool>,
    shutting_down: Arc<AtomicBool>,
}

impl ShutdownController {
    /// Create a new shutdown controller.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a shutdown signal receiver.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Check if shutdown is in progress.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Initiate shutdown. Idempotent.
    pub fn shutdown(&self) {
        if self
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Initiating graceful shutdown...");
            let _ = self.sender.send(true);
        }
    }

    /// Run the shutdown sequence: flag shutdown and release the database
    /// connection.
    pub async fn graceful_shutdown(&self, manager: &ConnectionManager) {
        self.shutdown();
        manager.close().await;
        info!("Shutdown complete");
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a shared shutdown controller.
pub fn new_shutdown_controller() -> Arc<ShutdownController> {
    Arc::new(ShutdownController::new())
}

/// Install SIGINT/SIGTERM handlers that trigger shutdown.
pub async fn install_signal_handlers(controller: Arc<ShutdownController>) {
    {
        let controller = controller.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("SIGINT received");
                controller.shutdown();
            }
        });
    }

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM received");
                controller.shutdown();
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    });

    #[cfg(not(unix))]
    drop(controller);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[tokio::test]
    async fn test_signal_fires_on_shutdown() {
        let controller = ShutdownController::new();
        let mut signal = controller.signal();

        assert!(!signal.is_shutdown());
        assert!(!controller.is_shutting_down());

        controller.shutdown();
        signal.recv().await;
        assert!(signal.is_shutdown());
        assert!(controller.is_shutting_down());
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.shutdown();
        assert!(controller.is_shutting_down());
    }

    #[tokio::test]
    async fn test_graceful_shutdown_closes_connection() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConnectionManager::new(DatabaseConfig {
            path: dir.path().join("test.db"),
            ..DatabaseConfig::default()
        });
        manager.with_connection(|_| Ok(())).await.unwrap();
        assert!(manager.is_open().await);

        let controller = ShutdownController::new();
        controller.graceful_shutdown(&manager).await;
        assert!(!manager.is_open().await);
    }
}
