//! Database connection management.
//!
//! The server owns exactly one connection to the configured database file.
//! It is opened lazily on first use and cached for the process lifetime;
//! a failed open is fatal to the triggering operation only, and the next
//! operation retries from scratch. The shutdown sequence closes the handle
//! explicitly rather than relying on signal-time cleanup alone.

use crate::config::DatabaseConfig;
use crate::error::ServerError;
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owner of the process-wide database handle.
///
/// Cloning shares the underlying handle. All access goes through
/// [`ConnectionManager::with_connection`], which serializes statements on an
/// async mutex: at most one statement is in flight at a time.
#[derive(Clone)]
pub struct ConnectionManager {
    config: Arc<DatabaseConfig>,
    handle: Arc<Mutex<Option<Connection>>>,
}

impl ConnectionManager {
    /// Create a manager for the given database configuration.
    ///
    /// No connection is opened until the first operation needs one.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config: Arc::new(config),
            handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a closure against the database connection, opening it first if
    /// necessary.
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        let mut guard = self.handle.lock().await;

        if guard.is_none() {
            *guard = Some(self.open()?);
        }

        let conn = guard
            .as_mut()
            .ok_or_else(|| ServerError::internal("connection unavailable after open"))?;

        f(conn)
    }

    /// Close the connection if open. Called from the shutdown sequence.
    pub async fn close(&self) {
        let mut guard = self.handle.lock().await;
        if let Some(conn) = guard.take() {
            match conn.close() {
                Ok(()) => info!("Database connection closed"),
                Err((_, e)) => warn!("Failed to close database connection cleanly: {}", e),
            }
        }
    }

    /// Whether a connection is currently open.
    pub async fn is_open(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Open the database file and apply the fixed connection configuration.
    fn open(&self) -> Result<Connection, ServerError> {
        let path = &self.config.path;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ServerError::connection_with_source(
                        format!("failed to create parent directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| {
            ServerError::connection_with_source(
                format!("failed to open database file {}", path.display()),
                e,
            )
        })?;

        // Write-ahead log with NORMAL durability, a large page cache, and
        // in-memory temp tables. synchronous=1 is NORMAL, temp_store=2 is
        // MEMORY.
        conn.pragma_update(None, "journal_mode", "wal")?;
        conn.pragma_update(None, "synchronous", 1)?;
        conn.pragma_update(None, "cache_size", -self.config.cache_size_kib)?;
        conn.pragma_update(None, "temp_store", 2)?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;

        debug!("Opened database at {}", path.display());
        Ok(conn)
    }
}
