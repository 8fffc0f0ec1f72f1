//! Atomic batch execution.
//!
//! A batch runs inside a single driver transaction. Statements execute
//! strictly in input order; the first rejected or failing statement aborts
//! the whole batch, and the driver's rollback discards everything already
//! applied. No partial results are ever returned.

use crate::database::executor::{run_change, ChangeSummary};
use crate::database::ConnectionManager;
use crate::error::ServerError;
use crate::security::StatementValidator;
use std::sync::Arc;
use tracing::debug;

/// Runs ordered statement batches as one atomic unit.
#[derive(Clone)]
pub struct TransactionCoordinator {
    manager: ConnectionManager,
    validator: Arc<StatementValidator>,
}

impl TransactionCoordinator {
    /// Create a new coordinator.
    pub fn new(manager: ConnectionManager, validator: Arc<StatementValidator>) -> Self {
        Self { manager, validator }
    }

    /// Execute the statements as one transaction.
    ///
    /// On success, returns one change summary per statement in input order.
    /// On the first invalid or failing statement, the transaction rolls back
    /// and a single `TransactionAborted` error names the statement and its
    /// 1-based position.
    pub async fn run_batch(
        &self,
        statements: &[String],
    ) -> Result<Vec<ChangeSummary>, ServerError> {
        if statements.is_empty() {
            return Err(ServerError::invalid_input(
                "transaction requires at least one statement",
            ));
        }

        debug!("Running transaction batch of {} statements", statements.len());

        let validator = self.validator.clone();
        self.manager
            .with_connection(|conn| {
                let tx = conn.transaction()?;

                let mut summaries = Vec::with_capacity(statements.len());
                for (i, sql) in statements.iter().enumerate() {
                    let aborted = |e: ServerError| ServerError::TransactionAborted {
                        index: i + 1,
                        statement: sql.clone(),
                        message: e.to_string(),
                    };

                    validator.classify(sql).map_err(aborted)?;
                    let summary = run_change(&tx, sql, &[]).map_err(aborted)?;
                    summaries.push(summary);
                }

                tx.commit()?;
                Ok(summaries)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn coordinator(dir: &tempfile::TempDir) -> (ConnectionManager, TransactionCoordinator) {
        let manager = ConnectionManager::new(DatabaseConfig {
            path: dir.path().join("test.db"),
            ..DatabaseConfig::default()
        });
        let coordinator = TransactionCoordinator::new(
            manager.clone(),
            Arc::new(StatementValidator::new(100_000)),
        );
        (manager, coordinator)
    }

    async fn row_count(manager: &ConnectionManager, table: &str) -> i64 {
        let sql = format!("SELECT count(*) FROM {}", table);
        manager
            .with_connection(|conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_batch_commits_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, c) = coordinator(&dir);

        let summaries = c
            .run_batch(&[
                "CREATE TABLE t (a INTEGER)".to_string(),
                "INSERT INTO t (a) VALUES (1)".to_string(),
                "INSERT INTO t (a) VALUES (2)".to_string(),
                "UPDATE t SET a = 3 WHERE a = 2".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[1].rows_affected, 1);
        assert!(summaries[1].last_insert_rowid.is_some());
        assert_eq!(summaries[3].rows_affected, 1);
        assert!(summaries[3].last_insert_rowid.is_none());
        assert_eq!(row_count(&manager, "t").await, 2);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, c) = coordinator(&dir);

        manager
            .with_connection(|conn| {
                conn.execute("CREATE TABLE t (a INTEGER)", [])?;
                Ok(())
            })
            .await
            .unwrap();

        let err = c
            .run_batch(&[
                "INSERT INTO t (a) VALUES (1)".to_string(),
                "INSERT INTO nonexistent_table (a) VALUES (1)".to_string(),
            ])
            .await
            .unwrap_err();

        match err {
            ServerError::TransactionAborted {
                index, statement, ..
            } => {
                assert_eq!(index, 2);
                assert!(statement.contains("nonexistent_table"));
            }
            other => panic!("expected TransactionAborted, got {other:?}"),
        }

        // The first insert was rolled back with the rest of the batch.
        assert_eq!(row_count(&manager, "t").await, 0);
    }

    #[tokio::test]
    async fn test_rejected_statement_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, c) = coordinator(&dir);

        manager
            .with_connection(|conn| {
                conn.execute("CREATE TABLE t (a INTEGER)", [])?;
                Ok(())
            })
            .await
            .unwrap();

        let err = c
            .run_batch(&[
                "INSERT INTO t (a) VALUES (1)".to_string(),
                "ATTACH DATABASE '/tmp/evil.db' AS evil".to_string(),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServerError::TransactionAborted { index: 2, .. }
        ));
        assert_eq!(row_count(&manager, "t").await, 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let (_, c) = coordinator(&dir);
        assert!(matches!(
            c.run_batch(&[]).await.unwrap_err(),
            ServerError::InvalidInput(_)
        ));
    }
}
