//! MCP Tools for SQLite operations.
//!
//! Tools are action-oriented operations:
//!
//! - `query`: execute a read-only SQL statement
//! - `execute`: execute an arbitrary non-rejected SQL statement
//! - `describe-table`: column, index, and foreign-key details for a table
//! - `list-tables`: list user tables
//! - `create-table` / `drop-table`: structured DDL
//! - `insert-record` / `update-record` / `delete-record`: structured DML
//! - `transaction`: run an ordered statement batch atomically
//!
//! Operational failures return an error payload (`isError` flag) rather
//! than a protocol error, so the session stays usable.

mod inputs;

pub use inputs::*;

use crate::database::builder::{
    build_create_table, build_delete, build_drop_table, build_insert, build_update,
};
use crate::database::{AccessMode, ExecutionResult};
use crate::server::SqliteMcpServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::{tool, tool_router, ErrorData};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

/// Serialize a success payload as pretty JSON text.
fn json_payload(value: &impl Serialize) -> Result<CallToolResult, ErrorData> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => Ok(error_payload(format!("Failed to serialize result: {e}"))),
    }
}

/// Build an error payload with the `isError` flag set.
fn error_payload(message: impl std::fmt::Display) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Truncate SQL text for log lines.
fn truncate_for_log(sql: &str, max: usize) -> String {
    if sql.chars().count() <= max {
        sql.to_string()
    } else {
        let truncated: String = sql.chars().take(max).collect();
        format!("{truncated}...")
    }
}

#[tool_router(vis = "pub(crate)")]
impl SqliteMcpServer {
    // =========================================================================
    // Raw SQL Tools
    // =========================================================================

    /// Execute a read-only SQL statement.
    #[tool(
        name = "query",
        description = "Execute a read-only SQL query (SELECT, WITH ... SELECT, or an allow-listed PRAGMA read). Returns rows as JSON."
    )]
    pub async fn query(
        &self,
        Parameters(input): Parameters<QueryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!("query: {}", truncate_for_log(&input.sql, 100));

        match self
            .executor
            .execute(&input.sql, &[], AccessMode::ReadOnly)
            .await
        {
            Ok(ExecutionResult::Rows(rows)) => {
                if rows.truncated {
                    warn!(
                        "query result truncated at {} rows",
                        self.config.security.max_result_rows
                    );
                }
                json_payload(&rows.rows)
            }
            Ok(ExecutionResult::Change(_)) => {
                Ok(error_payload("read-only statement produced a change result"))
            }
            Err(e) => Ok(error_payload(e)),
        }
    }

    /// Execute an arbitrary SQL statement.
    #[tool(
        name = "execute",
        description = "Execute a SQL statement (INSERT, UPDATE, DELETE, CREATE, DROP, ALTER, ...). Returns the rows affected and, for inserts, the new rowid."
    )]
    pub async fn execute(
        &self,
        Parameters(input): Parameters<ExecuteInput>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!("execute: {}", truncate_for_log(&input.sql, 100));

        match self
            .executor
            .execute(&input.sql, &[], AccessMode::Mutating)
            .await
        {
            Ok(ExecutionResult::Rows(rows)) => json_payload(&rows.rows),
            Ok(ExecutionResult::Change(summary)) => json_payload(&summary),
            Err(e) => Ok(error_payload(e)),
        }
    }

    // =========================================================================
    // Schema Tools
    // =========================================================================

    /// Describe a table's columns, indexes, and foreign keys.
    #[tool(
        name = "describe-table",
        description = "Get column definitions, indexes, and foreign keys for a table."
    )]
    pub async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.metadata.table_detail(&input.table_name).await {
            Ok(detail) => json_payload(&detail),
            Err(e) => Ok(error_payload(e)),
        }
    }

    /// List user tables.
    #[tool(
        name = "list-tables",
        description = "List all user tables in the database as a JSON array of names."
    )]
    pub async fn list_tables(&self) -> Result<CallToolResult, ErrorData> {
        match self.metadata.table_names().await {
            Ok(names) => json_payload(&names),
            Err(e) => Ok(error_payload(e)),
        }
    }

    // =========================================================================
    // Structured Operation Tools
    // =========================================================================

    /// Create a table from column definitions.
    #[tool(
        name = "create-table",
        description = "Create a table from structured column definitions. IF NOT EXISTS is added by default."
    )]
    pub async fn create_table(
        &self,
        Parameters(input): Parameters<CreateTableInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let built = match build_create_table(&input.name, &input.columns, input.if_not_exists) {
            Ok(b) => b,
            Err(e) => return Ok(error_payload(e)),
        };

        match self
            .executor
            .execute(&built.sql, &built.params, AccessMode::Mutating)
            .await
        {
            Ok(_) => json_payload(&json!({
                "table": input.name,
                "message": format!("Table '{}' created", input.name),
            })),
            Err(e) => Ok(error_payload(e)),
        }
    }

    /// Drop a table.
    #[tool(
        name = "drop-table",
        description = "Drop a table. IF EXISTS is added by default."
    )]
    pub async fn drop_table(
        &self,
        Parameters(input): Parameters<DropTableInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let built = match build_drop_table(&input.name, input.if_exists) {
            Ok(b) => b,
            Err(e) => return Ok(error_payload(e)),
        };

        match self
            .executor
            .execute(&built.sql, &built.params, AccessMode::Mutating)
            .await
        {
            Ok(_) => json_payload(&json!({
                "table": input.name,
                "message": format!("Table '{}' dropped", input.name),
            })),
            Err(e) => Ok(error_payload(e)),
        }
    }

    /// Insert a record from a column → value map.
    #[tool(
        name = "insert-record",
        description = "Insert a record into a table from a column-to-value map. Values are bound as parameters."
    )]
    pub async fn insert_record(
        &self,
        Parameters(input): Parameters<InsertRecordInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let built = match build_insert(&input.table, &input.data) {
            Ok(b) => b,
            Err(e) => return Ok(error_payload(e)),
        };

        match self
            .executor
            .execute(&built.sql, &built.params, AccessMode::Mutating)
            .await
        {
            Ok(ExecutionResult::Change(summary)) => json_payload(&json!({
                "insertedId": summary.last_insert_rowid,
                "rowsAffected": summary.rows_affected,
            })),
            Ok(ExecutionResult::Rows(_)) => {
                Ok(error_payload("insert produced an unexpected row result"))
            }
            Err(e) => Ok(error_payload(e)),
        }
    }

    /// Update records matching a WHERE clause.
    #[tool(
        name = "update-record",
        description = "Update records in a table. SET values are bound as parameters; the WHERE clause is raw SQL text."
    )]
    pub async fn update_record(
        &self,
        Parameters(input): Parameters<UpdateRecordInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let built = match build_update(&input.table, &input.data, &input.where_clause) {
            Ok(b) => b,
            Err(e) => return Ok(error_payload(e)),
        };

        match self
            .executor
            .execute(&built.sql, &built.params, AccessMode::Mutating)
            .await
        {
            Ok(ExecutionResult::Change(summary)) => json_payload(&json!({
                "rowsAffected": summary.rows_affected,
            })),
            Ok(ExecutionResult::Rows(_)) => {
                Ok(error_payload("update produced an unexpected row result"))
            }
            Err(e) => Ok(error_payload(e)),
        }
    }

    /// Delete records matching a WHERE clause.
    #[tool(
        name = "delete-record",
        description = "Delete records from a table. The WHERE clause is raw SQL text."
    )]
    pub async fn delete_record(
        &self,
        Parameters(input): Parameters<DeleteRecordInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let built = match build_delete(&input.table, &input.where_clause) {
            Ok(b) => b,
            Err(e) => return Ok(error_payload(e)),
        };

        match self
            .executor
            .execute(&built.sql, &built.params, AccessMode::Mutating)
            .await
        {
            Ok(ExecutionResult::Change(summary)) => json_payload(&json!({
                "rowsAffected": summary.rows_affected,
            })),
            Ok(ExecutionResult::Rows(_)) => {
                Ok(error_payload("delete produced an unexpected row result"))
            }
            Err(e) => Ok(error_payload(e)),
        }
    }

    // =========================================================================
    // Transaction Tool
    // =========================================================================

    /// Run an ordered statement batch as one atomic unit.
    #[tool(
        name = "transaction",
        description = "Execute a list of SQL statements in order inside a single transaction. The whole batch rolls back on the first failure."
    )]
    pub async fn transaction(
        &self,
        Parameters(input): Parameters<TransactionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.coordinator.run_batch(&input.statements).await {
            Ok(summaries) => json_payload(&summaries),
            Err(e) => Ok(error_payload(e)),
        }
    }
}
