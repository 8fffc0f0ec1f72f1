//! Statement execution and result shaping.
//!
//! The executor turns validated SQL text into either a row set
//! (prepare-then-all) or a change summary (prepare-then-run), binding
//! parameters positionally. Positional binding is the only injection defense
//! for values; identifiers are interpolated by the builders and are handled
//! in `security::identifiers`.

use crate::database::ConnectionManager;
use crate::error::ServerError;
use crate::security::{StatementValidator, Verdict};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::debug;

/// Permission mode of the calling entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// The caller may only run read-only statements.
    ReadOnly,

    /// The caller accepts any non-rejected statement.
    Mutating,
}

/// Rows returned by a read statement.
///
/// Each row is a column-name → value map preserving the driver's column
/// order; rows appear in driver-returned order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, JsonValue>>,
    pub truncated: bool,
}

/// Change summary for a mutating statement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub rows_affected: usize,

    /// Engine-assigned rowid, present for INSERT statements only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_insert_rowid: Option<i64>,
}

/// Result of executing one statement.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Rows(RowSet),
    Change(ChangeSummary),
}

/// Executes validated statements against the shared connection.
#[derive(Clone)]
pub struct StatementExecutor {
    manager: ConnectionManager,
    validator: Arc<StatementValidator>,
    max_rows: usize,
}

impl StatementExecutor {
    /// Create a new executor.
    pub fn new(
        manager: ConnectionManager,
        validator: Arc<StatementValidator>,
        max_rows: usize,
    ) -> Self {
        Self {
            manager,
            validator,
            max_rows,
        }
    }

    /// Classify and execute a statement.
    ///
    /// In `ReadOnly` mode a `Mutating` verdict is refused with
    /// `OperationNotAllowed` before the driver is touched. In `Mutating`
    /// mode the verdict decides the execution primitive: read-only text runs
    /// prepare-then-all and returns rows, everything else runs
    /// prepare-then-run and returns a change summary.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[JsonValue],
        mode: AccessMode,
    ) -> Result<ExecutionResult, ServerError> {
        let verdict = self.validator.classify(sql)?;

        if mode == AccessMode::ReadOnly && verdict == Verdict::Mutating {
            return Err(ServerError::not_allowed(
                "only read-only statements are permitted here; use the execute tool for mutations",
            ));
        }

        debug!("Executing {:?} statement ({} params)", verdict, params.len());

        let max_rows = self.max_rows;
        match verdict {
            Verdict::ReadOnly => self
                .manager
                .with_connection(|conn| query_rows(conn, sql, params, max_rows))
                .await
                .map(ExecutionResult::Rows),
            Verdict::Mutating => self
                .manager
                .with_connection(|conn| run_change(conn, sql, params))
                .await
                .map(ExecutionResult::Change),
        }
    }
}

/// Run a read statement, collecting up to `max_rows` rows.
pub(crate) fn query_rows(
    conn: &Connection,
    sql: &str,
    params: &[JsonValue],
    max_rows: usize,
) -> Result<RowSet, ServerError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let bound: Vec<SqlValue> = params.iter().map(bind_value).collect();
    let mut driver_rows = stmt.query(rusqlite::params_from_iter(bound))?;

    let mut rows = Vec::new();
    let mut truncated = false;
    while let Some(row) = driver_rows.next()? {
        if rows.len() >= max_rows {
            truncated = true;
            break;
        }
        let mut map = Map::new();
        for (i, name) in columns.iter().enumerate() {
            let value: SqlValue = row.get(i)?;
            map.insert(name.clone(), sqlite_to_json(value));
        }
        rows.push(map);
    }

    Ok(RowSet {
        columns,
        rows,
        truncated,
    })
}

/// Run a mutating statement, returning its change summary.
pub(crate) fn run_change(
    conn: &Connection,
    sql: &str,
    params: &[JsonValue],
) -> Result<ChangeSummary, ServerError> {
    let mut stmt = conn.prepare(sql)?;
    let bound: Vec<SqlValue> = params.iter().map(bind_value).collect();
    let rows_affected = stmt.execute(rusqlite::params_from_iter(bound))?;

    let last_insert_rowid = if is_insert(sql) {
        Some(conn.last_insert_rowid())
    } else {
        None
    };

    Ok(ChangeSummary {
        rows_affected,
        last_insert_rowid,
    })
}

/// Whether a statement is an INSERT, for rowid reporting.
fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("insert"))
}

/// Convert a JSON parameter into a native SQLite value.
///
/// Arrays and objects bind as their JSON text.
pub(crate) fn bind_value(value: &JsonValue) -> SqlValue {
    match value {
        JsonValue::Null => SqlValue::Null,
        JsonValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => match n.as_f64() {
                Some(f) => SqlValue::Real(f),
                None => SqlValue::Text(n.to_string()),
            },
        },
        JsonValue::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Convert a SQLite value into JSON for the response payload.
fn sqlite_to_json(value: SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => JsonValue::Null,
        SqlValue::Integer(i) => JsonValue::from(i),
        SqlValue::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        SqlValue::Text(s) => JsonValue::String(s),
        SqlValue::Blob(b) => JsonValue::String(format!("<blob {} bytes>", b.len())),
    }
}
