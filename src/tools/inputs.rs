//! Typed input structs for MCP tools.
//!
//! Field names follow the wire contract (camelCase); schemars derives the
//! JSON schema advertised to clients.

use crate::database::ColumnSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

fn default_true() -> bool {
    true
}

/// Input for the `query` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryInput {
    /// SQL SELECT (or allow-listed PRAGMA read) to execute
    pub sql: String,
}

/// Input for the `execute` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteInput {
    /// SQL statement to execute (INSERT, UPDATE, DELETE, CREATE, ...)
    pub sql: String,
}

/// Input for the `describe-table` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DescribeTableInput {
    /// Name of the table to describe
    pub table_name: String,
}

/// Input for the `create-table` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableInput {
    /// Table name
    pub name: String,

    /// Column definitions
    pub columns: Vec<ColumnSpec>,

    /// Add IF NOT EXISTS (default: true)
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
}

/// Input for the `drop-table` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DropTableInput {
    /// Table name
    pub name: String,

    /// Add IF EXISTS (default: true)
    #[serde(default = "default_true")]
    pub if_exists: bool,
}

/// Input for the `insert-record` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InsertRecordInput {
    /// Target table
    pub table: String,

    /// Column → value map; map order becomes column order
    pub data: Map<String, JsonValue>,
}

/// Input for the `update-record` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateRecordInput {
    /// Target table
    pub table: String,

    /// Column → value map for the SET clause
    pub data: Map<String, JsonValue>,

    /// Raw WHERE clause text (without the WHERE keyword)
    #[serde(rename = "where")]
    pub where_clause: String,
}

/// Input for the `delete-record` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteRecordInput {
    /// Target table
    pub table: String,

    /// Raw WHERE clause text (without the WHERE keyword)
    #[serde(rename = "where")]
    pub where_clause: String,
}

/// Input for the `transaction` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TransactionInput {
    /// SQL statements to execute in order as one atomic unit
    pub statements: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_table_defaults_if_not_exists() {
        let input: CreateTableInput = serde_json::from_value(json!({
            "name": "t",
            "columns": [{"name": "id", "type": "INTEGER", "primaryKey": true}],
        }))
        .unwrap();
        assert!(input.if_not_exists);
        assert!(input.columns[0].primary_key);
    }

    #[test]
    fn test_where_field_renames() {
        let input: DeleteRecordInput = serde_json::from_value(json!({
            "table": "t",
            "where": "id = 1",
        }))
        .unwrap();
        assert_eq!(input.where_clause, "id = 1");
    }

    #[test]
    fn test_insert_data_preserves_order() {
        let input: InsertRecordInput = serde_json::from_value(json!({
            "table": "t",
            "data": {"b": 1, "a": 2},
        }))
        .unwrap();
        let keys: Vec<&String> = input.data.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
