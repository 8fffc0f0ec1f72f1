//! Structured-operation SQL synthesis.
//!
//! Each builder turns a typed request into exactly one SQL statement plus
//! its positional parameters. Table and column names are validated and
//! quoted through `security::identifiers`; WHERE-clause text is passed
//! through raw, as documented in the tool contract.

use crate::error::ServerError;
use crate::security::safe_identifier;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// Column definition for `create-table`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Column name
    pub name: String,

    /// SQLite type affinity, e.g. INTEGER, TEXT, REAL, BLOB
    #[serde(rename = "type")]
    pub data_type: String,

    /// Mark this column PRIMARY KEY
    #[serde(default)]
    pub primary_key: bool,

    /// Add a NOT NULL constraint
    #[serde(default)]
    pub not_null: bool,

    /// Add a UNIQUE constraint
    #[serde(default)]
    pub unique: bool,

    /// DEFAULT value for the column
    #[serde(default)]
    pub default: Option<JsonValue>,
}

/// A synthesized statement with its bound values.
#[derive(Debug, Clone)]
pub struct BuiltStatement {
    pub sql: String,
    pub params: Vec<JsonValue>,
}

impl BuiltStatement {
    fn without_params(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

/// Build a CREATE TABLE statement.
///
/// Column flags are emitted in fixed order: PRIMARY KEY, NOT NULL, UNIQUE,
/// DEFAULT.
pub fn build_create_table(
    name: &str,
    columns: &[ColumnSpec],
    if_not_exists: bool,
) -> Result<BuiltStatement, ServerError> {
    if columns.is_empty() {
        return Err(ServerError::invalid_input(
            "create-table requires at least one column",
        ));
    }

    let table = safe_identifier(name)?;

    let mut clauses = Vec::with_capacity(columns.len());
    for column in columns {
        let data_type = valid_type(&column.data_type)?;
        let mut clause = format!("{} {}", safe_identifier(&column.name)?, data_type);
        if column.primary_key {
            clause.push_str(" PRIMARY KEY");
        }
        if column.not_null {
            clause.push_str(" NOT NULL");
        }
        if column.unique {
            clause.push_str(" UNIQUE");
        }
        if let Some(default) = &column.default {
            clause.push_str(" DEFAULT ");
            clause.push_str(&literal(default));
        }
        clauses.push(clause);
    }

    let exists = if if_not_exists { "IF NOT EXISTS " } else { "" };
    Ok(BuiltStatement::without_params(format!(
        "CREATE TABLE {}{} ({})",
        exists,
        table,
        clauses.join(", ")
    )))
}

/// Build a DROP TABLE statement.
pub fn build_drop_table(name: &str, if_exists: bool) -> Result<BuiltStatement, ServerError> {
    let table = safe_identifier(name)?;
    let exists = if if_exists { "IF EXISTS " } else { "" };
    Ok(BuiltStatement::without_params(format!(
        "DROP TABLE {}{}",
        exists, table
    )))
}

/// Build an INSERT statement with positional placeholders.
///
/// Column order follows the insertion order of the data map.
pub fn build_insert(
    table: &str,
    data: &Map<String, JsonValue>,
) -> Result<BuiltStatement, ServerError> {
    if data.is_empty() {
        return Err(ServerError::invalid_input(
            "insert-record requires at least one column value",
        ));
    }

    let table = safe_identifier(table)?;

    let mut columns = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (column, value) in data {
        columns.push(safe_identifier(column)?);
        params.push(value.clone());
    }

    let placeholders = vec!["?"; params.len()].join(", ");
    Ok(BuiltStatement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ),
        params,
    })
}

/// Build an UPDATE statement.
///
/// SET assignments use positional placeholders; the WHERE text is the
/// caller's, interpolated raw.
pub fn build_update(
    table: &str,
    data: &Map<String, JsonValue>,
    where_clause: &str,
) -> Result<BuiltStatement, ServerError> {
    if data.is_empty() {
        return Err(ServerError::invalid_input(
            "update-record requires at least one column value",
        ));
    }
    let where_clause = require_where(where_clause)?;

    let table = safe_identifier(table)?;

    let mut assignments = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (column, value) in data {
        assignments.push(format!("{} = ?", safe_identifier(column)?));
        params.push(value.clone());
    }

    Ok(BuiltStatement {
        sql: format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments.join(", "),
            where_clause
        ),
        params,
    })
}

/// Build a DELETE statement with raw WHERE text.
pub fn build_delete(table: &str, where_clause: &str) -> Result<BuiltStatement, ServerError> {
    let where_clause = require_where(where_clause)?;
    let table = safe_identifier(table)?;
    Ok(BuiltStatement::without_params(format!(
        "DELETE FROM {} WHERE {}",
        table, where_clause
    )))
}

/// Validate a column type expression.
///
/// Type expressions like `VARCHAR(30)` or `UNSIGNED BIG INT` are allowed;
/// anything with quoting or statement separators is not.
fn valid_type(data_type: &str) -> Result<&str, ServerError> {
    let trimmed = data_type.trim();
    if trimmed.is_empty() {
        return Err(ServerError::invalid_input("column type cannot be empty"));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ',')))
    {
        return Err(ServerError::invalid_input(format!(
            "column type '{}' contains forbidden character '{}'",
            trimmed, bad
        )));
    }
    Ok(trimmed)
}

/// Reject empty WHERE text before it turns into a driver syntax error.
fn require_where(where_clause: &str) -> Result<&str, ServerError> {
    let trimmed = where_clause.trim();
    if trimmed.is_empty() {
        return Err(ServerError::invalid_input("a WHERE clause is required"));
    }
    Ok(trimmed)
}

/// Render a JSON value as a SQL literal for DEFAULT clauses.
fn literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(name: &str, data_type: &str) -> ColumnSpec {
        ColumnSpec {
            name: name.to_string(),
            data_type: data_type.to_string(),
            primary_key: false,
            not_null: false,
            unique: false,
            default: None,
        }
    }

    fn data(pairs: &[(&str, JsonValue)]) -> Map<String, JsonValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_create_table_flag_order() {
        let mut id = column("id", "INTEGER");
        id.primary_key = true;
        let mut name = column("name", "TEXT");
        name.not_null = true;
        name.unique = true;
        name.default = Some(json!("anon"));

        let built = build_create_table("users", &[id, name], true).unwrap();
        assert_eq!(
            built.sql,
            "CREATE TABLE IF NOT EXISTS \"users\" (\"id\" INTEGER PRIMARY KEY, \
             \"name\" TEXT NOT NULL UNIQUE DEFAULT 'anon')"
        );
        assert!(built.params.is_empty());
    }

    #[test]
    fn test_create_table_without_if_not_exists() {
        let built = build_create_table("t", &[column("a", "TEXT")], false).unwrap();
        assert_eq!(built.sql, "CREATE TABLE \"t\" (\"a\" TEXT)");
    }

    #[test]
    fn test_create_table_rejects_bad_identifier() {
        let err = build_create_table("users; DROP TABLE x", &[column("a", "TEXT")], true);
        assert!(err.is_err());

        let err = build_create_table("users", &[column("a\"b", "TEXT")], true);
        assert!(err.is_err());
    }

    #[test]
    fn test_create_table_rejects_bad_type() {
        let bad = column("a", "INTEGER); DROP TABLE x; --");
        assert!(build_create_table("t", &[bad], true).is_err());

        let parens = column("a", "VARCHAR(30)");
        assert!(build_create_table("t", &[parens], true).is_ok());
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            build_drop_table("t", true).unwrap().sql,
            "DROP TABLE IF EXISTS \"t\""
        );
        assert_eq!(build_drop_table("t", false).unwrap().sql, "DROP TABLE \"t\"");
    }

    #[test]
    fn test_insert_uses_map_order() {
        let built =
            build_insert("t", &data(&[("b", json!("x")), ("a", json!(1))])).unwrap();
        assert_eq!(built.sql, "INSERT INTO \"t\" (\"b\", \"a\") VALUES (?, ?)");
        assert_eq!(built.params, vec![json!("x"), json!(1)]);
    }

    #[test]
    fn test_insert_requires_data() {
        assert!(build_insert("t", &Map::new()).is_err());
    }

    #[test]
    fn test_update_concatenates_raw_where() {
        let built = build_update(
            "t",
            &data(&[("a", json!(2))]),
            "id = 1 AND name = 'x'",
        )
        .unwrap();
        assert_eq!(
            built.sql,
            "UPDATE \"t\" SET \"a\" = ? WHERE id = 1 AND name = 'x'"
        );
        assert_eq!(built.params, vec![json!(2)]);
    }

    #[test]
    fn test_update_requires_where() {
        assert!(build_update("t", &data(&[("a", json!(1))]), "  ").is_err());
    }

    #[test]
    fn test_delete() {
        let built = build_delete("t", "id = 3").unwrap();
        assert_eq!(built.sql, "DELETE FROM \"t\" WHERE id = 3");
        assert!(build_delete("t", "").is_err());
    }

    #[test]
    fn test_default_literals() {
        assert_eq!(literal(&json!(null)), "NULL");
        assert_eq!(literal(&json!(true)), "1");
        assert_eq!(literal(&json!(2.5)), "2.5");
        assert_eq!(literal(&json!("it's")), "'it''s'");
    }
}
