//! Schema introspection shared by tools, resources, and prompts.
//!
//! These are trusted, internally-built statements; they do not pass through
//! the caller-SQL classification gate. Identifiers supplied by callers are
//! still validated and quoted before interpolation.

use crate::database::executor::query_rows;
use crate::database::ConnectionManager;
use crate::error::ServerError;
use crate::security::safe_identifier;
use serde_json::{json, Value as JsonValue};

/// Read-only schema metadata queries.
#[derive(Clone)]
pub struct SchemaIntrospector {
    manager: ConnectionManager,
}

impl SchemaIntrospector {
    /// Create a new introspector.
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// Names of all user tables, sorted.
    pub async fn table_names(&self) -> Result<Vec<String>, ServerError> {
        self.manager
            .with_connection(|conn| {
                let rows = query_rows(
                    conn,
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                    &[],
                    usize::MAX,
                )?;
                Ok(rows
                    .rows
                    .iter()
                    .filter_map(|row| row.get("name").and_then(|v| v.as_str()).map(String::from))
                    .collect())
            })
            .await
    }

    /// Name and full CREATE definition for every user table.
    pub async fn schema_dump(&self) -> Result<JsonValue, ServerError> {
        self.manager
            .with_connection(|conn| {
                let rows = query_rows(
                    conn,
                    "SELECT name, sql FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                    &[],
                    usize::MAX,
                )?;
                Ok(JsonValue::Array(
                    rows.rows.into_iter().map(JsonValue::Object).collect(),
                ))
            })
            .await
    }

    /// Columns, indexes, and foreign keys for one table.
    ///
    /// Fails with `InvalidInput` if the table does not exist.
    pub async fn table_detail(&self, table_name: &str) -> Result<JsonValue, ServerError> {
        let table = safe_identifier(table_name)?;
        let display_name = table_name.to_string();

        self.manager
            .with_connection(move |conn| {
                let columns =
                    query_rows(conn, &format!("PRAGMA table_info({table})"), &[], usize::MAX)?;
                if columns.rows.is_empty() {
                    return Err(ServerError::invalid_input(format!(
                        "table not found: {display_name}"
                    )));
                }
                let indexes =
                    query_rows(conn, &format!("PRAGMA index_list({table})"), &[], usize::MAX)?;
                let foreign_keys = query_rows(
                    conn,
                    &format!("PRAGMA foreign_key_list({table})"),
                    &[],
                    usize::MAX,
                )?;

                Ok(json!({
                    "table": display_name,
                    "columns": columns.rows,
                    "indexes": indexes.rows,
                    "foreignKeys": foreign_keys.rows,
                }))
            })
            .await
    }

    /// A handful of rows from a table, for prompt context.
    pub async fn sample_rows(
        &self,
        table_name: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Map<String, JsonValue>>, ServerError> {
        let table = safe_identifier(table_name)?;
        self.manager
            .with_connection(move |conn| {
                let rows = query_rows(
                    conn,
                    &format!("SELECT * FROM {table} LIMIT {limit}"),
                    &[],
                    limit,
                )?;
                Ok(rows.rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn introspector(dir: &tempfile::TempDir) -> SchemaIntrospector {
        let manager = ConnectionManager::new(DatabaseConfig {
            path: dir.path().join("test.db"),
            ..DatabaseConfig::default()
        });
        manager
            .with_connection(|conn| {
                conn.execute_batch(
                    "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
                     CREATE TABLE orders (
                         id INTEGER PRIMARY KEY,
                         user_id INTEGER REFERENCES users(id)
                     );
                     CREATE INDEX idx_orders_user ON orders(user_id);",
                )?;
                Ok(())
            })
            .await
            .unwrap();
        SchemaIntrospector::new(manager)
    }

    #[tokio::test]
    async fn test_table_names_excludes_system_tables() {
        let dir = tempfile::tempdir().unwrap();
        let i = introspector(&dir).await;
        assert_eq!(i.table_names().await.unwrap(), vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn test_schema_dump_includes_create_sql() {
        let dir = tempfile::tempdir().unwrap();
        let i = introspector(&dir).await;
        let dump = i.schema_dump().await.unwrap();
        let entries = dump.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[1]["sql"]
            .as_str()
            .unwrap()
            .contains("CREATE TABLE users"));
    }

    #[tokio::test]
    async fn test_table_detail() {
        let dir = tempfile::tempdir().unwrap();
        let i = introspector(&dir).await;

        let detail = i.table_detail("orders").await.unwrap();
        assert_eq!(detail["columns"].as_array().unwrap().len(), 2);
        assert_eq!(detail["indexes"].as_array().unwrap().len(), 1);
        assert_eq!(detail["foreignKeys"].as_array().unwrap().len(), 1);

        assert!(matches!(
            i.table_detail("missing").await.unwrap_err(),
            ServerError::InvalidInput(_)
        ));
        assert!(i.table_detail("users; DROP TABLE users").await.is_err());
    }

    #[tokio::test]
    async fn test_sample_rows_limit() {
        let dir = tempfile::tempdir().unwrap();
        let i = introspector(&dir).await;
        for n in 0..5 {
            i.manager
                .with_connection(|conn| {
                    conn.execute("INSERT INTO users (name) VALUES (?1)", [format!("u{n}")])?;
                    Ok(())
                })
                .await
                .unwrap();
        }
        let rows = i.sample_rows("users", 3).await.unwrap();
        assert_eq!(rows.len(), 3);
    }
}
