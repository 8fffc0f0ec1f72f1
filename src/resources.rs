//! MCP Resources for SQLite schema metadata.
//!
//! Resources provide passive read-only access to schema information.
//! Following MCP semantics, resources are like GET endpoints - they don't
//! modify data.
//!
//! ## URI Scheme
//!
//! Resources use the `sqlite://` URI scheme:
//!
//! - `sqlite://schema` - Name and full CREATE definition of every user table
//! - `sqlite://tables` - List of user table names
//! - `sqlite://tables/{table}` - Column, index, and foreign-key details

use crate::server::SqliteMcpServer;
use rmcp::model::{
    AnnotateAble, RawResource, RawResourceTemplate, ReadResourceResult, Resource,
    ResourceContents, ResourceTemplate,
};

/// Build the list of available resources.
pub fn build_resource_list() -> Vec<Resource> {
    vec![
        create_resource(
            "sqlite://schema",
            "Database Schema",
            "Name and full CREATE TABLE definition for every user table",
            "application/json",
        ),
        create_resource(
            "sqlite://tables",
            "Tables",
            "List of all user tables in the database",
            "application/json",
        ),
    ]
}

/// Build resource templates for dynamic resources.
pub fn build_resource_templates() -> Vec<ResourceTemplate> {
    vec![create_resource_template(
        "sqlite://tables/{table}",
        "Table Details",
        "Columns, indexes, and foreign keys for a specific table",
        "application/json",
    )]
}

/// Read a resource by URI.
pub async fn read_resource(
    server: &SqliteMcpServer,
    uri: &str,
) -> Result<ReadResourceResult, String> {
    let parsed = parse_resource_uri(uri)?;

    let content = match parsed {
        ResourceUri::Schema => {
            let dump = server.metadata.schema_dump().await.map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&dump).map_err(|e| e.to_string())?
        }
        ResourceUri::Tables => {
            let names = server.metadata.table_names().await.map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&names).map_err(|e| e.to_string())?
        }
        ResourceUri::TableDetail { table } => {
            let detail = server
                .metadata
                .table_detail(&table)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&detail).map_err(|e| e.to_string())?
        }
    };

    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(content, uri.to_string())],
    })
}

// =========================================================================
// Resource URI Parsing
// =========================================================================

/// Parsed resource URI variants.
#[derive(Debug, PartialEq)]
enum ResourceUri {
    Schema,
    Tables,
    TableDetail { table: String },
}

/// Parse a `sqlite://` resource URI.
fn parse_resource_uri(uri: &str) -> Result<ResourceUri, String> {
    let path = uri
        .strip_prefix("sqlite://")
        .ok_or_else(|| format!("Unknown resource URI scheme: {uri}"))?;

    match path {
        "schema" => Ok(ResourceUri::Schema),
        "tables" => Ok(ResourceUri::Tables),
        _ => match path.strip_prefix("tables/") {
            Some(table) if !table.is_empty() && !table.contains('/') => {
                Ok(ResourceUri::TableDetail {
                    table: table.to_string(),
                })
            }
            _ => Err(format!("Unknown resource URI: {uri}")),
        },
    }
}

// =========================================================================
// Resource Constructors
// =========================================================================

/// Create a resource definition.
fn create_resource(uri: &str, name: &str, description: &str, mime_type: &str) -> Resource {
    let mut resource = RawResource::new(uri, name);
    resource.description = Some(description.to_string());
    resource.mime_type = Some(mime_type.to_string());
    resource.no_annotation()
}

/// Create a resource template definition.
fn create_resource_template(
    uri_template: &str,
    name: &str,
    description: &str,
    mime_type: &str,
) -> ResourceTemplate {
    RawResourceTemplate {
        uri_template: uri_template.to_string(),
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        mime_type: Some(mime_type.to_string()),
        icons: None,
    }
    .no_annotation()
}
