//! ServerHandler implementation for the SQLite MCP Server.
//!
//! This module implements the rmcp `ServerHandler` trait which defines how
//! the server responds to MCP protocol requests.

use crate::prompts::{build_prompt_list, get_prompt};
use crate::resources::{build_resource_list, build_resource_templates, read_resource};
use crate::server::SqliteMcpServer;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
    ListResourceTemplatesResult, ListResourcesResult, PaginatedRequestParam, ProtocolVersion,
    ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool_handler, ErrorData};

/// The `#[tool_handler]` macro wires up tool routing automatically.
/// It generates the `list_tools` and `call_tool` method implementations.
#[tool_handler]
impl ServerHandler for SqliteMcpServer {
    /// Server identification - called during initialization handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,

            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),

            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("SQLite MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },

            instructions: Some(build_instructions(self)),
        }
    }

    /// List available resources.
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: build_resource_list(),
            next_cursor: None,
            meta: None,
        })
    }

    /// List resource templates for dynamic resources.
    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult {
            resource_templates: build_resource_templates(),
            next_cursor: None,
            meta: None,
        })
    }

    /// Read a specific resource.
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        read_resource(self, &request.uri)
            .await
            .map_err(|e| ErrorData::invalid_params(e, None))
    }

    /// List available prompts.
    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult {
            prompts: build_prompt_list(),
            next_cursor: None,
            meta: None,
        })
    }

    /// Get a specific prompt.
    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        // Convert Map<String, Value> to HashMap<String, String>
        let arguments: Option<std::collections::HashMap<String, String>> =
            request.arguments.map(|map| {
                map.into_iter()
                    .map(|(k, v)| match v {
                        serde_json::Value::String(s) => (k, s),
                        other => (k, other.to_string()),
                    })
                    .collect()
            });

        get_prompt(self, &request.name, arguments.as_ref())
            .await
            .map_err(|e| ErrorData::invalid_params(e, None))
    }
}

/// Build server instructions for the initialization handshake.
fn build_instructions(server: &SqliteMcpServer) -> String {
    let mut instructions = String::new();

    instructions.push_str("# SQLite MCP Server\n\n");
    instructions.push_str(&format!(
        "This server provides access to the SQLite database at `{}`.\n\n",
        server.config.database.path.display()
    ));

    instructions.push_str("## Available Operations\n\n");
    instructions.push_str("### Resources (read-only metadata)\n");
    instructions.push_str("- `sqlite://schema` for full table definitions\n");
    instructions.push_str("- `sqlite://tables` and `sqlite://tables/{table}` for structure\n\n");

    instructions.push_str("### Tools\n");
    instructions.push_str("- `query` runs read-only SQL; `execute` runs mutations\n");
    instructions
        .push_str("- Structured tools (`insert-record`, `update-record`, ...) bind values safely\n");
    instructions.push_str("- `transaction` runs an ordered batch atomically\n");
    instructions.push_str(
        "- PRAGMA (beyond table_info/schema_version/user_version) and ATTACH/DETACH are rejected\n",
    );

    instructions.push_str("\n### Best Practices\n");
    instructions.push_str("1. Explore the schema via resources before writing queries\n");
    instructions.push_str("2. Prefer structured tools over hand-built INSERT/UPDATE text\n");
    instructions.push_str("3. Group dependent mutations into a single `transaction` call\n");

    instructions
}
