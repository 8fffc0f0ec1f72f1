//! MCP Prompts for AI-assisted SQL operations.
//!
//! Prompts are templates that help LLMs write contextually-aware SQL by
//! embedding live schema information. They perform no mutation; failures
//! reading schema are embedded in the returned message text.

use crate::server::SqliteMcpServer;
use rmcp::model::{
    GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageContent,
    PromptMessageRole,
};
use std::collections::HashMap;

/// How many sample rows to embed in schema-aware prompts.
const SAMPLE_ROW_LIMIT: usize = 5;

/// Create a prompt argument helper.
fn prompt_arg(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(required),
    }
}

/// Create a prompt helper.
fn prompt(name: &str, description: &str, arguments: Vec<PromptArgument>) -> Prompt {
    Prompt {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        arguments: Some(arguments),
        icons: None,
        meta: None,
    }
}

/// Build the list of available prompts.
pub fn build_prompt_list() -> Vec<Prompt> {
    vec![
        prompt(
            "analyze-schema",
            "Analyze the database schema and suggest improvements",
            vec![],
        ),
        prompt(
            "generate-query",
            "Generate a SQL query from a natural-language description",
            vec![
                prompt_arg("description", "What the query should do", true),
                prompt_arg("table", "Focus table (optional)", false),
            ],
        ),
        prompt(
            "optimize-query",
            "Analyze a SQL query and suggest optimizations",
            vec![prompt_arg("query", "SQL query to optimize", true)],
        ),
    ]
}

/// Get a specific prompt with arguments filled in.
pub async fn get_prompt(
    server: &SqliteMcpServer,
    name: &str,
    arguments: Option<&HashMap<String, String>>,
) -> Result<GetPromptResult, String> {
    let args = arguments.cloned().unwrap_or_default();

    match name {
        "analyze-schema" => Ok(analyze_schema_prompt(server).await),
        "generate-query" => generate_query_prompt(server, &args).await,
        "optimize-query" => optimize_query_prompt(server, &args).await,
        _ => Err(format!("Unknown prompt: {name}")),
    }
}

/// Wrap prompt text into the single-user-message result shape.
fn user_message(description: &str, text: String) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.to_string()),
        messages: vec![PromptMessage {
            role: PromptMessageRole::User,
            content: PromptMessageContent::text(text),
        }],
    }
}

/// Render the schema dump, embedding any read error in the text.
async fn schema_section(server: &SqliteMcpServer) -> String {
    match server.metadata.schema_dump().await {
        Ok(dump) => serde_json::to_string_pretty(&dump)
            .unwrap_or_else(|e| format!("<failed to render schema: {e}>")),
        Err(e) => format!("<failed to read schema: {e}>"),
    }
}

async fn analyze_schema_prompt(server: &SqliteMcpServer) -> GetPromptResult {
    let schema = schema_section(server).await;

    let text = format!(
        r#"Analyze the following SQLite database schema.

## Schema

{schema}

## Instructions

- Describe the purpose of each table and how the tables relate
- Point out missing indexes, missing NOT NULL constraints, or missing foreign keys
- Suggest normalization improvements where appropriate
- Note any SQLite-specific concerns (type affinity, rowid usage)
"#
    );

    user_message("Database schema analysis", text)
}

async fn generate_query_prompt(
    server: &SqliteMcpServer,
    args: &HashMap<String, String>,
) -> Result<GetPromptResult, String> {
    let description = args
        .get("description")
        .ok_or("Missing required argument: description")?;
    let table = args.get("table");

    let schema = schema_section(server).await;

    let mut text = format!(
        r#"Write a SQLite query for the following request.

## Request

{description}

## Schema

{schema}
"#
    );

    if let Some(table) = table {
        match server.metadata.sample_rows(table, SAMPLE_ROW_LIMIT).await {
            Ok(rows) => {
                let sample = serde_json::to_string_pretty(&rows)
                    .unwrap_or_else(|e| format!("<failed to render sample: {e}>"));
                text.push_str(&format!("\n## Sample rows from {table}\n\n{sample}\n"));
            }
            Err(e) => {
                text.push_str(&format!("\n## Sample rows from {table}\n\n<{e}>\n"));
            }
        }
    }

    text.push_str(
        r#"
## Guidelines

- Use only tables and columns that exist in the schema above
- Quote identifiers with double quotes if they need quoting
- Prefer explicit column lists over SELECT *
"#,
    );

    Ok(user_message("SQL query generation", text))
}

async fn optimize_query_prompt(
    server: &SqliteMcpServer,
    args: &HashMap<String, String>,
) -> Result<GetPromptResult, String> {
    let query = args.get("query").ok_or("Missing required argument: query")?;

    let schema = schema_section(server).await;

    let text = format!(
        r#"Optimize the following SQLite query.

## Query

{query}

## Schema

{schema}

## Instructions

- Identify full table scans that an index could avoid
- Suggest concrete CREATE INDEX statements where they would help
- Point out non-sargable predicates and how to rewrite them
- Consider EXPLAIN QUERY PLAN output the user could collect
"#
    );

    Ok(user_message("SQL query optimization", text))
}
