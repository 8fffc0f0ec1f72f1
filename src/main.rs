//! SQLite MCP Server entry point.
//!
//! This binary starts the MCP server using stdio transport for integration
//! with Claude Desktop, Cursor, and other MCP clients.

use anyhow::Result;
use clap::Parser;
use rmcp::ServiceExt;
use sqlite_mcp_server::shutdown::{install_signal_handlers, new_shutdown_controller};
use sqlite_mcp_server::{CliArgs, Config, SqliteMcpServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Help/version short-circuit here, before any connection work.
    let args = CliArgs::parse();

    // Initialize logging to stderr (stdout is reserved for JSON-RPC)
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    eprintln!("SQLite MCP Server v{version} starting...");
    eprintln!("Transport: stdio");

    // Set up panic hook for debugging
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] {}", info);
    }));

    let config = Config::resolve(args)?;
    eprintln!("Database: {}", config.database.path.display());

    let shutdown_controller = new_shutdown_controller();
    install_signal_handlers(shutdown_controller.clone()).await;

    // The connection itself opens lazily on first use.
    let server = SqliteMcpServer::new(config);
    let manager = server.manager().clone();
    eprintln!("Server initialized. Ready to accept requests...");

    // Start serving on stdio transport
    let transport = rmcp::transport::stdio();
    let service = server.serve(transport).await?;

    // Wait for shutdown signal or service completion
    let mut shutdown_signal = shutdown_controller.signal();

    tokio::select! {
        quit_reason = service.waiting() => {
            match quit_reason {
                Ok(reason) => eprintln!("Service stopped: {reason:?}"),
                Err(e) => eprintln!("Service error: {e}"),
            }
        }
        _ = shutdown_signal.recv() => {
            eprintln!("Shutdown signal received");
        }
    }

    shutdown_controller.graceful_shutdown(&manager).await;
    eprintln!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for JSON-RPC communication.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,sqlite_mcp_server=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
