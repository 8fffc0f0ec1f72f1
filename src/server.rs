//! MCP server struct definition and initialization.

use crate::config::Config;
use crate::database::{
    ConnectionManager, SchemaIntrospector, StatementExecutor, TransactionCoordinator,
};
use crate::security::StatementValidator;
use rmcp::handler::server::router::tool::ToolRouter;
use std::sync::Arc;

/// The SQLite MCP Server instance.
///
/// This struct is cloned for each request; the inner components are shared
/// via `Arc`. The server provides:
///
/// - **Resources**: schema metadata (`sqlite://` URIs)
/// - **Tools**: raw and structured SQL operations
/// - **Prompts**: schema-aware query assistance
#[derive(Clone)]
pub struct SqliteMcpServer {
    /// Configuration.
    pub(crate) config: Arc<Config>,

    /// Owner of the process-wide database handle.
    pub(crate) manager: ConnectionManager,

    /// Statement classifier gating caller-supplied SQL.
    pub(crate) validator: Arc<StatementValidator>,

    /// Statement executor.
    pub(crate) executor: Arc<StatementExecutor>,

    /// Atomic batch coordinator.
    pub(crate) coordinator: Arc<TransactionCoordinator>,

    /// Schema metadata queries shared by tools, resources, and prompts.
    pub(crate) metadata: Arc<SchemaIntrospector>,

    /// Tool router for dispatching tool calls.
    pub(crate) tool_router: ToolRouter<Self>,
}

impl SqliteMcpServer {
    /// Create a new server instance with the given configuration.
    ///
    /// The database connection itself is opened lazily by the first
    /// operation that needs it.
    pub fn new(config: Config) -> Self {
        let manager = ConnectionManager::new(config.database.clone());

        let validator = Arc::new(StatementValidator::new(
            config.security.max_statement_length,
        ));

        let executor = Arc::new(StatementExecutor::new(
            manager.clone(),
            validator.clone(),
            config.security.max_result_rows,
        ));

        let coordinator = Arc::new(TransactionCoordinator::new(
            manager.clone(),
            validator.clone(),
        ));

        let metadata = Arc::new(SchemaIntrospector::new(manager.clone()));

        Self {
            config: Arc::new(config),
            manager,
            validator,
            executor,
            coordinator,
            metadata,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a reference to the connection manager.
    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// Get a reference to the statement validator.
    pub fn validator(&self) -> &StatementValidator {
        &self.validator
    }

    /// Get a reference to the statement executor.
    pub fn executor(&self) -> &StatementExecutor {
        &self.executor
    }

    /// Get a reference to the transaction coordinator.
    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }

    /// Get a reference to the schema introspector.
    pub fn metadata(&self) -> &SchemaIntrospector {
        &self.metadata
    }
}
