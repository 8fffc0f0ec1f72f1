//! Database access: connection management, statement execution, structured
//! SQL synthesis, and atomic batches.

pub mod builder;
mod connection;
pub mod executor;
mod introspection;
mod transaction;

pub use builder::{BuiltStatement, ColumnSpec};
pub use connection::ConnectionManager;
pub use executor::{AccessMode, ChangeSummary, ExecutionResult, RowSet, StatementExecutor};
pub use introspection::SchemaIntrospector;
pub use transaction::TransactionCoordinator;
