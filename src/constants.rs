//! Centralized constants for the SQLite MCP Server.
//!
//! This module contains all magic numbers and default values used throughout
//! the codebase, making them easy to find, understand, and modify.

// =============================================================================
// Database Defaults
// =============================================================================

/// Default database file path, used when no flag, positional argument, or
/// environment variable supplies one.
pub const DEFAULT_DB_PATH: &str = "./database.db";

/// Environment variable consulted for the database path.
pub const DB_PATH_ENV_VAR: &str = "SQLITE_DB_PATH";

/// Page cache budget in KiB, applied as a negative `cache_size` pragma
/// (negative values mean KiB rather than pages).
pub const DEFAULT_CACHE_SIZE_KIB: i64 = 64_000;

/// Busy timeout in milliseconds for lock contention against external
/// processes sharing the database file.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// Result Size Constants
// =============================================================================

/// Default maximum result rows returned by a read statement.
pub const DEFAULT_MAX_RESULT_ROWS: usize = 10_000;

/// Default maximum SQL statement length in bytes.
pub const DEFAULT_MAX_STATEMENT_LENGTH: usize = 100_000;

// =============================================================================
// Identifier Constants
// =============================================================================

/// Maximum length for table and column identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

// =============================================================================
// SQL Classification Constants
// =============================================================================

/// PRAGMA reads permitted even though PRAGMA is otherwise disallowed.
///
/// These are pure introspection commands: they cannot mutate the database
/// or reconfigure the connection.
pub const ALLOWED_PRAGMAS: &[&str] = &["table_info", "schema_version", "user_version"];
