//! Configuration management for the SQLite MCP Server.
//!
//! The database path is resolved with a fixed precedence: `--db-path` flag,
//! then positional argument, then the `SQLITE_DB_PATH` environment variable,
//! then the built-in default. Limits follow the same env-overridable pattern
//! as the rest of the configuration.

use crate::constants::{
    DB_PATH_ENV_VAR, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_CACHE_SIZE_KIB, DEFAULT_DB_PATH,
    DEFAULT_MAX_RESULT_ROWS, DEFAULT_MAX_STATEMENT_LENGTH,
};
use crate::error::ServerError;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command-line arguments.
///
/// Help and version flags short-circuit startup inside clap before any
/// database connection is opened.
#[derive(Debug, Parser)]
#[command(name = "sqlite-mcp-server", version, about = "MCP server for local SQLite databases")]
pub struct CliArgs {
    /// Path to the SQLite database file
    #[arg(long = "db-path", value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Path to the SQLite database file (positional form)
    #[arg(value_name = "DATABASE")]
    pub positional_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Security configuration
    pub security: SecurityConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file. Parent directories are created on first
    /// open if missing.
    pub path: PathBuf,

    /// Page cache budget in KiB.
    pub cache_size_kib: i64,

    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Maximum SQL statement length in bytes.
    pub max_statement_length: usize,

    /// Maximum result rows per read statement.
    pub max_result_rows: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            cache_size_kib: DEFAULT_CACHE_SIZE_KIB,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_statement_length: DEFAULT_MAX_STATEMENT_LENGTH,
            max_result_rows: DEFAULT_MAX_RESULT_ROWS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Resolve configuration from parsed CLI arguments and the environment.
    ///
    /// Database path precedence: `--db-path` flag, positional argument,
    /// `SQLITE_DB_PATH` environment variable, then the built-in default.
    pub fn resolve(args: CliArgs) -> Result<Self, ServerError> {
        let path = args
            .db_path
            .or(args.positional_path)
            .or_else(|| std::env::var_os(DB_PATH_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        if path.as_os_str().is_empty() {
            return Err(ServerError::config("database path must not be empty"));
        }

        let max_result_rows = env_usize("SQLITE_MCP_MAX_ROWS", DEFAULT_MAX_RESULT_ROWS)?;
        let max_statement_length =
            env_usize("SQLITE_MCP_MAX_STATEMENT_LENGTH", DEFAULT_MAX_STATEMENT_LENGTH)?;

        Ok(Self {
            database: DatabaseConfig {
                path,
                ..DatabaseConfig::default()
            },
            security: SecurityConfig {
                max_statement_length,
                max_result_rows,
            },
        })
    }
}

/// Read an optional usize from the environment, falling back to a default.
fn env_usize(var: &str, default: usize) -> Result<usize, ServerError> {
    match std::env::var(var) {
        Ok(v) => v
            .parse()
            .map_err(|_| ServerError::config(format!("{var} must be a positive integer, got '{v}'"))),
        Err(_) => Ok(default),
    }
}
