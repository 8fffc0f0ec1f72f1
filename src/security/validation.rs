//! SQL statement classification.
//!
//! Classification is a syntactic prefilter, not a semantic guarantee:
//! multi-statement strings or obfuscated SQL can evade the prefix checks.
//! The gate's job is to keep obviously disallowed statements away from the
//! driver and to decide which entry points may run a given statement.

use crate::constants::ALLOWED_PRAGMAS;
use crate::error::ServerError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Classification verdict for a SQL statement.
///
/// Rejection is surfaced as `Err(ServerError::ValidationRejected)` rather
/// than a third variant, so call sites propagate it with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The statement cannot mutate state and may run at read-only entry
    /// points.
    ReadOnly,

    /// Default classification: INSERT/UPDATE/DELETE/CREATE/DROP/ALTER and
    /// anything not otherwise matched.
    Mutating,
}

/// Compile a hardcoded pattern, panicking on the (impossible) failure case.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|e| panic!("Internal error: invalid regex pattern '{}': {}", pattern, e))
}

/// PRAGMA statements other than the allow-listed reads are rejected.
static PRAGMA_PATTERN: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s*PRAGMA\b"));

/// The introspection pragmas that remain permitted.
static ALLOWED_PRAGMA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^\s*PRAGMA\s+({})\b",
        ALLOWED_PRAGMAS.join("|")
    ))
});

/// ATTACH/DETACH reach outside the configured database file.
static ATTACH_DETACH_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^\s*(ATTACH|DETACH)\b"));

/// Read-only prefixes: a bare SELECT or a common-table-expression query.
static READ_ONLY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(?i)^\s*SELECT\b"),
        compile(r"(?is)^\s*WITH\b.*?\bSELECT\b"),
    ]
});

/// Statement classifier used as a gate before execution.
#[derive(Debug, Clone)]
pub struct StatementValidator {
    max_statement_length: usize,
}

impl StatementValidator {
    /// Create a new validator.
    pub fn new(max_statement_length: usize) -> Self {
        Self {
            max_statement_length,
        }
    }

    /// Classify a SQL statement.
    ///
    /// Returns the verdict, or `ServerError::ValidationRejected` when the
    /// statement matches a disallowed pattern. Rejected statements never
    /// reach the driver.
    pub fn classify(&self, sql: &str) -> Result<Verdict, ServerError> {
        if sql.len() > self.max_statement_length {
            return Err(ServerError::rejected(format!(
                "statement exceeds maximum length of {} bytes",
                self.max_statement_length
            )));
        }

        let stripped = strip_leading_comments(sql);
        let trimmed = stripped.trim();

        if trimmed.is_empty() {
            return Err(ServerError::rejected("statement is empty"));
        }

        if PRAGMA_PATTERN.is_match(trimmed) {
            if ALLOWED_PRAGMA_PATTERN.is_match(trimmed) {
                return Ok(Verdict::ReadOnly);
            }
            return Err(ServerError::rejected(format!(
                "PRAGMA statements are not allowed (except {})",
                ALLOWED_PRAGMAS.join(", ")
            )));
        }

        if ATTACH_DETACH_PATTERN.is_match(trimmed) {
            return Err(ServerError::rejected(
                "ATTACH DATABASE and DETACH DATABASE statements are not allowed",
            ));
        }

        if READ_ONLY_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
            return Ok(Verdict::ReadOnly);
        }

        Ok(Verdict::Mutating)
    }
}

/// Remove leading SQL comments from a statement.
fn strip_leading_comments(sql: &str) -> String {
    let mut result = sql.to_string();

    loop {
        let trimmed = result.trim_start();

        if trimmed.starts_with("--") {
            if let Some(newline_pos) = trimmed.find('\n') {
                result = trimmed[newline_pos + 1..].to_string();
                continue;
            }
            // Entire statement is a comment
            return String::new();
        }

        if trimmed.starts_with("/*") {
            if let Some(end_pos) = trimmed.find("*/") {
                result = trimmed[end_pos + 2..].to_string();
                continue;
            }
            // Unclosed comment
            return String::new();
        }

        return trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> StatementValidator {
        StatementValidator::new(1_000_000)
    }

    #[test]
    fn test_select_is_read_only() {
        let v = validator();
        assert_eq!(v.classify("SELECT * FROM users").unwrap(), Verdict::ReadOnly);
        assert_eq!(v.classify("  select 1").unwrap(), Verdict::ReadOnly);
        assert_eq!(
            v.classify("WITH cte AS (SELECT 1) SELECT * FROM cte").unwrap(),
            Verdict::ReadOnly
        );
        assert_eq!(
            v.classify("with\n cte as (select 1)\nselect * from cte").unwrap(),
            Verdict::ReadOnly
        );
    }

    #[test]
    fn test_allowed_pragmas_are_read_only() {
        let v = validator();
        assert_eq!(
            v.classify("PRAGMA table_info(users)").unwrap(),
            Verdict::ReadOnly
        );
        assert_eq!(v.classify("pragma schema_version").unwrap(), Verdict::ReadOnly);
        assert_eq!(v.classify("PRAGMA user_version").unwrap(), Verdict::ReadOnly);
    }

    #[test]
    fn test_disallowed_pragmas_are_rejected() {
        let v = validator();
        assert!(v.classify("PRAGMA journal_mode = DELETE").is_err());
        assert!(v.classify("pragma writable_schema = ON").is_err());
        assert!(v.classify("PRAGMA foreign_keys = OFF").is_err());
    }

    #[test]
    fn test_attach_detach_rejected() {
        let v = validator();
        assert!(v.classify("ATTACH DATABASE '/tmp/x.db' AS other").is_err());
        assert!(v.classify("attach database ':memory:' as mem").is_err());
        assert!(v.classify("DETACH DATABASE other").is_err());
    }

    #[test]
    fn test_mutating_default() {
        let v = validator();
        assert_eq!(
            v.classify("INSERT INTO users(name) VALUES ('x')").unwrap(),
            Verdict::Mutating
        );
        assert_eq!(v.classify("UPDATE users SET name = 'x'").unwrap(), Verdict::Mutating);
        assert_eq!(v.classify("DELETE FROM users").unwrap(), Verdict::Mutating);
        assert_eq!(
            v.classify("CREATE TABLE t (id INTEGER)").unwrap(),
            Verdict::Mutating
        );
        assert_eq!(v.classify("DROP TABLE t").unwrap(), Verdict::Mutating);
        assert_eq!(v.classify("ALTER TABLE t ADD COLUMN x").unwrap(), Verdict::Mutating);
        assert_eq!(v.classify("VACUUM").unwrap(), Verdict::Mutating);
    }

    #[test]
    fn test_leading_comments_are_skipped() {
        let v = validator();
        assert_eq!(
            v.classify("-- comment\nSELECT 1").unwrap(),
            Verdict::ReadOnly
        );
        assert_eq!(
            v.classify("/* block */ SELECT 1").unwrap(),
            Verdict::ReadOnly
        );
        assert!(v.classify("/* block */ PRAGMA journal_mode = OFF").is_err());
    }

    #[test]
    fn test_empty_statement_rejected() {
        let v = validator();
        assert!(v.classify("").is_err());
        assert!(v.classify("   ").is_err());
        assert!(v.classify("-- only a comment").is_err());
    }

    #[test]
    fn test_length_limit() {
        let v = StatementValidator::new(32);
        let long = format!("SELECT '{}'", "x".repeat(64));
        assert!(v.classify(&long).is_err());
    }
}
