//! SQLite identifier validation and quoting.
//!
//! Structured operations let callers name tables and columns dynamically.
//! Those names cannot be bound as parameters, so they are validated against
//! a conservative allow-list and then double-quote escaped before being
//! interpolated into generated SQL.

use crate::constants::MAX_IDENTIFIER_LENGTH;
use crate::error::ServerError;

/// Validate that an identifier contains only allowed characters.
///
/// Allowed: ASCII letters, digits, and underscores, not starting with a
/// digit, at most `MAX_IDENTIFIER_LENGTH` characters.
pub fn validate_identifier(identifier: &str) -> Result<(), ServerError> {
    if identifier.is_empty() {
        return Err(ServerError::invalid_input("identifier cannot be empty"));
    }

    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ServerError::invalid_input(format!(
            "identifier exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }

    let mut chars = identifier.chars();
    let first = chars.next().unwrap_or('0');
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(ServerError::invalid_input(format!(
            "identifier '{}' must start with a letter or underscore",
            identifier
        )));
    }

    if let Some(bad) = identifier
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(ServerError::invalid_input(format!(
            "identifier '{}' contains forbidden character '{}'",
            identifier, bad
        )));
    }

    Ok(())
}

/// Quote an identifier using SQLite's double-quote notation.
///
/// Embedded quotes are escaped by doubling, though the allow-list already
/// excludes them for validated input.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Validate and quote an identifier for safe use in generated SQL.
pub fn safe_identifier(identifier: &str) -> Result<String, ServerError> {
    validate_identifier(identifier)?;
    Ok(quote_identifier(identifier))
}
