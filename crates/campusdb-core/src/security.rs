/// Input validation for statements and durable slot keys
///
/// Keeps oversized statements out of the parser and keeps slot keys from
/// escaping a file-backed store's directory.
use crate::error::{Error, Result};

/// Largest statement text accepted by the interpreter.
pub const MAX_QUERY_LENGTH: usize = 1024 * 1024; // 1 MB

/// Longest durable slot key.
pub const MAX_KEY_LENGTH: usize = 255;

/// Validates statement text
///
/// Empty text is left to the parser, which reports it as an unsupported
/// operation.
///
/// # Errors
///
/// Returns Error::InvalidInput if the statement is oversized
#[inline]
pub fn validate_query(query: &str) -> Result<()> {
    if query.len() > MAX_QUERY_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Query length {} exceeds maximum {}",
            query.len(),
            MAX_QUERY_LENGTH
        )));
    }

    Ok(())
}

/// Validates a durable slot key
///
/// # Security
///
/// - Prevents path traversal attacks
/// - Prevents invalid filesystem characters
///
/// # Errors
///
/// Returns Error::InvalidInput if validation fails
#[inline]
pub fn validate_slot_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("Key cannot be empty".to_string()));
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Key length {} exceeds maximum {}",
            key.len(),
            MAX_KEY_LENGTH
        )));
    }

    if key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(Error::InvalidInput(
            "Key cannot contain path separators or '..'".to_string(),
        ));
    }

    if key.contains('\0') {
        return Err(Error::InvalidInput(
            "Key cannot contain null bytes".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert!(validate_query("SELECT * FROM users").is_ok());
        assert!(validate_query("").is_ok());

        let long = "a".repeat(2 * 1024 * 1024);
        assert!(validate_query(&long).is_err());
    }

    #[test]
    fn test_validate_slot_key() {
        assert!(validate_slot_key("mysql_erp_system_users").is_ok());

        assert!(validate_slot_key("").is_err());
        assert!(validate_slot_key("../etc/passwd").is_err());
        assert!(validate_slot_key("a/b").is_err());
        assert!(validate_slot_key(&"k".repeat(300)).is_err());
    }
}
