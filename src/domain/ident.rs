//! SQL identifier policy.
//!
//! Every table, column and lookup type that ends up inside a SQL string goes
//! through here first. Identifiers are interpolated unquoted, so Postgres folds
//! them to lowercase; uppercase is rejected to keep the stored name and the real
//! relation name identical.

use crate::error::{Result, ServiceError};

/// Postgres truncates identifiers longer than `NAMEDATALEN - 1` bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

pub fn is_valid_identifier(ident: &str) -> bool {
    if ident.is_empty() || ident.len() > MAX_IDENTIFIER_LEN {
        return false;
    }
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

pub fn validate_identifier(ident: &str) -> Result<()> {
    if is_valid_identifier(ident) {
        Ok(())
    } else {
        Err(ServiceError::InvalidIdentifier(format!(
            "'{}' must match [a-z_][a-z0-9_]* and be at most {} bytes",
            ident, MAX_IDENTIFIER_LEN
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        for ok in ["status", "_lookups", "order_state2", "a"] {
            assert!(is_valid_identifier(ok), "{ok} should be accepted");
        }
    }

    #[test]
    fn rejects_injection_and_odd_shapes() {
        for bad in [
            "",
            "1status",
            "status; DROP TABLE users",
            "sta tus",
            "status\"",
            "sta-tus",
            "Status",
            "státus",
        ] {
            assert!(!is_valid_identifier(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn enforces_length_bound() {
        let max = "a".repeat(MAX_IDENTIFIER_LEN);
        assert!(is_valid_identifier(&max));
        let over = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(matches!(
            validate_identifier(&over),
            Err(ServiceError::InvalidIdentifier(_))
        ));
    }
}
