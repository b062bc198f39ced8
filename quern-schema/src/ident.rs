//! Identifier lexeme checks shared by schema construction and compilation.

/// Maximum dot-separated segments in a qualified identifier
/// (`schema.table.column`).
pub const MAX_IDENTIFIER_SEGMENTS: usize = 3;

/// Check a single identifier segment against `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check a possibly-qualified identifier.
///
/// Each dot-separated segment must satisfy the lexeme and there may be at
/// most [`MAX_IDENTIFIER_SEGMENTS`] segments. Returns a message describing
/// the first failure.
pub fn check_identifier(identifier: &str) -> Result<(), String> {
    if identifier.is_empty() {
        return Err("identifier is empty".to_string());
    }
    let segments: Vec<&str> = identifier.split('.').collect();
    if segments.len() > MAX_IDENTIFIER_SEGMENTS {
        return Err(format!(
            "identifier has {} segments (maximum {})",
            segments.len(),
            MAX_IDENTIFIER_SEGMENTS
        ));
    }
    for segment in segments {
        if !is_valid_segment(segment) {
            return Err(format!("segment `{}` is not a valid identifier", segment));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_segments() {
        assert!(is_valid_segment("users"));
        assert!(is_valid_segment("_private"));
        assert!(is_valid_segment("col_2"));
    }

    #[test]
    fn test_invalid_segments() {
        assert!(!is_valid_segment(""));
        assert!(!is_valid_segment("2col"));
        assert!(!is_valid_segment("col-name"));
        assert!(!is_valid_segment("col name"));
        assert!(!is_valid_segment("naïve"));
    }

    #[test]
    fn test_qualified_identifiers() {
        assert!(check_identifier("users.email").is_ok());
        assert!(check_identifier("public.users.email").is_ok());
        assert!(check_identifier("a.b.c.d").is_err());
        assert!(check_identifier("users..email").is_err());
        assert!(check_identifier("users.email; DROP TABLE users").is_err());
    }
}
