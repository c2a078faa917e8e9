//! SQL text helpers
//!
//! Used for display-only SQL and for identifiers taken from the static
//! domain catalog. Values that reach the database are always bound.

/// Quote a string as a SQL literal, doubling embedded single quotes
///
/// ```
/// use dataportal_server::utils::sql::quote_literal;
///
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Render a parenthesized, comma-separated list of quoted literals
pub fn quote_list<S: AsRef<str>>(values: &[S]) -> String {
    let items: Vec<String> = values.iter().map(|v| quote_literal(v.as_ref())).collect();
    format!("({})", items.join(", "))
}

/// Check that a (possibly schema-qualified) name is a plain SQL identifier
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_plain() {
        assert_eq!(quote_literal("DACH"), "'DACH'");
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("'"), "''''");
    }

    #[test]
    fn test_quote_list() {
        assert_eq!(quote_list(&["DACH", "UK"]), "('DACH', 'UK')");
        assert_eq!(quote_list(&["A'B"]), "('A''B')");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("mart.sales_orders_fact"));
        assert!(is_identifier("order_date"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("mart."));
        assert!(!is_identifier("1col"));
        assert!(!is_identifier("region; DROP TABLE x"));
    }
}
