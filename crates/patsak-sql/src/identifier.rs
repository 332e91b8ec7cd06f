//! Safe SQL identifier and literal quoting.

/// Double-quote and escape a SQL identifier (table or column name).
pub fn escape_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote and escape a string for use as a SQL literal. Installed as
/// the default escape callback for `Value::render` when no backend-specific
/// override is supplied.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_embedded_quotes() {
        assert_eq!(escape_ident("users"), "\"users\"");
        assert_eq!(escape_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn quotes_literal_strings() {
        assert_eq!(quote_literal("anton"), "'anton'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }
}
