use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a log record's command tag should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Transaction control: rendered as the bare keyword
    Simple,
    /// Has a statement body and optional bindings
    Parsed,
    /// Not SQL we render; the record is skipped
    Ignored,
}

static STATEMENT_KINDS: Lazy<HashMap<&'static str, StatementKind>> = Lazy::new(|| {
    HashMap::from([
        ("BEGIN", StatementKind::Simple),
        ("COMMIT", StatementKind::Simple),
        ("ROLLBACK", StatementKind::Simple),
        ("SELECT", StatementKind::Parsed),
        ("INSERT", StatementKind::Parsed),
        ("UPDATE", StatementKind::Parsed),
        ("DELETE", StatementKind::Parsed),
    ])
});

/// Classify a command tag. Case-sensitive, exact match.
pub fn classify(operation: &str) -> StatementKind {
    STATEMENT_KINDS
        .get(operation)
        .copied()
        .unwrap_or(StatementKind::Ignored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_operations() {
        for op in ["BEGIN", "COMMIT", "ROLLBACK"] {
            assert_eq!(classify(op), StatementKind::Simple, "{}", op);
        }
    }

    #[test]
    fn test_parsed_operations() {
        for op in ["SELECT", "INSERT", "UPDATE", "DELETE"] {
            assert_eq!(classify(op), StatementKind::Parsed, "{}", op);
        }
    }

    #[test]
    fn test_everything_else_is_ignored() {
        for op in ["", "select", "Begin", "VACUUM", "SELECT ", "idle", "COPY"] {
            assert_eq!(classify(op), StatementKind::Ignored, "{:?}", op);
        }
    }
}
