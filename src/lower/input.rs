//! Raw input-token classification.
//!
//! Instruction inputs arrive as bare strings; handlers that must decide
//! between "quote it", "wrap it", or "reference it" ask this module what
//! shape a token has.

/// The closed set of token shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Number,
    StringLiteral,
    Boolean,
    Collection,
    Identifier,
}

/// A classified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpreted {
    pub kind: InputKind,
    /// Identifiers name live values and are the only tokens that can take
    /// reference decoration; literals never do.
    pub needs_reference: bool,
}

/// Classify one raw token.
pub fn interpret(token: &str) -> Interpreted {
    let kind = classify(token);
    Interpreted {
        kind,
        needs_reference: kind == InputKind::Identifier && !token.starts_with('&'),
    }
}

fn classify(token: &str) -> InputKind {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return InputKind::StringLiteral;
    }
    if token == "true" || token == "false" {
        return InputKind::Boolean;
    }
    if token.parse::<i128>().is_ok() || token.parse::<f64>().is_ok() {
        return InputKind::Number;
    }
    if token.starts_with('[') || token.starts_with('(') {
        return InputKind::Collection;
    }
    InputKind::Identifier
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("42", InputKind::Number)]
    #[test_case("-7", InputKind::Number)]
    #[test_case("3.14", InputKind::Number)]
    #[test_case("\"Hello\"", InputKind::StringLiteral)]
    #[test_case("true", InputKind::Boolean)]
    #[test_case("false", InputKind::Boolean)]
    #[test_case("[1, 2]", InputKind::Collection)]
    #[test_case("(a, b)", InputKind::Collection)]
    #[test_case("env", InputKind::Identifier)]
    #[test_case("acc_a.amount", InputKind::Identifier)]
    fn test_classification(token: &str, expected: InputKind) {
        assert_eq!(interpret(token).kind, expected);
    }

    #[test]
    fn test_only_bare_identifiers_take_references() {
        assert!(interpret("env").needs_reference);
        assert!(!interpret("&env").needs_reference);
        assert!(!interpret("42").needs_reference);
        assert!(!interpret("\"Hello\"").needs_reference);
        assert!(!interpret("true").needs_reference);
    }
}
