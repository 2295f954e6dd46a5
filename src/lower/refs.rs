//! Positional reference-marker resolution.
//!
//! The IR marks "pass by reference" with a standalone `&` token placed
//! immediately before the token it decorates:
//!
//! ```text
//! (METHOD_CALL_EXPRESSION_5.get, &, COUNTER)  →  METHOD_CALL_EXPRESSION_5.get(&COUNTER)
//! ```
//!
//! A `&` in the leading position instead decorates the whole rendered
//! expression. Markers are consumed here; they must never survive into the
//! output as literal tokens.

use crate::lower::input;

/// Fold standalone `&` markers into a prefix on the following token.
pub fn resolve_markers(inputs: &[String]) -> Vec<String> {
    let mut resolved = Vec::with_capacity(inputs.len());
    let mut pending_ref = false;
    for token in inputs {
        if token == "&" {
            pending_ref = true;
            continue;
        }
        if pending_ref {
            resolved.push(format!("&{token}"));
            pending_ref = false;
        } else {
            resolved.push(token.clone());
        }
    }
    resolved
}

/// Split off a leading whole-expression marker: `(&, a, b)` → `(true, [a, b])`.
pub fn split_leading_marker(inputs: &[String]) -> (bool, &[String]) {
    match inputs.first() {
        Some(first) if first == "&" => (true, &inputs[1..]),
        _ => (false, inputs),
    }
}

// ─── Automatic decoration policy ──────────────────────────────────

/// Which callees never get automatic reference decoration on their
/// arguments.
///
/// The rule is a name-suffix deny-list, injectable so a contract front end
/// can extend it without touching the lowering layer. The default list is
/// the set of SDK callees observed to take their arguments by value.
#[derive(Debug, Clone)]
pub struct RefPolicy {
    suppressed_suffixes: Vec<String>,
}

impl Default for RefPolicy {
    fn default() -> Self {
        Self {
            suppressed_suffixes: [
                "unwrap_or",
                "publish",
                "Err",
                "Ok",
                "checked_mul",
                "checked_add",
                "update_current_contract_wasm",
                "with_address",
                "deploy",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl RefPolicy {
    pub fn new(suppressed_suffixes: Vec<String>) -> Self {
        Self {
            suppressed_suffixes,
        }
    }

    /// True when arguments of `callee` must stay undecorated.
    pub fn suppresses(&self, callee: &str) -> bool {
        self.suppressed_suffixes
            .iter()
            .any(|suffix| callee.ends_with(suffix.as_str()))
    }
}

/// Decorate the environment handle in argument position: `env` → `&env`.
/// Everything else relies on explicit positional markers.
pub fn decorate_env(token: &str) -> String {
    if token == "env" && input::interpret(token).needs_reference {
        format!("&{token}")
    } else {
        token.to_string()
    }
}
