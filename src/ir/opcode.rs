//! The closed set of IR instruction opcodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// One IR opcode. The set is closed: the parser collaborator only ever
/// produces these, and the lowering layer matches on them exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opcode {
    // ── Expressions ──
    Evaluate,
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
    InstantiateObject,

    // ── Bindings ──
    Assign,
    Field,

    // ── Control flow ──
    Jump,
    Goto,
    Break,
    Label,
    EndOfIterationCheck,
    Increment,
    Return,

    // ── Effects ──
    Print,
    ExitWithMessage,
}

impl Opcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Evaluate => "evaluate",
            Opcode::Add => "add",
            Opcode::Subtract => "subtract",
            Opcode::Multiply => "multiply",
            Opcode::Divide => "divide",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::InstantiateObject => "instantiate_object",
            Opcode::Assign => "assign",
            Opcode::Field => "field",
            Opcode::Jump => "jump",
            Opcode::Goto => "goto",
            Opcode::Break => "break",
            Opcode::Label => "label",
            Opcode::EndOfIterationCheck => "end_of_iteration_check",
            Opcode::Increment => "increment",
            Opcode::Return => "return",
            Opcode::Print => "print",
            Opcode::ExitWithMessage => "exit_with_message",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evaluate" => Ok(Opcode::Evaluate),
            "add" => Ok(Opcode::Add),
            "subtract" => Ok(Opcode::Subtract),
            "multiply" => Ok(Opcode::Multiply),
            "divide" => Ok(Opcode::Divide),
            "and" => Ok(Opcode::And),
            "or" => Ok(Opcode::Or),
            "instantiate_object" => Ok(Opcode::InstantiateObject),
            "assign" => Ok(Opcode::Assign),
            "field" => Ok(Opcode::Field),
            "jump" => Ok(Opcode::Jump),
            "goto" => Ok(Opcode::Goto),
            "break" => Ok(Opcode::Break),
            "label" => Ok(Opcode::Label),
            "end_of_iteration_check" => Ok(Opcode::EndOfIterationCheck),
            "increment" => Ok(Opcode::Increment),
            "return" => Ok(Opcode::Return),
            "print" => Ok(Opcode::Print),
            "exit_with_message" => Ok(Opcode::ExitWithMessage),
            other => Err(CodegenError::UnknownOpcode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_names() {
        let all = [
            Opcode::Evaluate,
            Opcode::Add,
            Opcode::Subtract,
            Opcode::Multiply,
            Opcode::Divide,
            Opcode::And,
            Opcode::Or,
            Opcode::InstantiateObject,
            Opcode::Assign,
            Opcode::Field,
            Opcode::Jump,
            Opcode::Goto,
            Opcode::Break,
            Opcode::Label,
            Opcode::EndOfIterationCheck,
            Opcode::Increment,
            Opcode::Return,
            Opcode::Print,
            Opcode::ExitWithMessage,
        ];
        for op in all {
            assert_eq!(op.as_str().parse::<Opcode>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_name_is_fatal() {
        let err = "frobnicate".parse::<Opcode>().unwrap_err();
        assert_eq!(err, CodegenError::UnknownOpcode("frobnicate".to_string()));
    }
}
