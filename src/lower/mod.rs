//! The code generator: forest traversal → reclassification → rendered Rust.
//!
//! One pass over the recovered forest. Each visited node lowers to at most
//! one line; block-closing braces are emitted on dedent (and by the
//! loop-closing `goto`, which aligns its brace with the loop header it
//! re-enters). The symbol table opens a frame per block so bindings made
//! inside a branch never leak into the continuation.

mod classify;
pub mod input;
mod ops;
pub mod refs;

use std::collections::HashSet;

use tracing::trace;

use crate::error::Result;
use crate::ir::{Instruction, Opcode, UserDefinedType};
use crate::scope::{ScopeForest, SymbolTable};

pub use classify::JumpShape;
pub use ops::LowerCtx;
pub use refs::RefPolicy;

const INDENT: &str = "    ";

/// Renders one function's instruction list into Rust statements.
pub struct CodeGenerator<'a> {
    user_defined_types: &'a [UserDefinedType],
    function_names: &'a [String],
    base_depth: usize,
    policy: RefPolicy,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(user_defined_types: &'a [UserDefinedType], function_names: &'a [String]) -> Self {
        Self {
            user_defined_types,
            function_names,
            base_depth: 0,
            policy: RefPolicy::default(),
        }
    }

    /// Indentation depth of the function body's outermost statements.
    pub fn with_base_depth(mut self, base_depth: usize) -> Self {
        self.base_depth = base_depth;
        self
    }

    pub fn with_policy(mut self, policy: RefPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate the function body. `bound` pre-seeds the symbol table
    /// (function parameters are bindings, not declarations-to-be).
    ///
    /// Fatal resolution errors abort the whole function: no partial text is
    /// returned.
    pub fn generate(&self, instructions: &[Instruction], bound: &[String]) -> Result<String> {
        let forest = ScopeForest::build(instructions, self.base_depth);
        let nodes = forest.traverse();

        let mut symbols = SymbolTable::new();
        for name in bound {
            symbols.bind(name);
        }
        let ctx = LowerCtx {
            user_defined_types: self.user_defined_types,
            function_names: self.function_names,
            policy: &self.policy,
        };

        let mut out = String::new();
        let mut entered: HashSet<u32> = HashSet::from([forest.root()]);
        // Body depths of currently open blocks, innermost last.
        let mut open: Vec<usize> = Vec::new();

        for node in &nodes {
            while open.last().is_some_and(|&body_depth| node.depth < body_depth) {
                let body_depth = open.pop().unwrap_or_default();
                symbols.pop_frame();
                push_line(&mut out, body_depth - 1, "}");
            }

            match node.instruction.opcode {
                Opcode::Jump | Opcode::Goto => {
                    let shape = classify::classify(node, &entered);
                    trace!(id = node.instruction.id, ?shape, "reclassified jump");
                    match &shape {
                        JumpShape::LoopClose { depth } => {
                            if open.pop().is_some() {
                                symbols.pop_frame();
                                push_line(&mut out, *depth, "}");
                            }
                        }
                        JumpShape::Exit => {}
                        _ => {
                            if let Some(target) = node.instruction.jump_target() {
                                entered.insert(target);
                            }
                            open.push(node.depth + 1);
                            symbols.push_frame();
                            if let JumpShape::WhileLet { binding } = &shape {
                                symbols.bind(binding);
                            }
                            push_line(&mut out, node.depth, &ops::jump_header(&shape));
                        }
                    }
                }
                _ => {
                    let line = ops::lower(node.instruction, &mut symbols, &ctx)?;
                    if !line.is_empty() {
                        push_line(&mut out, node.depth, &line);
                    }
                }
            }
        }

        while let Some(body_depth) = open.pop() {
            symbols.pop_frame();
            push_line(&mut out, body_depth - 1, "}");
        }

        Ok(out)
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}
