//! Jump reclassification: deciding what a `jump`/`goto` node *means*.
//!
//! The IR leaves structure implicit: the same `jump` opcode opens an `if`,
//! continues an else-chain, or heads a loop, depending entirely on the
//! metadata the forest traversal collected around it. This pass names the
//! shape; rendering stays in `ops`. First match wins; a partial match falls
//! through to the weaker reading instead of failing, so the output stays
//! syntactically valid even for inconsistent streams.

use std::collections::HashSet;

use crate::ir::Opcode;
use crate::scope::Node;

/// The closed set of structural intents a jump-family node can have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpShape {
    /// Plain conditional block entry.
    If { guard: String },
    /// Continues an if/else chain with a new guard.
    ElseIf { guard: String },
    /// Continues an if/else chain unconditionally.
    Else,
    /// Optional-unwrap loop header: loop while the probed iterator still
    /// yields a value.
    WhileLet { binding: String },
    /// Backward `goto`: closes the innermost loop body, aligned with the
    /// depth of the loop it re-enters.
    LoopClose { depth: usize },
    /// Bare jump out of a finished branch; nothing to render.
    Exit,
}

/// Classify one jump-family node. `entered` holds every scope id already
/// opened during generation; a jump into one of those is a block exit, not
/// a branch.
pub fn classify(node: &Node<'_>, entered: &HashSet<u32>) -> JumpShape {
    let instruction = node.instruction;
    let meta = &node.meta;

    if instruction.opcode == Opcode::Goto {
        let depth = meta
            .return_depth
            .unwrap_or_else(|| node.depth.saturating_sub(1));
        return JumpShape::LoopClose { depth };
    }

    let guard = instruction.inputs.first().cloned().unwrap_or_default();
    let forward_target = instruction
        .jump_target()
        .is_some_and(|target| !entered.contains(&target));
    let sibling_scope = meta.parent_scope == Some(instruction.scope);

    // Else-if continuation: a jump directly following a conditional jump at
    // the same level extends the chain instead of opening a fresh block.
    if meta.last_node_was_conditional_jump && sibling_scope && forward_target {
        return if instruction.is_conditional_jump() {
            JumpShape::ElseIf { guard }
        } else {
            JumpShape::Else
        };
    }

    // If-let entry: the jump guards directly on the probe's own binding.
    if sibling_scope {
        if let Some(probe) = &meta.try_assign {
            if probe.guard == guard {
                return JumpShape::WhileLet {
                    binding: probe.binding.clone(),
                };
            }
        }
        // While entry: the jump guards on a pending exhaustion check.
        if let Some(check) = &meta.end_of_iteration_check {
            if check.guard == guard {
                return JumpShape::WhileLet {
                    binding: check.binding.clone(),
                };
            }
        }
    }

    if instruction.is_conditional_jump() {
        return JumpShape::If { guard };
    }

    JumpShape::Exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Instruction;
    use crate::scope::{Metadata, PendingCheck, PendingProbe};

    fn jump(inputs: &[&str], scope: u32) -> Instruction {
        Instruction::new(
            Opcode::Jump,
            inputs.iter().map(|s| s.to_string()).collect(),
            None,
            scope,
            0,
        )
    }

    fn node<'a>(instruction: &'a Instruction, depth: usize, meta: Metadata) -> Node<'a> {
        Node {
            instruction,
            depth,
            meta,
        }
    }

    #[test]
    fn test_plain_conditional() {
        let ins = jump(&["COND", "1"], 0);
        let shape = classify(&node(&ins, 0, Metadata::default()), &HashSet::from([0]));
        assert_eq!(
            shape,
            JumpShape::If {
                guard: "COND".to_string()
            }
        );
    }

    #[test]
    fn test_else_after_conditional_sibling() {
        let ins = jump(&["101"], 0);
        let meta = Metadata {
            parent_scope: Some(0),
            last_node_was_conditional_jump: true,
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 0, meta), &HashSet::from([0, 1]));
        assert_eq!(shape, JumpShape::Else);
    }

    #[test]
    fn test_else_if_keeps_guard() {
        let ins = jump(&["COND_2", "2"], 0);
        let meta = Metadata {
            parent_scope: Some(0),
            last_node_was_conditional_jump: true,
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 0, meta), &HashSet::from([0, 1]));
        assert_eq!(
            shape,
            JumpShape::ElseIf {
                guard: "COND_2".to_string()
            }
        );
    }

    #[test]
    fn test_backward_jump_after_conditional_is_exit() {
        // A bare jump back into an enclosing scope is a block exit even when
        // it directly follows a conditional sibling.
        let ins = jump(&["28"], 63);
        let meta = Metadata {
            parent_scope: Some(63),
            last_node_was_conditional_jump: true,
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 3, meta), &HashSet::from([0, 28, 63]));
        assert_eq!(shape, JumpShape::Exit);
    }

    #[test]
    fn test_while_from_pending_check() {
        let ins = jump(&["CHECK_9", "15"], 0);
        let meta = Metadata {
            parent_scope: Some(0),
            end_of_iteration_check: Some(PendingCheck {
                guard: "CHECK_9".to_string(),
                binding: "acc_a".to_string(),
                iterator: "ITERATOR_8".to_string(),
            }),
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 0, meta), &HashSet::from([0]));
        assert_eq!(
            shape,
            JumpShape::WhileLet {
                binding: "acc_a".to_string()
            }
        );
    }

    #[test]
    fn test_if_let_from_pending_probe() {
        let ins = jump(&["value", "7"], 0);
        let meta = Metadata {
            parent_scope: Some(0),
            try_assign: Some(PendingProbe {
                guard: "value".to_string(),
                binding: "value".to_string(),
            }),
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 0, meta), &HashSet::from([0]));
        assert_eq!(
            shape,
            JumpShape::WhileLet {
                binding: "value".to_string()
            }
        );
    }

    #[test]
    fn test_mismatched_pending_falls_through_to_if() {
        // A pending probe whose bound name never matches the guard must not
        // hijack the jump: it degrades to a plain conditional.
        let ins = jump(&["COND", "5"], 0);
        let meta = Metadata {
            parent_scope: Some(0),
            try_assign: Some(PendingProbe {
                guard: "other".to_string(),
                binding: "other".to_string(),
            }),
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 0, meta), &HashSet::from([0]));
        assert_eq!(
            shape,
            JumpShape::If {
                guard: "COND".to_string()
            }
        );
    }

    #[test]
    fn test_goto_uses_return_depth() {
        let ins = Instruction::new(Opcode::Goto, vec!["14".to_string()], None, 15, 118);
        let meta = Metadata {
            return_depth: Some(0),
            ..Metadata::default()
        };
        let shape = classify(&node(&ins, 1, meta), &HashSet::from([0, 15]));
        assert_eq!(shape, JumpShape::LoopClose { depth: 0 });
    }
}
