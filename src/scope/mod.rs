//! Structured-control-flow recovery over the flat instruction stream.
//!
//! The IR has no `if`/`while` nodes: a `jump` names the scope id of the
//! branch it guards, a backward `goto` names the instruction id a loop
//! re-enters, and every instruction carries the scope it lives in. This
//! module rebuilds the block tree from those three facts and drives the
//! depth-first, body-before-continuation traversal the generator renders
//! from.
//!
//! The builder is purely structural: it decides nesting, depth, and the
//! per-node metadata snapshot. Deciding what a jump *means* is the
//! reclassifier's job (`lower::classify`), and rendering is the lowering
//! layer's.


use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::ir::{Instruction, Opcode};

// ─── Metadata ─────────────────────────────────────────────────────

/// A pending "probe the iterator's next value" binding, recorded when an
/// `evaluate start` is visited and waiting for the guarded jump that turns
/// the pair into an optional-unwrap loop header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingProbe {
    /// The name the probe bound, which a matching jump guards on.
    pub guard: String,
    /// The loop variable the header unwraps into.
    pub binding: String,
}

/// A pending iterator-exhaustion comparison, recorded when an
/// `end_of_iteration_check` is visited and waiting for its loop jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheck {
    /// The comparison's assigned name, which a matching jump guards on.
    pub guard: String,
    /// The loop variable being advanced.
    pub binding: String,
    /// The iterator being drained.
    pub iterator: String,
}

/// The per-node metadata snapshot, created fresh during traversal and
/// discarded once the node is lowered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Scope id of the node's tree parent: the previous sibling, or the
    /// jump that opened this block. `None` for the root's first node.
    pub parent_scope: Option<u32>,
    /// True iff the tree parent was a conditional jump, the signal that a
    /// following jump continues an if/else chain.
    pub last_node_was_conditional_jump: bool,
    /// For `goto` nodes: the depth of the scope holding the targeted
    /// instruction, i.e. where the loop-closing brace must align.
    pub return_depth: Option<usize>,
    pub try_assign: Option<PendingProbe>,
    pub end_of_iteration_check: Option<PendingCheck>,
}

/// One visited instruction with its block depth and metadata.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub instruction: &'a Instruction,
    pub depth: usize,
    pub meta: Metadata,
}

// ─── Symbol table ─────────────────────────────────────────────────

/// Names bound so far, as a stack of per-block frames. Entering a block
/// pushes a frame (inheriting everything below it); closing the block pops
/// it, so child bindings never leak into the continuation.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    frames: Vec<HashSet<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            frames: vec![HashSet::new()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashSet::new());
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn bind(&mut self, name: &str) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(name))
    }
}

// ─── Forest ───────────────────────────────────────────────────────

/// The recovered block forest for one function's instruction list.
///
/// Instructions are grouped per scope id in encounter order; a jump's target
/// scope hangs off the jump node as its entered body. The flat list may
/// interleave freely (a branch body can appear after the parent scope's
/// continuation); grouping by scope id makes the layout irrelevant.
pub struct ScopeForest<'a> {
    instructions: &'a [Instruction],
    base_depth: usize,
    /// Scope id → indices into `instructions`, in encounter order.
    scope_lists: Vec<(u32, Vec<usize>)>,
    /// Instruction id → scope id, for resolving backward goto targets.
    id_scopes: HashMap<u32, u32>,
    root: u32,
}

impl<'a> ScopeForest<'a> {
    pub fn build(instructions: &'a [Instruction], base_depth: usize) -> Self {
        let mut scope_lists: Vec<(u32, Vec<usize>)> = Vec::new();
        let mut id_scopes = HashMap::new();
        for (index, instruction) in instructions.iter().enumerate() {
            id_scopes.insert(instruction.id, instruction.scope);
            match scope_lists
                .iter_mut()
                .find(|(scope, _)| *scope == instruction.scope)
            {
                Some((_, list)) => list.push(index),
                None => scope_lists.push((instruction.scope, vec![index])),
            }
        }
        let root = instructions.first().map(|i| i.scope).unwrap_or(0);
        Self {
            instructions,
            base_depth,
            scope_lists,
            id_scopes,
            root,
        }
    }

    pub fn root(&self) -> u32 {
        self.root
    }

    fn scope_list(&self, scope: u32) -> Option<&[usize]> {
        self.scope_lists
            .iter()
            .find(|(s, _)| *s == scope)
            .map(|(_, list)| list.as_slice())
    }

    /// Depth-first, body-before-continuation traversal. Every instruction is
    /// visited exactly once, in list order within its scope; sibling nodes
    /// share a depth and a body sits one level below the jump that enters it.
    pub fn traverse(&self) -> Vec<Node<'a>> {
        let mut out = Vec::with_capacity(self.instructions.len());
        let mut visited: HashSet<u32> = HashSet::new();
        let mut scope_depths: HashMap<u32, usize> = HashMap::new();
        visited.insert(self.root);
        self.walk(
            self.root,
            self.base_depth,
            None,
            false,
            Pendings::default(),
            &mut visited,
            &mut scope_depths,
            &mut out,
        );

        // A scope no jump enters is unreachable per the IR invariants; if one
        // shows up anyway, still honor the visit-every-instruction contract.
        for (scope, _) in &self.scope_lists {
            if !visited.contains(scope) {
                visited.insert(*scope);
                trace!(scope, "walking unentered scope at base depth");
                self.walk(
                    *scope,
                    self.base_depth,
                    None,
                    false,
                    Pendings::default(),
                    &mut visited,
                    &mut scope_depths,
                    &mut out,
                );
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        scope: u32,
        depth: usize,
        opened_from: Option<u32>,
        opened_by_conditional: bool,
        inherited: Pendings,
        visited: &mut HashSet<u32>,
        scope_depths: &mut HashMap<u32, usize>,
        out: &mut Vec<Node<'a>>,
    ) {
        scope_depths.insert(scope, depth);
        trace!(scope, depth, "entering block");

        let Some(list) = self.scope_list(scope) else {
            return;
        };

        let mut pendings = inherited;
        // The tree parent of a body's first node is the jump that opened it.
        let mut parent_scope = opened_from;
        let mut last_was_conditional = opened_by_conditional;

        for &index in list {
            let instruction = &self.instructions[index];

            let meta = Metadata {
                parent_scope,
                last_node_was_conditional_jump: last_was_conditional,
                return_depth: self.return_depth(instruction, scope_depths),
                try_assign: pendings.probe.clone(),
                end_of_iteration_check: pendings.check.clone(),
            };
            out.push(Node {
                instruction,
                depth,
                meta,
            });

            pendings.observe(instruction);

            if instruction.opcode == Opcode::Jump {
                if let Some(target) = instruction.jump_target() {
                    if !visited.contains(&target) && self.scope_list(target).is_some() {
                        visited.insert(target);
                        self.walk(
                            target,
                            depth + 1,
                            Some(scope),
                            instruction.is_conditional_jump(),
                            pendings.clone(),
                            visited,
                            scope_depths,
                            out,
                        );
                    }
                }
            }

            parent_scope = Some(instruction.scope);
            last_was_conditional = instruction.is_conditional_jump();
        }
    }

    /// For a `goto`, the depth of the scope containing the instruction id it
    /// jumps back to.
    fn return_depth(
        &self,
        instruction: &Instruction,
        scope_depths: &HashMap<u32, usize>,
    ) -> Option<usize> {
        if instruction.opcode != Opcode::Goto {
            return None;
        }
        let target_id: u32 = instruction.inputs.first()?.parse().ok()?;
        let target_scope = self.id_scopes.get(&target_id)?;
        scope_depths.get(target_scope).copied()
    }
}

// ─── Pending loop-header state ────────────────────────────────────

/// Probe/check state carried from earlier siblings into following nodes,
/// copy-on-branch: a child block inherits the current pendings but its own
/// updates stay inside it.
#[derive(Debug, Clone, Default)]
struct Pendings {
    probe: Option<PendingProbe>,
    check: Option<PendingCheck>,
}

impl Pendings {
    fn observe(&mut self, instruction: &Instruction) {
        match instruction.opcode {
            Opcode::Evaluate => {
                if instruction.inputs.first().map(String::as_str) == Some("start") {
                    if let Some(assign) = &instruction.assign {
                        self.probe = Some(PendingProbe {
                            guard: assign.clone(),
                            binding: assign.clone(),
                        });
                    }
                }
            }
            Opcode::EndOfIterationCheck => {
                if let (Some(assign), Some(binding), Some(iterator)) = (
                    instruction.assign.as_ref(),
                    instruction.inputs.first(),
                    instruction.inputs.get(1),
                ) {
                    self.check = Some(PendingCheck {
                        guard: assign.clone(),
                        binding: binding.clone(),
                        iterator: iterator.clone(),
                    });
                }
            }
            Opcode::Jump => {
                // A guarded jump consumes the pending entry it matches.
                if let Some(guard) = instruction.inputs.first() {
                    if self.check.as_ref().map(|c| &c.guard) == Some(guard) {
                        self.check = None;
                    } else if self.probe.as_ref().map(|p| &p.guard) == Some(guard) {
                        self.probe = None;
                    }
                }
            }
            _ => {}
        }
    }
}
