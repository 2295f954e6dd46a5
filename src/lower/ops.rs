//! Per-opcode lowering: one IR instruction in, one line of Rust out.
//!
//! Dispatch is a single exhaustive match over `Opcode`; the handlers share
//! the assignment-formatting rule (declare once, reassign after) and the
//! reference-marker resolution from `refs`. Indentation is not applied
//! here; the generator prepends it per block depth.

use crate::error::{CodegenError, Result};
use crate::ir::{Instruction, Opcode, UserDefinedType, RESULT_BINDING, TYPED_ASSIGN_SEPARATOR};
use crate::lower::classify::JumpShape;
use crate::lower::input::{self, InputKind};
use crate::lower::refs::{self, RefPolicy};
use crate::scope::SymbolTable;
use crate::types::translate_type;

/// Read-only lookups shared by every handler.
pub struct LowerCtx<'a> {
    pub user_defined_types: &'a [UserDefinedType],
    pub function_names: &'a [String],
    pub policy: &'a RefPolicy,
}

/// Lower one non-jump instruction to a line of Rust (possibly empty for
/// opcodes that only feed metadata).
pub fn lower(
    instruction: &Instruction,
    symbols: &mut SymbolTable,
    ctx: &LowerCtx<'_>,
) -> Result<String> {
    match instruction.opcode {
        Opcode::Add => binary(instruction, "+", symbols),
        Opcode::Subtract => binary(instruction, "-", symbols),
        Opcode::Multiply => binary(instruction, "*", symbols),
        Opcode::Divide => binary(instruction, "/", symbols),
        Opcode::And => logical(instruction, "&&", symbols),
        Opcode::Or => logical(instruction, "||", symbols),
        Opcode::Evaluate => evaluate(instruction, symbols, ctx),
        Opcode::InstantiateObject => instantiate(instruction, symbols, ctx),
        Opcode::Assign => assign(instruction, symbols),
        Opcode::Field => field(instruction, symbols),
        Opcode::Return => ret(instruction),
        Opcode::Print => print(instruction),
        Opcode::ExitWithMessage => exit_with_message(instruction),
        Opcode::Increment => increment(instruction),
        Opcode::Break => Ok("break;".to_string()),
        // Consumed as loop-header metadata; nothing to render.
        Opcode::EndOfIterationCheck | Opcode::Label => Ok(String::new()),
        // Jump-family nodes are rendered via `jump_header` by the generator.
        Opcode::Jump | Opcode::Goto => Ok(String::new()),
    }
}

/// The line a reclassified jump renders as.
pub fn jump_header(shape: &JumpShape) -> String {
    match shape {
        JumpShape::If { guard } => format!("if {guard} {{"),
        JumpShape::ElseIf { guard } => format!("else if {guard} {{"),
        JumpShape::Else => "else {".to_string(),
        JumpShape::WhileLet { binding } => {
            format!("while let Some({binding}) = OPTION_{binding} {{")
        }
        JumpShape::LoopClose { .. } => "}".to_string(),
        JumpShape::Exit => String::new(),
    }
}

// ─── Assignment formatting ────────────────────────────────────────

/// How a fresh binding is declared when the target is new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindStyle {
    /// `let mut name = ...` for values that may be reassigned or mutated.
    Mutable,
    /// `let name = ...` for comparison and logical results.
    Immutable,
}

/// Apply the declare-once rule: a name already in the symbol table, a dotted
/// path, or the reserved result binding is reassigned; anything else becomes
/// a new binding and joins the table. A `name|||Type` target declares with
/// an explicit translated type.
fn render_assignment(
    target: Option<&str>,
    value: String,
    symbols: &mut SymbolTable,
    style: BindStyle,
) -> String {
    let Some(raw) = target else {
        return format!("{value};");
    };
    let (name, declared_type) = match raw.split_once(TYPED_ASSIGN_SEPARATOR) {
        Some((name, type_name)) => (name, Some(type_name)),
        None => (raw, None),
    };

    if symbols.contains(name) || name.contains('.') || name == RESULT_BINDING {
        return format!("{name} = {value};");
    }

    symbols.bind(name);
    match (declared_type, style) {
        (Some(type_name), _) => {
            format!("let mut {name}: {} = {value};", translate_type(type_name))
        }
        (None, BindStyle::Mutable) => format!("let mut {name} = {value};"),
        (None, BindStyle::Immutable) => format!("let {name} = {value};"),
    }
}

// ─── Arithmetic and logic ─────────────────────────────────────────

fn binary(instruction: &Instruction, op: &str, symbols: &mut SymbolTable) -> Result<String> {
    let (wrap_ref, rest) = refs::split_leading_marker(&instruction.inputs);
    let inputs = refs::resolve_markers(rest);
    let lhs = inputs.first().cloned().unwrap_or_default();
    let rhs = inputs.get(1).cloned().unwrap_or_default();
    let value = if wrap_ref {
        format!("&({lhs} {op} {rhs})")
    } else {
        format!("{lhs} {op} {rhs}")
    };
    Ok(render_assignment(
        instruction.assign.as_deref(),
        value,
        symbols,
        BindStyle::Mutable,
    ))
}

fn logical(instruction: &Instruction, op: &str, symbols: &mut SymbolTable) -> Result<String> {
    let inputs = refs::resolve_markers(&instruction.inputs);
    let lhs = inputs.first().cloned().unwrap_or_default();
    let rhs = inputs.get(1).cloned().unwrap_or_default();
    Ok(render_assignment(
        instruction.assign.as_deref(),
        format!("{lhs} {op} {rhs}"),
        symbols,
        BindStyle::Immutable,
    ))
}

// ─── Evaluate ─────────────────────────────────────────────────────

/// The closed set of keyword verbs an `evaluate` dispatches on. Anything
/// outside the set is a general invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    EqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    NotEqualTo,
    Negate,
    Start,
    Invoke,
}

impl Verb {
    fn parse(token: &str) -> Self {
        match token {
            "equal_to" => Verb::EqualTo,
            "less_than" => Verb::LessThan,
            "less_than_or_equal_to" => Verb::LessThanOrEqualTo,
            "greater_than" => Verb::GreaterThan,
            "greater_than_or_equal_to" => Verb::GreaterThanOrEqualTo,
            "not_equal_to" => Verb::NotEqualTo,
            "!" => Verb::Negate,
            "start" => Verb::Start,
            _ => Verb::Invoke,
        }
    }

    fn comparison_operator(&self) -> Option<&'static str> {
        match self {
            Verb::EqualTo => Some("=="),
            Verb::LessThan => Some("<"),
            Verb::LessThanOrEqualTo => Some("<="),
            Verb::GreaterThan => Some(">"),
            Verb::GreaterThanOrEqualTo => Some(">="),
            Verb::NotEqualTo => Some("!="),
            _ => None,
        }
    }
}

fn evaluate(
    instruction: &Instruction,
    symbols: &mut SymbolTable,
    ctx: &LowerCtx<'_>,
) -> Result<String> {
    let (wrap_ref, rest) = refs::split_leading_marker(&instruction.inputs);
    let inputs = refs::resolve_markers(rest);
    let Some(head) = inputs.first() else {
        return Ok(String::new());
    };

    let verb = Verb::parse(head);
    if let Some(op) = verb.comparison_operator() {
        let lhs = inputs.get(1).cloned().unwrap_or_default();
        let rhs = inputs.get(2).cloned().unwrap_or_default();
        return Ok(render_assignment(
            instruction.assign.as_deref(),
            format!("{lhs} {op} {rhs}"),
            symbols,
            BindStyle::Immutable,
        ));
    }

    match verb {
        Verb::Negate => {
            let operand = inputs.get(1).cloned().unwrap_or_default();
            Ok(render_assignment(
                instruction.assign.as_deref(),
                format!("!({operand})"),
                symbols,
                BindStyle::Immutable,
            ))
        }
        Verb::Start => match &instruction.assign {
            // Probe the iterator's first value into an optional binding;
            // the reclassifier pairs it with the loop jump that follows.
            Some(binding) => {
                let iterator = inputs.get(1).cloned().unwrap_or_default();
                symbols.bind(&format!("OPTION_{binding}"));
                Ok(format!("let mut OPTION_{binding} = {iterator}.next();"))
            }
            None => invocation(instruction, &inputs, wrap_ref, symbols, ctx),
        },
        _ => invocation(instruction, &inputs, wrap_ref, symbols, ctx),
    }
}

fn invocation(
    instruction: &Instruction,
    inputs: &[String],
    wrap_ref: bool,
    symbols: &mut SymbolTable,
    ctx: &LowerCtx<'_>,
) -> Result<String> {
    let callee = inputs[0].as_str();
    let qualified = if ctx.function_names.iter().any(|name| name.as_str() == callee) {
        format!("Self::{callee}")
    } else {
        callee.to_string()
    };

    let suppress_refs = ctx.policy.suppresses(callee);
    let args = inputs[1..]
        .iter()
        .map(|arg| {
            if suppress_refs {
                arg.clone()
            } else {
                refs::decorate_env(arg)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let call = format!("{qualified}({args})");
    let value = if wrap_ref { format!("&{call}") } else { call };
    Ok(render_assignment(
        instruction.assign.as_deref(),
        value,
        symbols,
        BindStyle::Mutable,
    ))
}

// ─── Object instantiation ─────────────────────────────────────────

/// The closed set of composite kinds `instantiate_object` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectKind {
    List,
    Tuple,
    Range,
    Udt,
}

impl ObjectKind {
    fn parse(token: &str) -> Result<Self> {
        match token {
            "List" => Ok(ObjectKind::List),
            "Tuple" => Ok(ObjectKind::Tuple),
            "Range" => Ok(ObjectKind::Range),
            "UDT" => Ok(ObjectKind::Udt),
            other => Err(CodegenError::UnknownObjectKind(other.to_string())),
        }
    }
}

fn instantiate(
    instruction: &Instruction,
    symbols: &mut SymbolTable,
    ctx: &LowerCtx<'_>,
) -> Result<String> {
    let (wrap_ref, rest) = refs::split_leading_marker(&instruction.inputs);
    let inputs = refs::resolve_markers(rest);
    let head = inputs
        .first()
        .ok_or_else(|| CodegenError::UnknownObjectKind(String::new()))?;

    let value = match ObjectKind::parse(head)? {
        ObjectKind::List => format!("vec![{}]", render_values(&inputs[1..], ", ")),
        ObjectKind::Tuple => format!("({})", render_values(&inputs[1..], ", ")),
        ObjectKind::Range => render_values(&inputs[1..], ".."),
        ObjectKind::Udt => {
            let name = inputs
                .get(1)
                .ok_or_else(|| CodegenError::UnresolvedType(String::new()))?;
            let udt = ctx
                .user_defined_types
                .iter()
                .find(|udt| udt.base_name() == name.as_str() || udt.name == name.as_str())
                .ok_or_else(|| CodegenError::UnresolvedType(name.clone()))?;
            let fields = udt
                .fields
                .iter()
                .zip(inputs[2..].iter())
                .map(|(field, value)| format!("{}: {}", field.name, render_value(value)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{name}{{{fields}}}")
        }
    };

    let value = if wrap_ref { format!("&{value}") } else { value };
    Ok(render_assignment(
        instruction.assign.as_deref(),
        value,
        symbols,
        BindStyle::Mutable,
    ))
}

/// String literals bind through the environment's string constructor; the
/// environment handle itself is referenced; everything else passes through.
fn render_value(token: &str) -> String {
    if input::interpret(token).kind == InputKind::StringLiteral {
        format!("String::from_str(&env, {token})")
    } else {
        refs::decorate_env(token)
    }
}

fn render_values(tokens: &[String], separator: &str) -> String {
    tokens
        .iter()
        .map(|token| render_value(token))
        .collect::<Vec<_>>()
        .join(separator)
}

// ─── Simple statements ────────────────────────────────────────────

fn assign(instruction: &Instruction, symbols: &mut SymbolTable) -> Result<String> {
    let inputs = refs::resolve_markers(&instruction.inputs);
    let value = inputs.first().cloned().unwrap_or_default();
    Ok(render_assignment(
        instruction.assign.as_deref(),
        value,
        symbols,
        BindStyle::Mutable,
    ))
}

fn field(instruction: &Instruction, symbols: &mut SymbolTable) -> Result<String> {
    let inputs = refs::resolve_markers(&instruction.inputs);
    match (&instruction.assign, inputs.len()) {
        // Field read into a binding.
        (Some(target), n) if n >= 2 => Ok(render_assignment(
            Some(target),
            format!("{}.{}", inputs[0], inputs[1]),
            symbols,
            BindStyle::Mutable,
        )),
        // Dotted-path write.
        (None, n) if n >= 3 => Ok(format!("{}.{} = {};", inputs[0], inputs[1], inputs[2])),
        _ => Ok(format!("{};", inputs.join("."))),
    }
}

fn ret(instruction: &Instruction) -> Result<String> {
    let inputs = refs::resolve_markers(&instruction.inputs);
    Ok(format!(
        "return {};",
        inputs.first().cloned().unwrap_or_default()
    ))
}

fn print(instruction: &Instruction) -> Result<String> {
    let inputs = refs::resolve_markers(&instruction.inputs);
    let args = inputs
        .iter()
        .map(|token| refs::decorate_env(token))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("log!({args});"))
}

fn exit_with_message(instruction: &Instruction) -> Result<String> {
    let inputs = refs::resolve_markers(&instruction.inputs);
    let args = inputs
        .iter()
        .map(|token| refs::decorate_env(token))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("panic!({args});"))
}

fn increment(instruction: &Instruction) -> Result<String> {
    let binding = instruction.inputs.first().cloned().unwrap_or_default();
    let iterator = instruction.inputs.get(1).cloned().unwrap_or_default();
    Ok(format!("OPTION_{binding} = {iterator}.next();"))
}
