//! The flat, scope-annotated instruction stream and its containers.
//!
//! Everything here arrives pre-parsed from the DSL front end; the backend
//! consumes it read-only. Control flow is not structural at this level:
//! conditionals and loops exist only as scope ids plus `jump`/`goto`
//! instructions, and the `scope` module recovers the block tree from them.

mod opcode;

use serde::{Deserialize, Serialize};

pub use opcode::Opcode;

/// The function-wide sentinel the front end assigns a function's eventual
/// return value to. It is declared once by the function renderer and only
/// ever reassigned afterwards.
pub const RESULT_BINDING: &str = "Thing_to_return";

/// Separator between a binding name and an optional declared type in an
/// assignment target (e.g. `count|||Integer`).
pub const TYPED_ASSIGN_SEPARATOR: &str = "|||";

// ─── Instructions ─────────────────────────────────────────────────

/// One IR instruction. Immutable once parsed: reclassification derives new
/// values rather than mutating.
///
/// `id` is unique within a function and is what backward `goto`s target.
/// `scope` places the instruction in the scope tree (0 = function root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub inputs: Vec<String>,
    pub assign: Option<String>,
    pub scope: u32,
    pub id: u32,
}

impl Instruction {
    pub fn new(
        opcode: Opcode,
        inputs: Vec<String>,
        assign: Option<String>,
        scope: u32,
        id: u32,
    ) -> Self {
        Self {
            opcode,
            inputs,
            assign,
            scope,
            id,
        }
    }

    /// True when this is a `jump` carrying both a guard and a target scope.
    pub fn is_conditional_jump(&self) -> bool {
        self.opcode == Opcode::Jump && self.inputs.len() >= 2
    }

    /// The scope id a `jump` enters, if its inputs designate one.
    /// Conditional jumps carry `(guard, target)`, bare jumps `(target)`.
    pub fn jump_target(&self) -> Option<u32> {
        if self.opcode != Opcode::Jump {
            return None;
        }
        match self.inputs.len() {
            1 => self.inputs[0].parse().ok(),
            n if n >= 2 => self.inputs[1].parse().ok(),
            _ => None,
        }
    }
}

// ─── Functions ────────────────────────────────────────────────────

/// A typed function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,
    pub type_name: String,
}

/// One contract function: interface method or free-standing helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<FunctionArg>,
    /// Declared output type, in IR type names. `None` for unit functions.
    pub output: Option<String>,
    pub instructions: Vec<Instruction>,
    /// Helpers render at the file level; interface methods inside the
    /// contract impl block (one extra level of indentation).
    #[serde(default)]
    pub is_helper: bool,
}

// ─── User-defined types ───────────────────────────────────────────

/// Whether a user-defined type declares a struct or an enum, carried as a
/// suffix on the registered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UdtKind {
    Struct,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdtField {
    pub name: String,
    /// A type name for struct fields, a literal discriminant for enum
    /// variants.
    pub type_name: String,
}

/// A struct- or enum-shaped type declared by the contract, resolved by name
/// when an `instantiate_object` of kind `UDT` references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDefinedType {
    /// Registered name, suffixed `_STRUCT` or `_ENUM` to mark the kind.
    pub name: String,
    pub fields: Vec<UdtField>,
}

impl UserDefinedType {
    pub fn kind(&self) -> UdtKind {
        if self.name.ends_with("_ENUM") {
            UdtKind::Enum
        } else {
            UdtKind::Struct
        }
    }

    /// The name with its kind suffix stripped, which is what instruction
    /// inputs and the rendered Rust refer to.
    pub fn base_name(&self) -> &str {
        self.name
            .strip_suffix("_STRUCT")
            .or_else(|| self.name.strip_suffix("_ENUM"))
            .unwrap_or(&self.name)
    }
}

// ─── Contract ─────────────────────────────────────────────────────

/// One contract-level state constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub type_name: String,
    pub initial_value: String,
}

/// A parsed contract. The backend reads it; the assembler collaborator owns
/// document-level concerns (imports, state constants, type declarations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub name: String,
    pub state: Option<Vec<State>>,
    pub interface: Vec<Function>,
    pub user_defined_types: Option<Vec<UserDefinedType>>,
    pub helpers: Option<Vec<Function>>,
    /// Raw target-language text the front end passes through untranslated.
    pub non_translatables: Option<String>,
}

impl Contract {
    /// Names callable with a `Self::` prefix from inside the contract impl.
    pub fn function_names(&self) -> Vec<String> {
        self.interface
            .iter()
            .chain(self.helpers.iter().flatten())
            .map(|f| f.name.clone())
            .collect()
    }
}
