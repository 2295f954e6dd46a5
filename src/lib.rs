//! Soroban Rust backend: lowers a flat, scope-annotated, jump-based
//! smart-contract IR into structured Rust source text.
//!
//! The pipeline per function: the `scope` module recovers a block forest
//! from scope ids and jump/goto instructions, `lower` reclassifies each
//! jump into its structural intent and renders every instruction to one
//! line, and `function` wraps the body with a signature and result binding.
//! Parsing the IR's textual form and assembling the full contract document
//! are collaborator concerns and live outside this crate.

pub mod error;
pub mod function;
pub mod ir;
pub mod lower;
pub mod scope;
pub mod types;

pub use error::{CodegenError, Result};
pub use function::FunctionRenderer;
pub use ir::{Contract, Function, Instruction, Opcode, UserDefinedType};
pub use lower::{CodeGenerator, RefPolicy};

/// Render every function of a contract, interface methods first, helpers
/// after, in declaration order. Any fatal error aborts the whole contract:
/// a function whose IR cannot be resolved produces no partial text.
pub fn render_contract_functions(contract: &Contract) -> Result<Vec<String>> {
    let function_names = contract.function_names();
    let user_defined_types = contract.user_defined_types.as_deref().unwrap_or(&[]);

    contract
        .interface
        .iter()
        .chain(contract.helpers.iter().flatten())
        .map(|function| {
            FunctionRenderer::new(function, user_defined_types, &function_names).render()
        })
        .collect()
}
