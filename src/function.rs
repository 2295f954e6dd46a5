//! Renders one contract function: signature, result binding, body.
//!
//! Interface methods live inside the `#[contractimpl]` block and take one
//! level of base indentation (body at two); helpers render at file level
//! (body at one). The contract assembler concatenates the rendered
//! functions with everything document-level.

use tracing::debug;

use crate::error::Result;
use crate::ir::{Function, UserDefinedType, RESULT_BINDING};
use crate::lower::CodeGenerator;
use crate::types::translate_type;

pub struct FunctionRenderer<'a> {
    function: &'a Function,
    user_defined_types: &'a [UserDefinedType],
    function_names: &'a [String],
}

impl<'a> FunctionRenderer<'a> {
    pub fn new(
        function: &'a Function,
        user_defined_types: &'a [UserDefinedType],
        function_names: &'a [String],
    ) -> Self {
        Self {
            function,
            user_defined_types,
            function_names,
        }
    }

    pub fn render(&self) -> Result<String> {
        let function = self.function;
        debug!(name = %function.name, helper = function.is_helper, "rendering function");

        let outer = if function.is_helper { "" } else { "    " };
        let body_depth = if function.is_helper { 1 } else { 2 };

        let mut out = String::new();
        out.push('\n');
        out.push_str(outer);
        out.push_str(&format!("pub fn {}({})", function.name, self.render_args()));
        if let Some(output) = &function.output {
            out.push_str(&format!(" -> {}", translate_type(output)));
        }
        out.push_str(" {\n");

        if let Some(output) = &function.output {
            out.push_str(&"    ".repeat(body_depth));
            out.push_str(&format!(
                "let mut {RESULT_BINDING}: {};\n",
                translate_type(output)
            ));
        }

        let parameters: Vec<String> = function
            .inputs
            .iter()
            .map(|arg| arg.name.clone())
            .collect();
        let body = CodeGenerator::new(self.user_defined_types, self.function_names)
            .with_base_depth(body_depth)
            .generate(&function.instructions, &parameters)?;
        out.push_str(&body);

        out.push_str(outer);
        out.push_str("}\n");
        Ok(out)
    }

    fn render_args(&self) -> String {
        self.function
            .inputs
            .iter()
            .map(|arg| format!("{}: {}", arg.name, translate_type(&arg.type_name)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
