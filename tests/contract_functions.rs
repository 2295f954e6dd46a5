//! End-to-end rendering through the public API: a whole contract's worth of
//! functions, interface and helper, with control-flow reconstruction and
//! UDT resolution in one place.

use soroban_rust_backend::ir::{FunctionArg, UdtField};
use soroban_rust_backend::{
    render_contract_functions, CodegenError, Contract, Function, Instruction, Opcode,
    UserDefinedType,
};

fn ins(opcode: Opcode, inputs: &[&str], assign: Option<&str>, scope: u32, id: u32) -> Instruction {
    Instruction::new(
        opcode,
        inputs.iter().map(|s| s.to_string()).collect(),
        assign.map(str::to_string),
        scope,
        id,
    )
}

fn arg(name: &str, type_name: &str) -> FunctionArg {
    FunctionArg {
        name: name.to_string(),
        type_name: type_name.to_string(),
    }
}

#[test]
fn renders_interface_and_helper_functions() {
    let contract = Contract {
        name: "LogIfAnswerToLife".to_string(),
        state: None,
        interface: vec![Function {
            name: "fourty_two_and_then_some".to_string(),
            inputs: vec![arg("env", "Env"), arg("possibly_the_answer_to_life", "Integer")],
            output: None,
            instructions: vec![
                ins(
                    Opcode::Evaluate,
                    &["equal_to", "possibly_the_answer_to_life", "ANSWER_TO_LIFE"],
                    Some("UNARY_ARGUMENT_0"),
                    0,
                    0,
                ),
                ins(
                    Opcode::Evaluate,
                    &["!", "UNARY_ARGUMENT_0"],
                    Some("CONDITIONAL_JUMP_ASSIGNMENT"),
                    0,
                    1,
                ),
                ins(
                    Opcode::Jump,
                    &["CONDITIONAL_JUMP_ASSIGNMENT", "1"],
                    None,
                    0,
                    2,
                ),
                ins(
                    Opcode::Evaluate,
                    &["log_to_env", "env", "\"Yes, the answer to life is 42!\""],
                    None,
                    1,
                    3,
                ),
            ],
            is_helper: false,
        }],
        user_defined_types: None,
        helpers: Some(vec![Function {
            name: "log_to_env".to_string(),
            inputs: vec![arg("env", "Env"), arg("message", "String")],
            output: None,
            instructions: vec![ins(Opcode::Print, &["env", "message"], None, 0, 0)],
            is_helper: true,
        }]),
        non_translatables: None,
    };

    let rendered = render_contract_functions(&contract).unwrap();
    assert_eq!(rendered.len(), 2);

    let expected_interface = "
    pub fn fourty_two_and_then_some(env: Env, possibly_the_answer_to_life: i128) {
        let UNARY_ARGUMENT_0 = possibly_the_answer_to_life == ANSWER_TO_LIFE;
        let CONDITIONAL_JUMP_ASSIGNMENT = !(UNARY_ARGUMENT_0);
        if CONDITIONAL_JUMP_ASSIGNMENT {
            Self::log_to_env(&env, \"Yes, the answer to life is 42!\");
        }
    }
";
    assert_eq!(rendered[0], expected_interface);

    let expected_helper = "
pub fn log_to_env(env: Env, message: String) {
    log!(&env, message);
}
";
    assert_eq!(rendered[1], expected_helper);
}

#[test]
fn renders_branching_result_function_with_udt_registry() {
    let contract = Contract {
        name: "IncrementContract".to_string(),
        state: None,
        interface: vec![Function {
            name: "hello".to_string(),
            inputs: vec![arg("env", "Env")],
            output: Some("Result<i128, Error>".to_string()),
            instructions: vec![
                ins(Opcode::Add, &["count", "1"], Some("count"), 0, 18),
                ins(
                    Opcode::Evaluate,
                    &["less_than_or_equal_to", "count", "MAX"],
                    Some("CONDITIONAL_JUMP_ASSIGNMENT_19"),
                    0,
                    24,
                ),
                ins(
                    Opcode::Jump,
                    &["CONDITIONAL_JUMP_ASSIGNMENT_19", "25"],
                    None,
                    0,
                    26,
                ),
                ins(Opcode::Jump, &["44"], None, 0, 45),
                ins(
                    Opcode::Evaluate,
                    &["Ok", "count"],
                    Some("Thing_to_return"),
                    25,
                    42,
                ),
                ins(Opcode::Jump, &["0"], None, 25, 43),
                ins(
                    Opcode::Evaluate,
                    &["Err", "Error::LimitReached"],
                    Some("Thing_to_return"),
                    44,
                    50,
                ),
                ins(Opcode::Jump, &["0"], None, 44, 51),
                ins(Opcode::Return, &["Thing_to_return"], None, 0, 52),
            ],
            is_helper: false,
        }],
        user_defined_types: Some(vec![UserDefinedType {
            name: "Error_ENUM".to_string(),
            fields: vec![UdtField {
                name: "LimitReached".to_string(),
                type_name: "1".to_string(),
            }],
        }]),
        helpers: None,
        non_translatables: None,
    };

    // `count` is not a parameter here, so its first assignment declares it.
    let rendered = render_contract_functions(&contract).unwrap();
    let expected = "
    pub fn hello(env: Env) -> Result<i128, Error> {
        let mut Thing_to_return: Result<i128, Error>;
        let mut count = count + 1;
        let CONDITIONAL_JUMP_ASSIGNMENT_19 = count <= MAX;
        if CONDITIONAL_JUMP_ASSIGNMENT_19 {
            Thing_to_return = Ok(count);
        }
        else {
            Thing_to_return = Err(Error::LimitReached);
        }
        return Thing_to_return;
    }
";
    assert_eq!(rendered[0], expected);
}

#[test]
fn unresolved_udt_aborts_the_whole_contract() {
    let contract = Contract {
        name: "Broken".to_string(),
        state: None,
        interface: vec![Function {
            name: "make".to_string(),
            inputs: vec![],
            output: None,
            instructions: vec![ins(
                Opcode::InstantiateObject,
                &["UDT", "Nope", "x"],
                Some("v"),
                0,
                0,
            )],
            is_helper: false,
        }],
        user_defined_types: Some(vec![]),
        helpers: None,
        non_translatables: None,
    };

    assert_eq!(
        render_contract_functions(&contract).unwrap_err(),
        CodegenError::UnresolvedType("Nope".to_string())
    );
}
