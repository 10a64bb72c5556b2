//! Loaded program representation.
//!
//! A [`Module`] is produced by an external loader and consumed read-only by
//! the engine: an ordered function table, an indexed string-constant table,
//! an indexed primitive table, and one shared code section that function
//! entry addresses point into.

use crate::context::ExecutionContext;
use crate::error::RuntimeError;
use strata_common::{FunctionSpec, Instruction};

/// An externally supplied native function invokable from bytecode via
/// PRIMITIVE_CALL. Receives the execution context as its sole argument and
/// manages its own operand consumption and production.
pub type PrimitiveFunction = fn(&mut ExecutionContext) -> Result<(), RuntimeError>;

/// A loaded Strata program.
#[derive(Debug)]
pub struct Module {
    functions: Vec<FunctionSpec>,
    strings: Vec<String>,
    primitives: Vec<PrimitiveFunction>,
    code: Vec<Instruction>,
}

impl Module {
    pub fn new(
        functions: Vec<FunctionSpec>,
        strings: Vec<String>,
        primitives: Vec<PrimitiveFunction>,
        code: Vec<Instruction>,
    ) -> Self {
        Self {
            functions,
            strings,
            primitives,
            code,
        }
    }

    /// Resolve a function by name to its table index.
    pub fn function_index(&self, name: &str) -> Result<usize, RuntimeError> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| RuntimeError::FunctionNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a function by table index.
    pub fn function(&self, index: usize) -> Result<&FunctionSpec, RuntimeError> {
        self.functions
            .get(index)
            .ok_or(RuntimeError::FunctionIndexOutOfRange {
                index,
                count: self.functions.len(),
            })
    }

    /// The full function table, in load order.
    pub fn functions(&self) -> &[FunctionSpec] {
        &self.functions
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Look up a string constant.
    pub fn string(&self, index: usize) -> Result<&str, RuntimeError> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(RuntimeError::StringIndexOutOfRange {
                index,
                count: self.strings.len(),
            })
    }

    /// Look up a primitive function.
    pub fn primitive(&self, index: usize) -> Result<PrimitiveFunction, RuntimeError> {
        self.primitives
            .get(index)
            .copied()
            .ok_or(RuntimeError::PrimitiveIndexOutOfRange {
                index,
                count: self.primitives.len(),
            })
    }

    /// Fetch the instruction at `pc`.
    pub fn instruction(&self, pc: usize) -> Result<Instruction, RuntimeError> {
        self.code
            .get(pc)
            .copied()
            .ok_or(RuntimeError::PcOutOfRange { pc })
    }

    /// The shared code section.
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::Opcode;

    fn sample_module() -> Module {
        Module::new(
            vec![
                FunctionSpec::new(0, "first", 0, 0, 0),
                FunctionSpec::new(1, "second", 2, 2, 1),
            ],
            vec!["hello".to_string()],
            vec![],
            vec![
                Instruction::new(Opcode::FunctionReturn, 0).unwrap(),
                Instruction::new(Opcode::FunctionReturn, 0).unwrap(),
            ],
        )
    }

    #[test]
    fn function_resolution_by_name() {
        let module = sample_module();
        assert_eq!(module.function_index("second").unwrap(), 1);
        assert_eq!(
            module.function_index("missing"),
            Err(RuntimeError::FunctionNotFound {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn function_lookup_by_index() {
        let module = sample_module();
        assert_eq!(module.function(0).unwrap().name, "first");
        assert_eq!(
            module.function(9).unwrap_err(),
            RuntimeError::FunctionIndexOutOfRange { index: 9, count: 2 }
        );
    }

    #[test]
    fn string_lookup() {
        let module = sample_module();
        assert_eq!(module.string(0).unwrap(), "hello");
        assert_eq!(
            module.string(1).unwrap_err(),
            RuntimeError::StringIndexOutOfRange { index: 1, count: 1 }
        );
    }

    #[test]
    fn primitive_lookup_empty_table() {
        let module = sample_module();
        assert_eq!(
            module.primitive(0).unwrap_err(),
            RuntimeError::PrimitiveIndexOutOfRange { index: 0, count: 0 }
        );
    }

    #[test]
    fn instruction_fetch_bounds() {
        let module = sample_module();
        assert!(module.instruction(1).is_ok());
        assert_eq!(
            module.instruction(2).unwrap_err(),
            RuntimeError::PcOutOfRange { pc: 2 }
        );
    }
}
