//! Runtime errors for the Strata engine.
//!
//! Recoverable conditions (arity mismatches, unresolvable indices, the
//! bounds checks on the operand stack) surface to the `run` caller, who may
//! keep using the virtual machine. `MalformedBytecode` marks a
//! loader/compiler defect upstream and `NativeTierInit` a failed
//! construction; neither leaves the instance in a usable state. Nothing is
//! silently absorbed.

use thiserror::Error;

/// Errors reported by the virtual machine and execution context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `run` was called with the wrong number of arguments. The operand
    /// stack is untouched when this is reported.
    #[error("{function}: got {got} arguments, expected {expected}")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// No function with the given name exists in the loaded module.
    #[error("no function named {name:?}")]
    FunctionNotFound { name: String },

    /// Function index beyond the module's function table.
    #[error("function index {index} out of range (module has {count} functions)")]
    FunctionIndexOutOfRange { index: usize, count: usize },

    /// String-constant index beyond the module's string table.
    #[error("string index {index} out of range (module has {count} strings)")]
    StringIndexOutOfRange { index: usize, count: usize },

    /// Primitive index beyond the module's primitive table.
    #[error("primitive index {index} out of range (module has {count} primitives)")]
    PrimitiveIndexOutOfRange { index: usize, count: usize },

    /// The program counter left the module's code section, by a jump or by
    /// running past the end without FUNCTION_RETURN.
    #[error("program counter {pc} outside code section")]
    PcOutOfRange { pc: usize },

    /// `run` was called before `load`.
    #[error("no module loaded")]
    NoModuleLoaded,

    /// Push onto a full operand stack.
    #[error("stack overflow at instruction {at} (capacity {limit})")]
    StackOverflow { at: usize, limit: usize },

    /// Pop from an empty operand stack.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// Nested FUNCTION_CALLs exceeded the configured recursion bound.
    #[error("call depth exceeded limit {limit}")]
    CallDepthExceeded { limit: usize },

    /// PUSH_FROM_VAR / POP_INTO_VAR offset outside the current frame.
    #[error("frame offset {offset} out of range (frame has {nregs} slots) at instruction {at}")]
    FrameOffsetOutOfRange {
        at: usize,
        offset: usize,
        nregs: usize,
    },

    /// A function spec declares fewer total frame slots than arguments.
    #[error("{function}: frame declares {nregs} slots for {nargs} arguments")]
    InvalidFrameLayout {
        function: String,
        nargs: usize,
        nregs: usize,
    },

    /// Register-passing dispatch of a function the convention cannot carry:
    /// more than 3 arguments, or generated code whose shape does not match.
    #[error("register-passing convention cannot carry {nargs} arguments")]
    UnsupportedCallingConvention { nargs: usize },

    /// The interpreter fetched an unrecognized opcode. Indicates a
    /// loader/compiler defect upstream; not locally recoverable.
    #[error("malformed bytecode: unknown opcode {byte:#04x} at instruction {at}")]
    MalformedBytecode { at: usize, byte: u8 },

    /// The native tier was requested but could not be brought up. Fatal at
    /// construction: no virtual machine instance is produced.
    #[error("native tier initialization failed: {reason}")]
    NativeTierInit { reason: String },

    /// The external code generator failed to produce native code.
    #[error("code generation failed for {function}: {reason}")]
    CodeGeneration { function: String, reason: String },
}
