//! The contract with the external native code generator.
//!
//! The generator is a collaborator, not part of this crate: given a
//! function's metadata it returns a callable handle. [`NativeCode`] is the
//! closed set of calling-convention shapes that handle may take, replacing
//! raw address casts with an explicit tag. The frame layout generated code
//! must honor under stack passing is the one in
//! [`strata_common::function`].

use crate::context::ExecutionContext;
use crate::error::RuntimeError;
use crate::module::Module;
use crate::CallingConvention;
use strata_common::{FunctionSpec, StackElement};
use thiserror::Error;

/// Register-passing entry points, one per supported arity.
pub type NativeArity0 = fn() -> StackElement;
pub type NativeArity1 = fn(StackElement) -> StackElement;
pub type NativeArity2 = fn(StackElement, StackElement) -> StackElement;
pub type NativeArity3 = fn(StackElement, StackElement, StackElement) -> StackElement;

/// Stack-passing entry point: the shared execution context, the module, and
/// the function's entry address. Arguments are already on the shared stack
/// at the usual frame offsets; the callee must leave the stack truncated to
/// its frame base and return the single result value.
pub type NativeStack =
    fn(&mut ExecutionContext, &Module, usize) -> Result<StackElement, RuntimeError>;

/// A generated native entry for one function.
///
/// Each variant documents its own argument-marshalling contract:
/// `Arity0..Arity3` receive arguments as direct parameters, popped off the
/// operand stack by the dispatcher, argument 0 first. `Stack` shares the
/// operand stack with the interpreter and is the only shape that can call
/// back into interpreted code.
#[derive(Debug, Clone, Copy)]
pub enum NativeCode {
    Arity0(NativeArity0),
    Arity1(NativeArity1),
    Arity2(NativeArity2),
    Arity3(NativeArity3),
    Stack(NativeStack),
}

/// Failure inside the native backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct NativeCodeError(pub String);

impl NativeCodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The external native code generator.
///
/// Invoked synchronously from the dispatch path and assumed not to re-enter
/// the virtual machine. `generate` is called at most once per function
/// index for the life of a virtual machine instance.
pub trait CodeGenerator {
    /// Bring up the native backend. Called once when the virtual machine is
    /// constructed; failure is fatal to the instance.
    fn initialize(&mut self) -> Result<(), NativeCodeError> {
        Ok(())
    }

    /// Tear down the native backend. Called when the virtual machine is
    /// dropped.
    fn shutdown(&mut self) {}

    /// Produce a native entry for `function` honoring `convention`.
    fn generate(
        &mut self,
        module: &Module,
        function: &FunctionSpec,
        convention: CallingConvention,
    ) -> Result<NativeCode, NativeCodeError>;
}
