//! Strata virtual machine — tiered execution of stack bytecode.
//!
//! The engine runs each function through one of two tiers: a baseline
//! interpreter ([`ExecutionContext`]) or native code produced by an
//! external [`CodeGenerator`], cached per function and callable
//! interchangeably because both tiers honor one frame-layout contract.
//!
//! # Usage
//!
//! ```
//! use strata_common::{FunctionSpec, Instruction, Opcode};
//! use strata_vm::{Config, Module, VirtualMachine};
//!
//! let code = vec![
//!     Instruction::new(Opcode::PushFromVar, 0).unwrap(),
//!     Instruction::new(Opcode::PushFromVar, 1).unwrap(),
//!     Instruction::new(Opcode::IntAdd, 0).unwrap(),
//!     Instruction::new(Opcode::FunctionReturn, 0).unwrap(),
//! ];
//! let module = Module::new(
//!     vec![FunctionSpec::new(0, "add", 2, 2, 0)],
//!     vec![],
//!     vec![],
//!     code,
//! );
//!
//! let mut vm = VirtualMachine::new(Config::default()).unwrap();
//! vm.load(&module);
//! assert_eq!(vm.run("add", &[3, 4]).unwrap(), 7);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod machine;
pub mod module;
pub mod native;

pub use config::{CallingConvention, Config};
pub use context::ExecutionContext;
pub use error::RuntimeError;
pub use machine::VirtualMachine;
pub use module::{Module, PrimitiveFunction};
pub use native::{CodeGenerator, NativeCode, NativeCodeError};
