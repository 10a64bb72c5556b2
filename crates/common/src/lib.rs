//! Strata common types and instruction encoding.
//!
//! This crate provides the foundational data structures shared by the
//! Strata engine, the module loader, and the native code generator:
//!
//! - [`Opcode`] — the 17-opcode instruction set
//! - [`Instruction`] — the packed 32-bit word with encode/decode
//! - [`Comparison`] — conditional-jump relation semantics
//! - [`FunctionSpec`] — function metadata and the frame-layout contract
//!   both execution tiers consume
//! - [`DecodeError`] — errors at the word-format ABI boundary
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod error;
pub mod function;
pub mod instruction;
pub mod opcode;

/// One machine word: the VM's only value representation. Holds a signed
/// integer or an opaque reference (for example a string-constant handle).
/// Arithmetic and comparisons use signed semantics.
pub type StackElement = i64;

/// A decoded instruction parameter. Stored in a 24-bit field; read back
/// sign-extended as a jump delta or zero-extended as a table index.
pub type Parameter = i32;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use function::FunctionSpec;
pub use instruction::Instruction;
pub use opcode::{Comparison, Opcode};
