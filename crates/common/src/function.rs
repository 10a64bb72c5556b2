//! Function metadata and the shared frame-layout contract.
//!
//! Both execution tiers — the interpreter and externally generated native
//! code — must agree byte-for-byte on how a call frame sits on the operand
//! stack. That layout is specified once, here:
//!
//! ```text
//! stack index:   frame          frame + nargs       frame + nregs
//!                  | arg 0 .. arg N-1 | local slots  |  <- operands grow up
//! ```
//!
//! - At call entry the caller has pushed exactly `nargs` values, so
//!   `frame = stack_depth - nargs` ([`FunctionSpec::frame_base`]).
//! - The callee reserves [`FunctionSpec::local_slots`] additional
//!   zero-initialized slots, bringing the frame to `nregs` slots total.
//! - Arguments and locals are addressed by offset from `frame`, valid in
//!   `[0, nregs)`; argument 0 is at offset 0.
//! - Returning truncates the stack to `frame`; the caller receives one
//!   result value.

/// Metadata for one loaded function. Immutable once the module is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    /// Position of this function in the module's function table.
    pub index: usize,
    /// Display name, used for resolution and diagnostics.
    pub name: String,
    /// Number of arguments the caller must push.
    pub nargs: usize,
    /// Total frame-slot count, arguments included. Never less than `nargs`
    /// in a well-formed module.
    pub nregs: usize,
    /// Entry instruction index into the module's code section.
    pub address: usize,
}

impl FunctionSpec {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        nargs: usize,
        nregs: usize,
        address: usize,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            nargs,
            nregs,
            address,
        }
    }

    /// Frame base for a call entered with the operand stack at
    /// `stack_depth`. `None` if fewer than `nargs` values are live.
    pub fn frame_base(&self, stack_depth: usize) -> Option<usize> {
        stack_depth.checked_sub(self.nargs)
    }

    /// Slots reserved above the arguments. `None` if `nregs < nargs`,
    /// which marks the spec as malformed.
    pub fn local_slots(&self) -> Option<usize> {
        self.nregs.checked_sub(self.nargs)
    }
}
