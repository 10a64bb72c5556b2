//! Engine configuration.

/// How arguments cross into generated native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// Up to 3 arguments are popped off the operand stack and passed as
    /// direct native parameters. Functions with more arguments are
    /// rejected, never truncated.
    RegisterPassing,
    /// Native code receives the shared execution context and the entry
    /// address, and reads its arguments from the shared stack. The only
    /// convention under which native code can transparently call back into
    /// interpreted code, because both tiers share one frame layout.
    StackPassing,
}

/// Default operand-stack capacity, in slots.
pub const DEFAULT_STACK_CAPACITY: usize = 4096;

/// Default bound on nested FUNCTION_CALL depth.
pub const DEFAULT_CALL_DEPTH_LIMIT: usize = 256;

/// Configuration recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Turn on tier 2: lazily generate and run native code.
    pub native_tier_enabled: bool,
    /// Calling convention used when dispatching to native code.
    pub calling_convention: CallingConvention,
    /// Maximum operand-stack depth. The stack is allocated once at this
    /// capacity and never reallocated.
    pub stack_capacity: usize,
    /// Maximum nested call depth before execution fails.
    pub call_depth_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            native_tier_enabled: false,
            calling_convention: CallingConvention::StackPassing,
            stack_capacity: DEFAULT_STACK_CAPACITY,
            call_depth_limit: DEFAULT_CALL_DEPTH_LIMIT,
        }
    }
}
