//! Errors for the Strata instruction word format.

use thiserror::Error;

/// Errors from encoding or decoding instruction words.
///
/// The word format is the binary ABI between the loader/compiler that
/// produces instruction streams and the engine's decoder; both sides must
/// reject the same inputs. `ParameterOutOfRange` is the construction-side
/// check of the same contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opcode 0x00 is illegal and always rejected.
    #[error("illegal opcode 0x00")]
    IllegalOpcode,

    /// Opcode falls in a reserved range.
    #[error("reserved opcode: {0:#04x}")]
    ReservedOpcode(u8),

    /// Parameter does not fit the 24-bit instruction field.
    #[error("parameter {0} does not fit in 24 bits")]
    ParameterOutOfRange(i32),

    /// Byte stream length is not a multiple of 4.
    #[error("invalid byte stream length: {0} (must be multiple of 4)")]
    InvalidLength(usize),
}
