//! Opcode definitions for the Strata instruction set.

use crate::error::DecodeError;
use crate::StackElement;

/// Identifies the operation an instruction performs.
///
/// The `#[repr(u8)]` attribute pins each variant to a stable byte value;
/// the byte is the high octet of the packed instruction word.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Constants & stack
    /// Push the sign-extended immediate parameter.
    IntPushConstant = 0x01,
    /// Push an opaque reference to string-table entry `parameter`.
    StrPushConstant = 0x02,
    /// Discard the top of the operand stack.
    Drop = 0x03,

    // Integer arithmetic
    /// Pop b, pop a, push a + b (wrapping, signed).
    IntAdd = 0x10,
    /// Pop b, pop a, push a - b (wrapping, signed).
    IntSub = 0x11,

    // Control flow
    /// Unconditional jump: pc += parameter.
    Jmp = 0x20,
    /// Pop b, pop a; pc += parameter iff a == b.
    IntJmpEq = 0x21,
    /// Pop b, pop a; pc += parameter iff a != b.
    IntJmpNeq = 0x22,
    /// Pop b, pop a; pc += parameter iff a > b.
    IntJmpGt = 0x23,
    /// Pop b, pop a; pc += parameter iff a >= b.
    IntJmpGe = 0x24,
    /// Pop b, pop a; pc += parameter iff a < b.
    IntJmpLt = 0x25,
    /// Pop b, pop a; pc += parameter iff a <= b.
    IntJmpLe = 0x26,

    // Calls
    /// Run function `parameter` on the same stack; push its result.
    FunctionCall = 0x30,
    /// Invoke primitive `parameter` with the execution context.
    PrimitiveCall = 0x31,
    /// Result = top of stack; rewind the stack to the frame base; exit.
    FunctionReturn = 0x32,

    // Frame variables
    /// Push the value at frame offset `parameter`.
    PushFromVar = 0x40,
    /// Pop into the slot at frame offset `parameter`.
    PopIntoVar = 0x41,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 17] = [
    Opcode::IntPushConstant,
    Opcode::StrPushConstant,
    Opcode::Drop,
    Opcode::IntAdd,
    Opcode::IntSub,
    Opcode::Jmp,
    Opcode::IntJmpEq,
    Opcode::IntJmpNeq,
    Opcode::IntJmpGt,
    Opcode::IntJmpGe,
    Opcode::IntJmpLt,
    Opcode::IntJmpLe,
    Opcode::FunctionCall,
    Opcode::PrimitiveCall,
    Opcode::FunctionReturn,
    Opcode::PushFromVar,
    Opcode::PopIntoVar,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Err(DecodeError::IllegalOpcode),

            0x01 => Ok(Opcode::IntPushConstant),
            0x02 => Ok(Opcode::StrPushConstant),
            0x03 => Ok(Opcode::Drop),

            0x10 => Ok(Opcode::IntAdd),
            0x11 => Ok(Opcode::IntSub),

            0x20 => Ok(Opcode::Jmp),
            0x21 => Ok(Opcode::IntJmpEq),
            0x22 => Ok(Opcode::IntJmpNeq),
            0x23 => Ok(Opcode::IntJmpGt),
            0x24 => Ok(Opcode::IntJmpGe),
            0x25 => Ok(Opcode::IntJmpLt),
            0x26 => Ok(Opcode::IntJmpLe),

            0x30 => Ok(Opcode::FunctionCall),
            0x31 => Ok(Opcode::PrimitiveCall),
            0x32 => Ok(Opcode::FunctionReturn),

            0x40 => Ok(Opcode::PushFromVar),
            0x41 => Ok(Opcode::PopIntoVar),

            // Everything else is reserved for future instructions:
            // 0x04..=0x0F, 0x12..=0x1F, 0x27..=0x2F, 0x33..=0x3F, 0x42..=0xFF.
            _ => Err(DecodeError::ReservedOpcode(value)),
        }
    }
}

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::IntPushConstant => "INT_PUSH_CONSTANT",
            Opcode::StrPushConstant => "STR_PUSH_CONSTANT",
            Opcode::Drop => "DROP",
            Opcode::IntAdd => "INT_ADD",
            Opcode::IntSub => "INT_SUB",
            Opcode::Jmp => "JMP",
            Opcode::IntJmpEq => "INT_JMP_EQ",
            Opcode::IntJmpNeq => "INT_JMP_NEQ",
            Opcode::IntJmpGt => "INT_JMP_GT",
            Opcode::IntJmpGe => "INT_JMP_GE",
            Opcode::IntJmpLt => "INT_JMP_LT",
            Opcode::IntJmpLe => "INT_JMP_LE",
            Opcode::FunctionCall => "FUNCTION_CALL",
            Opcode::PrimitiveCall => "PRIMITIVE_CALL",
            Opcode::FunctionReturn => "FUNCTION_RETURN",
            Opcode::PushFromVar => "PUSH_FROM_VAR",
            Opcode::PopIntoVar => "POP_INTO_VAR",
        }
    }

    /// The relation tested by a conditional jump, `None` for other opcodes.
    pub fn comparison(&self) -> Option<Comparison> {
        match self {
            Opcode::IntJmpEq => Some(Comparison::Eq),
            Opcode::IntJmpNeq => Some(Comparison::Neq),
            Opcode::IntJmpGt => Some(Comparison::Gt),
            Opcode::IntJmpGe => Some(Comparison::Ge),
            Opcode::IntJmpLt => Some(Comparison::Lt),
            Opcode::IntJmpLe => Some(Comparison::Le),
            _ => None,
        }
    }
}

/// The six integer relations tested by conditional jumps.
///
/// Kept separate from the dispatch loop so branch outcomes are testable as
/// plain functions. All comparisons use signed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Neq,
    Gt,
    Ge,
    Lt,
    Le,
}

/// All six comparisons, for exhaustive testing.
pub const ALL_COMPARISONS: [Comparison; 6] = [
    Comparison::Eq,
    Comparison::Neq,
    Comparison::Gt,
    Comparison::Ge,
    Comparison::Lt,
    Comparison::Le,
];

impl Comparison {
    /// Whether the relation holds for `left` against `right`.
    pub fn holds(self, left: StackElement, right: StackElement) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Neq => left != right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 17);
    }

    #[test]
    fn roundtrip_all_valid_opcodes() {
        for &opcode in &ALL_OPCODES {
            let byte = opcode as u8;
            let decoded = Opcode::try_from(byte).unwrap();
            assert_eq!(
                opcode, decoded,
                "roundtrip failed for {opcode:?} ({byte:#04x})"
            );
        }
    }

    #[test]
    fn illegal_opcode_zero() {
        assert_eq!(Opcode::try_from(0x00), Err(DecodeError::IllegalOpcode));
    }

    #[test]
    fn reserved_constant_range() {
        for byte in 0x04..=0x0Fu8 {
            assert_eq!(
                Opcode::try_from(byte),
                Err(DecodeError::ReservedOpcode(byte)),
                "byte {byte:#04x} should be reserved"
            );
        }
    }

    #[test]
    fn reserved_arithmetic_range() {
        for byte in 0x12..=0x1Fu8 {
            assert_eq!(Opcode::try_from(byte), Err(DecodeError::ReservedOpcode(byte)));
        }
    }

    #[test]
    fn reserved_control_range() {
        for byte in 0x27..=0x2Fu8 {
            assert_eq!(Opcode::try_from(byte), Err(DecodeError::ReservedOpcode(byte)));
        }
    }

    #[test]
    fn reserved_call_range() {
        for byte in 0x33..=0x3Fu8 {
            assert_eq!(Opcode::try_from(byte), Err(DecodeError::ReservedOpcode(byte)));
        }
    }

    #[test]
    fn reserved_expansion_range() {
        for byte in 0x42..=0xFFu8 {
            assert_eq!(Opcode::try_from(byte), Err(DecodeError::ReservedOpcode(byte)));
        }
    }

    #[test]
    fn every_byte_value_resolves() {
        // Every u8 value must produce either Ok or a specific Err — never panic.
        for byte in 0..=255u8 {
            match Opcode::try_from(byte) {
                Ok(_) | Err(DecodeError::IllegalOpcode) | Err(DecodeError::ReservedOpcode(_)) => {}
                other => panic!("unexpected result for byte {byte:#04x}: {other:?}"),
            }
        }
    }

    #[test]
    fn mnemonics_are_uppercase() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert!(!m.is_empty(), "empty mnemonic for {opcode:?}");
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
        }
    }

    #[test]
    fn comparison_mapping() {
        assert_eq!(Opcode::IntJmpEq.comparison(), Some(Comparison::Eq));
        assert_eq!(Opcode::IntJmpNeq.comparison(), Some(Comparison::Neq));
        assert_eq!(Opcode::IntJmpGt.comparison(), Some(Comparison::Gt));
        assert_eq!(Opcode::IntJmpGe.comparison(), Some(Comparison::Ge));
        assert_eq!(Opcode::IntJmpLt.comparison(), Some(Comparison::Lt));
        assert_eq!(Opcode::IntJmpLe.comparison(), Some(Comparison::Le));
        assert_eq!(Opcode::Jmp.comparison(), None);
        assert_eq!(Opcode::IntAdd.comparison(), None);
    }

    #[test]
    fn comparison_holds_all_orderings() {
        // (left, right, eq, neq, gt, ge, lt, le) for a<b, a=b, a>b.
        let table = [
            (1, 2, false, true, false, false, true, true),
            (2, 2, true, false, false, true, false, true),
            (3, 2, false, true, true, true, false, false),
        ];
        for (a, b, eq, neq, gt, ge, lt, le) in table {
            assert_eq!(Comparison::Eq.holds(a, b), eq);
            assert_eq!(Comparison::Neq.holds(a, b), neq);
            assert_eq!(Comparison::Gt.holds(a, b), gt);
            assert_eq!(Comparison::Ge.holds(a, b), ge);
            assert_eq!(Comparison::Lt.holds(a, b), lt);
            assert_eq!(Comparison::Le.holds(a, b), le);
        }
    }

    #[test]
    fn comparison_signed_semantics() {
        assert!(Comparison::Lt.holds(-1, 0));
        assert!(Comparison::Gt.holds(0, StackElement::MIN));
        assert!(Comparison::Le.holds(StackElement::MIN, StackElement::MAX));
    }
}
