//! Instruction word encoding and decoding.
//!
//! Every instruction is exactly 32 bits, serialized little-endian:
//! ```text
//! bits 24..32: opcode (u8)
//! bits  0..24: parameter (24-bit field)
//! ```
//! The parameter field is reinterpreted per opcode: sign-extended as a jump
//! delta ([`Instruction::parameter`]) or zero-extended as a table index
//! ([`Instruction::index`]). This packing is the binary ABI shared between
//! the loader/compiler and the engine's decoder.

use crate::error::DecodeError;
use crate::opcode::Opcode;
use crate::Parameter;

/// Number of bits in the parameter field.
pub const PARAMETER_BITS: u32 = 24;

/// Smallest encodable parameter (as a signed jump delta).
pub const PARAMETER_MIN: Parameter = -(1 << (PARAMETER_BITS - 1));

/// Largest encodable parameter (as an unsigned index).
pub const PARAMETER_MAX_INDEX: Parameter = (1 << PARAMETER_BITS) - 1;

/// A single packed 32-bit Strata instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction(u32);

impl Instruction {
    /// Pack an opcode and parameter into one word.
    ///
    /// Accepts any value representable in the 24-bit field, whether it will
    /// be read back signed (`[PARAMETER_MIN, 0)`) or unsigned
    /// (`[0, PARAMETER_MAX_INDEX]`).
    pub fn new(opcode: Opcode, parameter: Parameter) -> Result<Self, DecodeError> {
        if !(PARAMETER_MIN..=PARAMETER_MAX_INDEX).contains(&parameter) {
            return Err(DecodeError::ParameterOutOfRange(parameter));
        }
        let word = ((opcode as u32) << PARAMETER_BITS) | (parameter as u32 & 0x00FF_FFFF);
        Ok(Self(word))
    }

    /// Wrap a raw word without validating the opcode byte.
    ///
    /// The interpreter reports an unrecognized opcode when it fetches one;
    /// loaders should prefer [`Instruction::decode`], which rejects it up
    /// front.
    pub fn from_raw(word: u32) -> Self {
        Self(word)
    }

    /// The raw packed word.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The opcode byte, without validation.
    pub fn opcode_byte(self) -> u8 {
        (self.0 >> PARAMETER_BITS) as u8
    }

    /// Decode the opcode, rejecting illegal and reserved bytes.
    pub fn opcode(self) -> Result<Opcode, DecodeError> {
        Opcode::try_from(self.opcode_byte())
    }

    /// The parameter as a signed value (24-bit sign extension).
    pub fn parameter(self) -> Parameter {
        ((self.0 << 8) as i32) >> 8
    }

    /// The parameter as an unsigned table index.
    pub fn index(self) -> usize {
        (self.0 & 0x00FF_FFFF) as usize
    }

    /// Encode this instruction to 4 bytes (little-endian).
    pub fn encode(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Decode 4 bytes into an instruction, validating the opcode byte.
    pub fn decode(bytes: [u8; 4]) -> Result<Self, DecodeError> {
        let instruction = Self(u32::from_le_bytes(bytes));
        instruction.opcode()?;
        Ok(instruction)
    }
}

/// Encode an instruction stream to bytes, 4 per instruction.
pub fn encode_stream(instructions: &[Instruction]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(instructions.len() * 4);
    for instruction in instructions {
        bytes.extend_from_slice(&instruction.encode());
    }
    bytes
}

/// Decode a byte stream into instructions.
///
/// The length must be a multiple of 4; every 4-byte chunk must carry a
/// valid opcode.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::InvalidLength(bytes.len()));
    }

    let mut instructions = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let arr: [u8; 4] = chunk.try_into().expect("chunks_exact guarantees 4 bytes");
        instructions.push(Instruction::decode(arr)?);
    }

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip_simple() {
        let instruction = Instruction::new(Opcode::IntAdd, 0).unwrap();
        let decoded = Instruction::decode(instruction.encode()).unwrap();
        assert_eq!(instruction, decoded);
    }

    #[test]
    fn encode_decode_roundtrip_all_opcodes() {
        for &opcode in &crate::opcode::ALL_OPCODES {
            let instruction = Instruction::new(opcode, 5).unwrap();
            let decoded = Instruction::decode(instruction.encode()).unwrap();
            assert_eq!(decoded.opcode().unwrap(), opcode);
            assert_eq!(decoded.parameter(), 5);
        }
    }

    #[test]
    fn opcode_occupies_high_byte() {
        let instruction = Instruction::new(Opcode::Jmp, 0).unwrap();
        assert_eq!(instruction.raw(), 0x2000_0000);
        assert_eq!(instruction.opcode_byte(), 0x20);
    }

    #[test]
    fn little_endian_encoding() {
        let instruction = Instruction::new(Opcode::IntPushConstant, 0x0012_34AB).unwrap();
        // word = 0x011234AB, little-endian on the wire.
        assert_eq!(instruction.encode(), [0xAB, 0x34, 0x12, 0x01]);
    }

    #[test]
    fn parameter_sign_extension_negative_one() {
        let instruction = Instruction::new(Opcode::Jmp, -1).unwrap();
        assert_eq!(instruction.parameter(), -1);
        assert_eq!(instruction.index(), 0x00FF_FFFF);
    }

    #[test]
    fn parameter_sign_extension_min() {
        let instruction = Instruction::new(Opcode::Jmp, PARAMETER_MIN).unwrap();
        assert_eq!(instruction.parameter(), PARAMETER_MIN);
    }

    #[test]
    fn parameter_unsigned_index_view() {
        let instruction = Instruction::new(Opcode::FunctionCall, PARAMETER_MAX_INDEX).unwrap();
        assert_eq!(instruction.index(), PARAMETER_MAX_INDEX as usize);
        // The same bits read back signed are -1.
        assert_eq!(instruction.parameter(), -1);
    }

    #[test]
    fn parameter_positive_values_agree() {
        let instruction = Instruction::new(Opcode::PushFromVar, 42).unwrap();
        assert_eq!(instruction.parameter(), 42);
        assert_eq!(instruction.index(), 42);
    }

    #[test]
    fn parameter_out_of_range_rejected() {
        assert_eq!(
            Instruction::new(Opcode::Jmp, PARAMETER_MIN - 1),
            Err(DecodeError::ParameterOutOfRange(PARAMETER_MIN - 1))
        );
        assert_eq!(
            Instruction::new(Opcode::Jmp, PARAMETER_MAX_INDEX + 1),
            Err(DecodeError::ParameterOutOfRange(PARAMETER_MAX_INDEX + 1))
        );
    }

    #[test]
    fn decode_rejects_illegal_opcode() {
        assert_eq!(
            Instruction::decode([0, 0, 0, 0x00]),
            Err(DecodeError::IllegalOpcode)
        );
    }

    #[test]
    fn decode_rejects_reserved_opcode() {
        assert_eq!(
            Instruction::decode([0, 0, 0, 0x7F]),
            Err(DecodeError::ReservedOpcode(0x7F))
        );
    }

    #[test]
    fn from_raw_defers_opcode_validation() {
        let instruction = Instruction::from_raw(0x7F00_0001);
        assert_eq!(instruction.opcode_byte(), 0x7F);
        assert_eq!(instruction.opcode(), Err(DecodeError::ReservedOpcode(0x7F)));
        assert_eq!(instruction.index(), 1);
    }

    #[test]
    fn stream_roundtrip() {
        let instructions = vec![
            Instruction::new(Opcode::IntPushConstant, 3).unwrap(),
            Instruction::new(Opcode::IntPushConstant, 4).unwrap(),
            Instruction::new(Opcode::IntAdd, 0).unwrap(),
            Instruction::new(Opcode::FunctionReturn, 0).unwrap(),
        ];
        let bytes = encode_stream(&instructions);
        assert_eq!(bytes.len(), 16);
        assert_eq!(decode_stream(&bytes).unwrap(), instructions);
    }

    #[test]
    fn stream_rejects_bad_length() {
        assert_eq!(decode_stream(&[0; 7]), Err(DecodeError::InvalidLength(7)));
    }

    #[test]
    fn stream_empty() {
        assert!(decode_stream(&[]).unwrap().is_empty());
        assert!(encode_stream(&[]).is_empty());
    }

    #[test]
    fn stream_propagates_instruction_errors() {
        // First 4 bytes valid, second carries an illegal opcode.
        let mut bytes = Instruction::new(Opcode::Drop, 0).unwrap().encode().to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0x00]);
        assert_eq!(decode_stream(&bytes), Err(DecodeError::IllegalOpcode));
    }
}
