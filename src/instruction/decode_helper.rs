//! Decoding helper functions: bitfield extraction for the fixed 32-bit layout

use super::Opcode;
use crate::error::DecodeError;
use crate::error::SimulatorResult;

// Decoding bitmasks
pub const OPCODE_MASK: u32 = 0xFC00_0000;
pub const RS_MASK: u32 = 0x03E0_0000;
pub const RT_MASK: u32 = 0x001F_0000;
pub const RD_MASK: u32 = 0x0000_F800;
pub const IMM_MASK: u32 = 0x0000_FFFF;

/// Extracts the 6-bit opcode field
pub fn opcode_bits(raw: u32) -> u8 {
    ((raw & OPCODE_MASK) >> 26) as u8
}

/// Extracts the Rs field
pub fn rs_bits(raw: u32) -> u8 {
    ((raw & RS_MASK) >> 21) as u8
}

/// Extracts the Rt field
pub fn rt_bits(raw: u32) -> u8 {
    ((raw & RT_MASK) >> 16) as u8
}

/// Extracts the Rd field
pub fn rd_bits(raw: u32) -> u8 {
    ((raw & RD_MASK) >> 11) as u8
}

/// Extracts the raw 16-bit immediate field
pub fn imm_bits(raw: u32) -> u16 {
    (raw & IMM_MASK) as u16
}

/// Sign-extends a 16-bit immediate to 32 bits
pub fn sign_extend(imm: u16) -> i32 {
    imm as i16 as i32
}

/// Returns the opcode for a raw word
pub fn raw_to_opcode(raw: u32) -> SimulatorResult<Opcode> {
    let bits = opcode_bits(raw);
    Opcode::from_bits(bits)
        .ok_or_else(|| DecodeError::InvalidOpcode { raw, opcode: bits }.into())
}
