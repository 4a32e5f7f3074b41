//! Companion assembler and disassembler for the ISA.
//! Used by the `asm` binary to produce test images, and by the tests
//! themselves to build programs without hand-encoding words.

use std::io;
use std::io::Write;

use crate::error::AsmError;
use crate::error::SimulatorResult;
use crate::instruction::Instruction;
use crate::instruction::Opcode;
use crate::memory::MEM_SIZE;

/// Assembles a program listing into words.
/// Blank lines and lines starting with `#` are ignored.
pub fn assemble(source: &str) -> Result<Vec<u32>, AsmError> {
    let mut words = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        words.push(assemble_line(text, idx + 1)?);
    }
    Ok(words)
}

/// Assembles one instruction
fn assemble_line(text: &str, line: usize) -> Result<u32, AsmError> {
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest),
        None => (text, ""),
    };
    let mnemonic = head.to_uppercase();
    let opcode = Opcode::from_mnemonic(&mnemonic).ok_or_else(|| {
        AsmError::UnknownMnemonic { line, mnemonic: mnemonic.clone() }
    })?;

    let operands: Vec<&str> =
        rest.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    let expect = |n: usize| -> Result<(), AsmError> {
        if operands.len() == n {
            Ok(())
        } else {
            Err(AsmError::WrongOperandCount {
                line,
                mnemonic: mnemonic.clone(),
                expected: n,
                got: operands.len(),
            })
        }
    };

    use Opcode::*;
    match opcode {
        Add | Sub | Mul | Or | And | Xor => {
            expect(3)?;
            let rd = parse_reg(operands[0], line)?;
            let rs = parse_reg(operands[1], line)?;
            let rt = parse_reg(operands[2], line)?;
            Ok(encode_r(opcode, rd, rs, rt))
        }
        Addi | Subi | Muli | Ori | Andi | Xori | Ldw | Stw => {
            expect(3)?;
            let rt = parse_reg(operands[0], line)?;
            let rs = parse_reg(operands[1], line)?;
            let imm = parse_imm(operands[2], line)?;
            Ok(encode_i(opcode, rt, rs, imm))
        }
        Bz => {
            expect(2)?;
            let rs = parse_reg(operands[0], line)?;
            let imm = parse_imm(operands[1], line)?;
            Ok(encode_i(opcode, 0, rs, imm))
        }
        Beq => {
            expect(3)?;
            let rs = parse_reg(operands[0], line)?;
            let rt = parse_reg(operands[1], line)?;
            let imm = parse_imm(operands[2], line)?;
            Ok(encode_i(opcode, rt, rs, imm))
        }
        Jr => {
            expect(1)?;
            let rs = parse_reg(operands[0], line)?;
            Ok(encode_i(opcode, 0, rs, 0))
        }
        Halt => {
            expect(0)?;
            Ok(encode_i(opcode, 0, 0, 0))
        }
    }
}

/// Encodes an R-type word: opcode | rs | rt | rd | zeros
pub fn encode_r(opcode: Opcode, rd: u8, rs: u8, rt: u8) -> u32 {
    ((opcode.bits() as u32) << 26)
        | ((rs as u32) << 21)
        | ((rt as u32) << 16)
        | ((rd as u32) << 11)
}

/// Encodes an I-type word: opcode | rs | rt | imm
pub fn encode_i(opcode: Opcode, rt: u8, rs: u8, imm: u16) -> u32 {
    ((opcode.bits() as u32) << 26)
        | ((rs as u32) << 21)
        | ((rt as u32) << 16)
        | (imm as u32)
}

/// Parses a register token like `R4` or `r31`
fn parse_reg(token: &str, line: usize) -> Result<u8, AsmError> {
    let bad = || AsmError::BadRegister { line, token: token.to_string() };
    let number = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(bad)?;
    let value: u8 = number.parse().map_err(|_| bad())?;
    if value < 32 {
        Ok(value)
    } else {
        Err(bad())
    }
}

/// Parses a decimal or `0x`-hex immediate and checks the 16-bit range
fn parse_imm(token: &str, line: usize) -> Result<u16, AsmError> {
    let bad = || AsmError::BadImmediate { line, token: token.to_string() };
    let value: i64 = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|_| bad())?
    } else if let Some(hex) = token.strip_prefix("-0x").or_else(|| token.strip_prefix("-0X")) {
        -i64::from_str_radix(hex, 16).map_err(|_| bad())?
    } else {
        token.parse().map_err(|_| bad())?
    };
    if !(-32768..=65535).contains(&value) {
        return Err(AsmError::ImmediateOutOfRange { line, value });
    }
    Ok(value as u16)
}

/// Renders a decoded word back to canonical assembly text
pub fn disassemble(word: u32) -> SimulatorResult<String> {
    Ok(Instruction::decode(word)?.to_string())
}

/// Flattens words into the big-endian byte image the loader produces
pub fn image_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Writes the hex-text image, zero-padded to the full memory size
pub fn write_image<W: Write>(words: &[u32], out: &mut W) -> io::Result<()> {
    for word in words {
        writeln!(out, "{:08x}", word)?;
    }
    for _ in words.len()..MEM_SIZE / 4 {
        writeln!(out, "00000000")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_r_type() {
        let words = assemble("ADD R3, R1, R2").unwrap();
        assert_eq!(words, vec![(1 << 21) | (2 << 16) | (3 << 11)]);
    }

    #[test]
    fn encodes_negative_immediates() {
        let words = assemble("SUBI R1, R1, -1").unwrap();
        assert_eq!(words[0] & 0xffff, 0xffff);
        let words = assemble("BEQ R0, R0, -3").unwrap();
        assert_eq!(words[0] & 0xffff, 0xfffd);
    }

    #[test]
    fn skips_blanks_and_comments() {
        let source = "# counter demo\n\nADDI R1, R0, 3\n\nHALT\n";
        assert_eq!(assemble(source).unwrap().len(), 2);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            assemble("NOP"),
            Err(AsmError::UnknownMnemonic { line: 1, .. })
        ));
        assert!(matches!(
            assemble("ADD R1, R2"),
            Err(AsmError::WrongOperandCount { .. })
        ));
        assert!(matches!(
            assemble("ADD R1, R2, R32"),
            Err(AsmError::BadRegister { .. })
        ));
        assert!(matches!(
            assemble("ADDI R1, R0, 70000"),
            Err(AsmError::ImmediateOutOfRange { .. })
        ));
    }

    #[test]
    fn disassembly_round_trips() {
        let source = "ADDI R1, R0, 5\nADD R3, R1, R2\nLDW R2, R1, 0\nSTW R2, R1, 4\nBZ R1, 2\nBEQ R1, R2, -2\nJR R7\nHALT";
        let words = assemble(source).unwrap();
        for word in words {
            let text = disassemble(word).unwrap();
            let again = assemble(&text).unwrap();
            assert_eq!(again, vec![word], "round-trip failed for '{}'", text);
        }
    }

    #[test]
    fn image_is_padded_to_memory_size() {
        let words = assemble("HALT").unwrap();
        let mut out = Vec::new();
        write_image(&words, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), crate::memory::MEM_SIZE / 4);
        assert!(text.starts_with("44000000\n00000000\n"));
    }
}
