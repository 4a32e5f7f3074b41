use sim_lib::assembler;
use sim_lib::instruction::Instruction;
use sim_lib::instruction::Opcode;
use sim_lib::loader;
use sim_lib::memory::MEM_SIZE;

const SAMPLE: &str = "\
# every instruction form once
ADD R3, R1, R2
SUB R4, R3, R1
MUL R5, R4, R4
OR R6, R5, R1
AND R7, R6, R2
XOR R8, R7, R1

ADDI R1, R0, 5
SUBI R2, R1, -3
MULI R3, R2, 7
ORI R4, R0, 0x0f
ANDI R5, R4, 255
XORI R6, R5, 0x10

LDW R9, R1, 32
STW R9, R1, 36
BZ R9, 4
BEQ R9, R1, -2
JR R9
HALT
";

#[test]
fn assembled_image_reloads_to_the_same_words() {
    let words = assembler::assemble(SAMPLE).unwrap();
    let mut text = Vec::new();
    assembler::write_image(&words, &mut text).unwrap();

    let image = loader::parse_image(std::str::from_utf8(&text).unwrap()).unwrap();
    assert_eq!(image.len(), MEM_SIZE);

    for (i, word) in words.iter().enumerate() {
        let offset = i * 4;
        let reloaded = u32::from_be_bytes([
            image[offset],
            image[offset + 1],
            image[offset + 2],
            image[offset + 3],
        ]);
        assert_eq!(reloaded, *word);
    }
    // the padding is zero words
    assert!(image[words.len() * 4..].iter().all(|&b| b == 0));
}

#[test]
fn every_word_disassembles_and_reassembles_identically() {
    let words = assembler::assemble(SAMPLE).unwrap();
    assert_eq!(words.len(), 18);
    for word in words {
        let text = assembler::disassemble(word).unwrap();
        let again = assembler::assemble(&text).unwrap();
        assert_eq!(again, vec![word], "'{}' did not round-trip", text);
    }
}

#[test]
fn opcode_table_matches_the_isa() {
    let expect = [
        ("ADD", 0x00),
        ("SUB", 0x02),
        ("MUL", 0x04),
        ("OR", 0x06),
        ("AND", 0x08),
        ("XOR", 0x0a),
        ("ADDI", 0x01),
        ("SUBI", 0x03),
        ("MULI", 0x05),
        ("ORI", 0x07),
        ("ANDI", 0x09),
        ("XORI", 0x0b),
        ("LDW", 0x0c),
        ("STW", 0x0d),
        ("BZ", 0x0e),
        ("BEQ", 0x0f),
        ("JR", 0x10),
        ("HALT", 0x11),
    ];
    for (name, bits) in expect {
        let op = Opcode::from_mnemonic(name).unwrap();
        assert_eq!(op.bits(), bits, "{}", name);
    }
}

#[test]
fn halt_encodes_to_the_documented_word() {
    assert_eq!(assembler::assemble("HALT").unwrap(), vec![0x4400_0000]);
}

#[test]
fn decoded_fields_survive_an_assembly_round_trip() {
    let words = assembler::assemble("BEQ R7, R9, -12").unwrap();
    let inst = Instruction::decode(words[0]).unwrap();
    assert_eq!(inst.opcode, Opcode::Beq);
    assert_eq!(inst.rs, 7);
    assert_eq!(inst.rt, 9);
    assert_eq!(inst.imm_ext, -12);
}

#[test]
fn loader_is_stricter_than_the_assembler() {
    // the assembler tolerates comments; the loader does not
    assert!(assembler::assemble("# comment\nHALT\n").is_ok());
    assert!(loader::parse_image("# comment\n44000000\n").is_err());
}
