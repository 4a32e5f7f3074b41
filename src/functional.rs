//! Single-cycle functional core.
//! Authoritative for the architectural semantics of every opcode; the
//! pipelined core must match its final state for any terminating program.

use tracing::debug;

use crate::alu::alu;
use crate::alu::ALUOp;
use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::instruction::Format;
use crate::instruction::Instruction;
use crate::instruction::Opcode;
use crate::memory::Memory;

/// Runs the program to completion; returns the PC after HALT
pub fn run(cpu: &mut CPUState, mem: &mut Memory) -> SimulatorResult<u32> {
    loop {
        if cpu.policy.step {
            let _: String = text_io::read!("{}\n");
        }
        if step(cpu, mem)? {
            return Ok(cpu.pc);
        }
    }
}

/// One architectural step: fetch, decode, execute, commit PC.
/// Returns true when HALT executed.
pub fn step(cpu: &mut CPUState, mem: &mut Memory) -> SimulatorResult<bool> {
    let pc = cpu.pc;
    let raw = read_word(mem, pc)?;
    debug!("IF: {:#010x}", raw);

    let inst = Instruction::decode(raw)?;
    cpu.npc = pc.wrapping_add(4);

    cpu.stats.count_instruction(inst.opcode.class());

    let a = cpu.gpr[inst.rs as usize].read();
    let rt_val = cpu.gpr[inst.rt as usize].read();
    // ALU operand B: register for R-type, sign-extended immediate for I-type
    let b = match inst.format {
        Format::R => rt_val,
        Format::I => inst.imm_ext,
    };

    use Opcode::*;
    match inst.opcode {
        Add | Addi => write_dest(cpu, &inst, alu(ALUOp::ADD, a, b)),
        Sub | Subi => write_dest(cpu, &inst, alu(ALUOp::SUB, a, b)),
        Mul | Muli => write_dest(cpu, &inst, alu(ALUOp::MUL, a, b)),
        Or | Ori => write_dest(cpu, &inst, alu(ALUOp::OR, a, b)),
        And | Andi => write_dest(cpu, &inst, alu(ALUOp::AND, a, b)),
        Xor | Xori => write_dest(cpu, &inst, alu(ALUOp::XOR, a, b)),
        Ldw => {
            let addr = alu(ALUOp::ADD, a, inst.imm_ext) as u32;
            let value = read_word(mem, addr)? as i32;
            debug!("MEM: loaded {} from {:#010x}", value, addr);
            write_dest(cpu, &inst, value);
        }
        Stw => {
            let addr = alu(ALUOp::ADD, a, inst.imm_ext) as u32;
            write_word(mem, addr, rt_val)?;
            debug!("MEM: stored {} to {:#010x}", rt_val, addr);
            cpu.stats.record_mem_write(addr);
        }
        Bz => {
            if a == 0 {
                cpu.npc = branch_target(pc, inst.imm_ext);
                debug!("EX: branch taken to {:#010x}", cpu.npc);
            }
        }
        Beq => {
            if a == rt_val {
                cpu.npc = branch_target(pc, inst.imm_ext);
                debug!("EX: branch taken to {:#010x}", cpu.npc);
            }
        }
        Jr => {
            cpu.npc = a as u32;
            debug!("EX: jump to {:#010x}", cpu.npc);
        }
        Halt => {}
    }

    cpu.pc = cpu.npc;
    Ok(inst.opcode == Halt)
}

/// Branch target relative to the PC the branch was fetched at
pub fn branch_target(pc_at_fetch: u32, imm_ext: i32) -> u32 {
    (pc_at_fetch as i32).wrapping_add(imm_ext.wrapping_mul(4)) as u32
}

fn write_dest(cpu: &mut CPUState, inst: &Instruction, value: i32) {
    if let Some(dest) = inst.dest_reg() {
        cpu.gpr[dest as usize].write(value);
        cpu.stats.record_reg_write(dest);
    }
}

pub(crate) fn read_word(mem: &Memory, addr: u32) -> SimulatorResult<u32> {
    let bytes = mem.read_bytes(addr, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub(crate) fn write_word(
    mem: &mut Memory,
    addr: u32,
    value: i32,
) -> SimulatorResult<()> {
    mem.write_bytes(addr, &value.to_be_bytes())
}
