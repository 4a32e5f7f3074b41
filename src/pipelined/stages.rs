//! The five stages adapted for pipelined execution.
//! Each stage body runs over the already-advanced slots and owns the
//! fields it writes; the `ex_out`/`mem_out` latches carry one value per
//! cycle between neighbouring instructions.

use tracing::debug;

use super::pipeline::Forward;
use super::pipeline::InFlight;
use super::pipeline::{EX, ID, IF, MEM, WB};
use super::PipelineState;
use crate::alu::alu;
use crate::alu::ALUOp;
use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::functional::branch_target;
use crate::functional::read_word;
use crate::functional::write_word;
use crate::instruction::Instruction;
use crate::instruction::Opcode;
use crate::memory::Memory;

/// IF stage: fetch at PC into the front slot
pub fn instruction_fetch(
    cpu: &mut CPUState,
    mem: &Memory,
    state: &mut PipelineState,
) -> SimulatorResult<()> {
    if state.halted || state.data_hazard {
        return Ok(());
    }
    let pc = cpu.pc;
    let raw = read_word(mem, pc)?;
    debug!("IF: pc={:#010x} word={:#010x}", pc, raw);
    state.pipe.slots[IF] = Some(InFlight::fetch(raw, pc));
    cpu.npc = pc.wrapping_add(4);
    Ok(())
}

/// ID stage: decode, latch operands, run hazard detection.
/// While a stall is draining the slot holds still; in the cycle the
/// stall ends it re-reads the register file (which now carries the
/// producer's writeback) and re-runs detection, installing any
/// MEM-to-EX forwards that became ready this cycle.
pub fn instruction_decode(
    cpu: &CPUState,
    state: &mut PipelineState,
) -> SimulatorResult<()> {
    if state.halted {
        return Ok(());
    }
    if state.data_hazard && state.clocks_to_stall > 0 {
        return Ok(());
    }

    let Some(mut rec) = state.pipe.slots[ID] else { return Ok(()) };
    let inst = match rec.inst {
        Some(inst) => {
            // stall just drained: stale hints are forgotten before re-detection
            rec.fwd_a = Forward::None;
            rec.fwd_b = Forward::None;
            rec.mem_to_mem = false;
            inst
        }
        None => {
            let inst = Instruction::decode(rec.raw)?;
            debug!("ID: {}", inst);
            rec.inst = Some(inst);
            inst
        }
    };
    rec.a = read_operand(cpu, state, inst.rs);
    rec.b = read_operand(cpu, state, inst.rt);
    state.pipe.slots[ID] = Some(rec);
    state.data_hazard = false;

    let stall = state.pipe.detect_hazards(state.forwarding);
    if stall > 0 {
        state.data_hazard = true;
        state.clocks_to_stall = stall;
        debug!("ID: data hazard, stalling {} cycle(s)", stall);
    }
    Ok(())
}

/// Register read as ID sees it: a result retiring in WB this same cycle
/// is already visible (the register file writes before it is read)
fn read_operand(cpu: &CPUState, state: &PipelineState, reg: u8) -> i32 {
    if let Some(retiring) = state.pipe.slots[WB] {
        if let Some(inst) = retiring.inst {
            if inst.dest_reg() == Some(reg) {
                return wb_value(&retiring, &inst);
            }
        }
    }
    cpu.gpr[reg as usize].read()
}

/// The value an instruction writes back: the loaded word for LDW,
/// the ALU result otherwise
fn wb_value(rec: &InFlight, inst: &Instruction) -> i32 {
    match inst.opcode {
        Opcode::Ldw => rec.b,
        _ => rec.alu_out,
    }
}

/// EX stage: operand select (with bypass), compute, resolve control flow
pub fn execute(cpu: &mut CPUState, state: &mut PipelineState) -> SimulatorResult<()> {
    let Some(mut rec) = state.pipe.slots[EX] else { return Ok(()) };
    let Some(inst) = rec.inst else { return Ok(()) };

    cpu.stats.count_instruction(inst.opcode.class());

    let a = match rec.fwd_a {
        Forward::None => rec.a,
        Forward::FromMem => state.mem_out,
        Forward::FromEx => state.ex_out,
    };
    let b = match rec.fwd_b {
        Forward::None => rec.b,
        Forward::FromMem => state.mem_out,
        Forward::FromEx => state.ex_out,
    };
    rec.a = a;
    rec.b = b;
    let imm = inst.imm_ext;

    use Opcode::*;
    match inst.opcode {
        Add => rec.alu_out = alu(ALUOp::ADD, a, b),
        Sub => rec.alu_out = alu(ALUOp::SUB, a, b),
        Mul => rec.alu_out = alu(ALUOp::MUL, a, b),
        Or => rec.alu_out = alu(ALUOp::OR, a, b),
        And => rec.alu_out = alu(ALUOp::AND, a, b),
        Xor => rec.alu_out = alu(ALUOp::XOR, a, b),
        Addi => rec.alu_out = alu(ALUOp::ADD, a, imm),
        Subi => rec.alu_out = alu(ALUOp::SUB, a, imm),
        Muli => rec.alu_out = alu(ALUOp::MUL, a, imm),
        Ori => rec.alu_out = alu(ALUOp::OR, a, imm),
        Andi => rec.alu_out = alu(ALUOp::AND, a, imm),
        Xori => rec.alu_out = alu(ALUOp::XOR, a, imm),
        Ldw | Stw => rec.ref_addr = alu(ALUOp::ADD, a, imm) as u32,
        Bz => {
            if a == 0 {
                redirect(cpu, state, branch_target(rec.pc_at_fetch, imm));
            }
        }
        Beq => {
            if a == b {
                redirect(cpu, state, branch_target(rec.pc_at_fetch, imm));
            }
        }
        Jr => redirect(cpu, state, a as u32),
        Halt => {
            state.halted = true;
            redirect(cpu, state, rec.pc_at_fetch.wrapping_add(4));
        }
    }

    state.ex_out = rec.alu_out;
    state.pipe.slots[EX] = Some(rec);
    Ok(())
}

/// Control transfer: redirect NPC and squash the two speculative slots.
/// A stall armed by the squashed ID instruction dies with it.
fn redirect(cpu: &mut CPUState, state: &mut PipelineState, target: u32) {
    debug!("EX: control transfer to {:#010x}", target);
    cpu.npc = target;
    state.pipe.flush_speculative();
    state.data_hazard = false;
    state.clocks_to_stall = 0;
}

/// MEM stage: perform the access, latch the mem output
pub fn memory_access(
    cpu: &mut CPUState,
    mem: &mut Memory,
    state: &mut PipelineState,
) -> SimulatorResult<()> {
    let Some(mut rec) = state.pipe.slots[MEM] else { return Ok(()) };
    let Some(inst) = rec.inst else { return Ok(()) };

    match inst.opcode {
        Opcode::Ldw => {
            let value = read_word(mem, rec.ref_addr)? as i32;
            debug!("MEM: loaded {} from {:#010x}", value, rec.ref_addr);
            rec.b = value;
            state.mem_out = value;
        }
        Opcode::Stw => {
            let datum = if rec.mem_to_mem { state.mem_out } else { rec.b };
            write_word(mem, rec.ref_addr, datum)?;
            debug!("MEM: stored {} to {:#010x}", datum, rec.ref_addr);
            cpu.stats.record_mem_write(rec.ref_addr);
        }
        _ => state.mem_out = rec.alu_out,
    }

    state.pipe.slots[MEM] = Some(rec);
    Ok(())
}

/// WB stage: commit to the register file
pub fn write_back(cpu: &mut CPUState, state: &PipelineState) {
    let Some(rec) = state.pipe.slots[WB] else { return };
    let Some(inst) = rec.inst else { return };

    if let Some(dest) = inst.dest_reg() {
        let value = wb_value(&rec, &inst);
        cpu.gpr[dest as usize].write(value);
        cpu.stats.record_reg_write(dest);
        debug!("WB: R{} <- {}", dest, value);
    }
}
