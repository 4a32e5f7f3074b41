//! Final-state report, produced after termination

use std::io::Write;

use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::functional::read_word;
use crate::memory::Memory;

/// Writes the report: instruction counts, final PC, modified registers,
/// timing (pipelined modes only), and modified memory words
pub fn write_report<W: Write>(
    out: &mut W,
    cpu: &CPUState,
    mem: &Memory,
) -> SimulatorResult<()> {
    let stats = &cpu.stats;

    writeln!(out, "Instruction counts:")?;
    writeln!(out, "Total number of instructions: {}", stats.inst_count)?;
    writeln!(out, "Arithmetic instructions: {}", stats.arithmetic_count)?;
    writeln!(out, "Logical instructions: {}", stats.logical_count)?;
    writeln!(out, "Memory access instructions: {}", stats.memory_count)?;
    writeln!(out, "Control transfer instructions: {}", stats.control_count)?;
    writeln!(out)?;

    writeln!(out, "Final register state:")?;
    writeln!(out, "Program counter: {}", cpu.pc)?;
    for &reg in &stats.modified_regs {
        writeln!(out, "R{}: {}", reg, cpu.gpr[reg as usize].read())?;
    }

    if cpu.policy.mode.is_pipelined() {
        writeln!(out)?;
        writeln!(out, "Timing:")?;
        writeln!(out, "Total stalls: {}", stats.stall_count)?;
        writeln!(out, "Total clock cycles: {}", stats.cycle_count)?;
    }

    writeln!(out)?;
    writeln!(out, "Final memory state:")?;
    for &addr in &stats.modified_addrs {
        let word = read_word(mem, addr)? as i32;
        writeln!(out, "Address: {}, Contents: {}", addr, word)?;
    }

    Ok(())
}
