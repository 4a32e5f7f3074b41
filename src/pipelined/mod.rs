//! Pipelined implementation

use tracing::debug;

use crate::cpu::CPUState;
use crate::cpu::Mode;
use crate::error::SimulatorResult;
use crate::memory::Memory;
use crate::pipelined::pipeline::Pipeline;

pub mod pipeline;
pub mod stages;

/// Pipeline-side state outside the architectural registers
#[derive(Default)]
pub struct PipelineState {
    /// The five slots
    pub pipe: Pipeline,
    /// Previous EX result, visible to this cycle's EX as a bypass source
    pub ex_out: i32,
    /// Previous MEM output (loaded word or passed-through ALU result)
    pub mem_out: i32,
    /// A detected hazard is still in effect
    pub data_hazard: bool,
    /// Stall cycles left to insert
    pub clocks_to_stall: u32,
    /// HALT has reached EX; no further fetches
    pub halted: bool,
    /// Operand forwarding enabled
    pub forwarding: bool,
}

/// Runs the program to completion; returns the PC at termination
pub fn run(cpu: &mut CPUState, mem: &mut Memory) -> SimulatorResult<u32> {
    let mut state = PipelineState {
        forwarding: cpu.policy.mode == Mode::Forwarding,
        ..Default::default()
    };

    loop {
        if cpu.policy.step {
            let _: String = text_io::read!("{}\n");
        }

        cpu.stats.cycle_count += 1;
        debug!("clock {}: pc={:#010x}", cpu.stats.cycle_count, cpu.pc);

        cycle(cpu, mem, &mut state)?;

        // empty slots can only happen once HALT has drained
        if state.pipe.is_empty() {
            return Ok(cpu.pc);
        }
    }
}

/// One clock cycle: advance the slots, then run the stages in textual
/// order over the advanced slots, then commit NPC
fn cycle(
    cpu: &mut CPUState,
    mem: &mut Memory,
    state: &mut PipelineState,
) -> SimulatorResult<()> {
    if state.clocks_to_stall > 0 {
        state.pipe.stall_advance();
        state.clocks_to_stall -= 1;
        cpu.stats.stall_count += 1;
        debug!("inserting bubble, {} stall cycle(s) left", state.clocks_to_stall);
    } else {
        state.pipe.advance();
    }

    // NPC falls back to the current PC whenever IF is held off
    cpu.npc = cpu.pc;

    stages::instruction_fetch(cpu, mem, state)?;
    stages::instruction_decode(cpu, state)?;
    stages::execute(cpu, state)?;
    stages::memory_access(cpu, mem, state)?;
    stages::write_back(cpu, state);

    cpu.pc = cpu.npc;
    Ok(())
}
