//! A simulator wrapper: load the image, run the selected core, report

use std::fs;
use std::path::Path;

use tracing::info;

use crate::cpu::CPUState;
use crate::cpu::Mode;
use crate::cpu::Policy;
use crate::error::LoadError;
use crate::error::SimulatorResult;
use crate::functional;
use crate::loader;
use crate::memory::Memory;
use crate::memory::MEM_SIZE;
use crate::pipelined;
use crate::report;

/// Runs the simulation for an image file and writes the report
pub fn run(
    image_path: &Path,
    output_path: &Path,
    policy: Policy,
) -> SimulatorResult<()> {
    info!("memory image: {}", image_path.display());
    info!("output file: {}", output_path.display());

    let image = loader::load_image_file(image_path)?;
    let (cpu, mem) = simulate(&image, policy)?;

    let mut out = fs::File::create(output_path)?;
    report::write_report(&mut out, &cpu, &mem)?;

    info!(
        "done: pc={}, {} instructions, {} cycles",
        cpu.pc, cpu.stats.inst_count, cpu.stats.cycle_count
    );
    Ok(())
}

/// Runs a prepared byte image to completion.
/// Returns the final CPU and memory for inspection.
pub fn simulate(image: &[u8], policy: Policy) -> SimulatorResult<(CPUState, Memory)> {
    let mut mem = Memory::new(MEM_SIZE);
    if image.len() > mem.size() {
        return Err(LoadError::ImageTooLarge {
            image: image.len(),
            memory: mem.size(),
        }
        .into());
    }
    mem.write_bytes(0, image)?;

    let mut cpu = CPUState::make(policy);
    let _ = match policy.mode {
        Mode::Functional => functional::run(&mut cpu, &mut mem)?,
        Mode::NoForwarding | Mode::Forwarding => {
            pipelined::run(&mut cpu, &mut mem)?
        }
    };

    Ok((cpu, mem))
}
