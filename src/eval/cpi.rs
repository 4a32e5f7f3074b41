use sim_lib::assembler;
use sim_lib::cpu::Mode;
use sim_lib::cpu::Policy;
use sim_lib::run_wrapper::simulate;

/// Demo programs exercising the hazard cases of interest
const PROGRAMS: &[(&str, &str)] = &[
    (
        "alu-chain",
        "ADDI R1, R0, 3\nADDI R2, R0, 4\nADD R3, R1, R2\nSUB R4, R3, R1\nHALT\n",
    ),
    (
        "load-use",
        "STW R0, R0, 128\nADDI R1, R0, 128\nLDW R2, R1, 0\nADD R3, R2, R2\nHALT\n",
    ),
    (
        "mem-copy",
        "ADDI R1, R0, 21\nSTW R1, R0, 256\nLDW R2, R0, 256\nSTW R2, R0, 260\nHALT\n",
    ),
    (
        "count-down",
        "ADDI R1, R0, 8\nSUBI R1, R1, 1\nBZ R1, 2\nBEQ R0, R0, -2\nHALT\n",
    ),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("eval")?;
    let output_path = "eval/sim_eval.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["Program", "Mode", "Instructions", "Stalls", "Cycles", "CPI"])?;

    for (name, source) in PROGRAMS {
        let words = assembler::assemble(source)?;
        let image = assembler::image_bytes(&words);

        for (label, mode) in
            [("no-fwd", Mode::NoForwarding), ("fwd", Mode::Forwarding)]
        {
            let (cpu, _) = simulate(&image, Policy { mode, step: false })?;
            let stats = &cpu.stats;
            let cpi = stats.cycle_count as f64 / stats.inst_count as f64;
            writer.write_record([
                name.to_string(),
                label.to_string(),
                stats.inst_count.to_string(),
                stats.stall_count.to_string(),
                stats.cycle_count.to_string(),
                format!("{:.3}", cpi),
            ])?;
        }
    }

    writer.flush()?;
    eprintln!("Wrote {}", output_path);
    Ok(())
}
