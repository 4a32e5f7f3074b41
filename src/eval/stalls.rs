use sim_lib::assembler;
use sim_lib::cpu::Mode;
use sim_lib::cpu::Policy;
use sim_lib::run_wrapper::simulate;

/// A chain of `len` dependent adds: every instruction reads the register
/// its predecessor wrote
fn dependent_chain(len: usize) -> String {
    let mut source = String::from("ADDI R1, R0, 1\n");
    for i in 0..len {
        let dst = 2 + (i % 30);
        let src = 1 + (i % 30);
        source.push_str(&format!("ADD R{}, R{}, R{}\n", dst, src, src));
    }
    source.push_str("HALT\n");
    source
}

fn stalls_for(len: usize, mode: Mode) -> Result<u32, Box<dyn std::error::Error>> {
    let words = assembler::assemble(&dependent_chain(len))?;
    let image = assembler::image_bytes(&words);
    let (cpu, _) = simulate(&image, Policy { mode, step: false })?;
    Ok(cpu.stats.stall_count)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let chain_lengths: Vec<usize> = (1..=24).collect();

    let mut data: Vec<Vec<(i32, f64)>> = vec![vec![], vec![]];
    let mut y_max: f64 = 0.;
    for &len in &chain_lengths {
        for (i, mode) in [Mode::NoForwarding, Mode::Forwarding].into_iter().enumerate() {
            let stalls = stalls_for(len, mode)? as f64;
            data[i].push((len as i32, stalls));
            y_max = y_max.max(stalls);
        }
    }

    // Plot the data
    use plotters::prelude::*;

    std::fs::create_dir_all("eval")?;
    let output_path = "eval/stall_eval.svg";
    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Stall cycles vs dependency-chain length", ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..25, 0.0..y_max * 1.1)?;
    ctx.configure_mesh()
        .x_desc("Chain length")
        .y_desc("Stall cycles")
        .draw()?;

    for (i, label) in ["no-fwd", "fwd"].iter().enumerate() {
        let series = data[i].iter().copied();
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color)
            });
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    eprintln!("Wrote {}", output_path);
    Ok(())
}
