use std::fs;

use sim_lib::assembler;
use sim_lib::error::SimulatorResult;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> SimulatorResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let (source_path, image_path) = match (args.get(1), args.get(2)) {
        (Some(source), Some(image)) => (source, image),
        _ => {
            eprintln!("Usage: asm <source_file> <output_image>");
            std::process::exit(1);
        }
    };

    let source = fs::read_to_string(source_path)?;
    let words = assembler::assemble(&source)?;

    let mut out = fs::File::create(image_path)?;
    assembler::write_image(&words, &mut out)?;
    Ok(())
}
